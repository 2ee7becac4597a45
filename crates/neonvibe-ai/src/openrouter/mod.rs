//! OpenRouter chat-completions streaming client.
//!
//! OpenAI-compatible wire format: `data: {json}` frames whose delta text
//! sits at `choices[0].delta.content`, terminated by `data: [DONE]`.

mod api;
mod client;
mod config;

pub use client::OpenRouterClient;
pub use config::OpenRouterConfig;
