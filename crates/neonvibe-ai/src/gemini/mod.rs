//! Google Gemini streaming client.
//!
//! Talks to `streamGenerateContent` with `alt=sse`; every event carries a
//! candidate whose parts are already a text delta.

mod api;
mod client;
mod config;

pub use client::GeminiClient;
pub use config::GeminiConfig;
