//! Generation session controller.
//!
//! A [`GenerationSession`] owns one conversation: its transcript, the
//! project files reconstructed from model output and the bundled preview.
//! Each turn runs `Idle -> Streaming -> {Complete | Cancelled | Errored}`;
//! every fragment is folded in synchronously, so the file map and preview
//! always belong to the same tick.

mod manager;
mod record;
mod turn;
mod types;


pub use manager::GenerationSession;
pub use record::{derive_title, SessionRecord};
pub use types::{error_text, CancelHandle, SessionError, TurnOutcome, CANCEL_ANNOTATION};
