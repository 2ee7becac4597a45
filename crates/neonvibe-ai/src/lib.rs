//! Streaming generation engine for NeonVibe.
//!
//! Provides:
//! - one fragment-sequence interface over two incompatible streaming
//!   protocols (Gemini and OpenRouter)
//! - the generation session controller that folds every fragment into
//!   the transcript, the project file map and the bundled preview
//! - persisted session records

pub mod gemini;
pub mod openrouter;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod streaming;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

pub use gemini::{GeminiClient, GeminiConfig};
pub use neonvibe_common::{Message, ProviderKind, Role};
pub use openrouter::{OpenRouterClient, OpenRouterConfig};
pub use provider::{connect, stream_generation, AdapterConfig};
pub use session::{CancelHandle, GenerationSession, SessionError, SessionRecord, TurnOutcome};

/// Ordered text fragments of one model response.
///
/// Fragments carry no boundary semantics: one may end mid-word, mid-line
/// or in the middle of a file marker. The first `Err` ends the sequence.
pub type FragmentStream = BoxStream<'static, Result<String, AiError>>;

/// A remote model that streams its answer as text fragments.
///
/// Each call opens a fresh request; a sequence cannot be resumed. Dropping
/// the returned stream abandons the request and closes its connection.
#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Start generating a reply to `history`.
    ///
    /// Fails before yielding anything when the request itself is rejected.
    async fn stream(&self, history: &[Message]) -> Result<FragmentStream, AiError>;
}

/// Coarse classification of [`AiError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CredentialMissing,
    Transport,
    ProviderLogic,
    MalformedFrame,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AiError {
    /// No API key configured; nothing was sent.
    #[error("API key is required. Please configure it in Settings.")]
    CredentialMissing,
    /// Non-success HTTP status or a failure of the connection itself.
    #[error("transport error: {0}")]
    Transport(String),
    /// The provider answered but reported an error or produced nothing usable.
    #[error("provider error: {0}")]
    ProviderLogic(String),
    /// One stream frame could not be decoded. Skipped, never fatal.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

impl AiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AiError::CredentialMissing => ErrorKind::CredentialMissing,
            AiError::Transport(_) => ErrorKind::Transport,
            AiError::ProviderLogic(_) => ErrorKind::ProviderLogic,
            AiError::MalformedFrame(_) => ErrorKind::MalformedFrame,
        }
    }

    /// Whether the caller should send the user to the settings surface.
    pub fn needs_configuration(&self) -> bool {
        matches!(self, AiError::CredentialMissing)
    }

    /// Whether the error ends the turn.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AiError::MalformedFrame(_))
    }
}
