//! Session types: cancellation handle, turn outcome and errors.

use std::sync::{Arc, Mutex, PoisonError};

use neonvibe_common::TurnState;
use tokio_util::sync::CancellationToken;

use crate::AiError;

/// Appended to the model message when the user stops a turn.
pub const CANCEL_ANNOTATION: &str = "\n\n*[Generation cancelled by user]*";

/// Cloneable handle that requests cancellation of the current turn.
///
/// Every turn gets a fresh token, so a cancel issued for an earlier turn
/// never leaks into the next one. Handles cloned before a turn starts
/// still reach it.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: Arc<Mutex<CancellationToken>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Observed before the next fragment is applied.
    pub fn cancel(&self) {
        self.current().cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.current().is_cancelled()
    }

    pub(crate) fn current(&self) -> CancellationToken {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a fresh token and return it.
    pub(crate) fn reset(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = fresh.clone();
        fresh
    }
}

/// How a turn ended.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    Complete,
    Cancelled,
    Errored(AiError),
}

impl TurnOutcome {
    pub fn state(&self) -> TurnState {
        match self {
            TurnOutcome::Complete => TurnState::Complete,
            TurnOutcome::Cancelled => TurnState::Cancelled,
            TurnOutcome::Errored(_) => TurnState::Errored,
        }
    }

    pub fn error(&self) -> Option<&AiError> {
        match self {
            TurnOutcome::Errored(e) => Some(e),
            _ => None,
        }
    }
}

/// Reasons a turn is refused before it starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a generation is already streaming in this session")]
    Busy,
    #[error("prompt is empty")]
    EmptyPrompt,
}

/// User-facing text for a failed turn.
pub fn error_text(error: &AiError) -> String {
    match error {
        AiError::CredentialMissing => "Missing API Key. Please configure it in Settings.".into(),
        other => other.to_string(),
    }
}

pub(crate) fn error_annotation(error: &AiError) -> String {
    format!("\n\n**Error:** {}", error_text(error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_reaches_clones() {
        let handle = CancelHandle::new();
        let clone = handle.clone();
        clone.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn reset_clears_cancellation_for_all_clones() {
        let handle = CancelHandle::new();
        let clone = handle.clone();
        handle.cancel();
        let fresh = handle.reset();
        assert!(!fresh.is_cancelled());
        assert!(!clone.is_cancelled());

        clone.cancel();
        assert!(fresh.is_cancelled());
    }

    #[test]
    fn missing_key_has_configuration_hint() {
        assert_eq!(
            error_annotation(&AiError::CredentialMissing),
            "\n\n**Error:** Missing API Key. Please configure it in Settings."
        );
        assert_eq!(
            error_annotation(&AiError::Transport("HTTP 500: boom".into())),
            "\n\n**Error:** transport error: HTTP 500: boom"
        );
    }

    #[test]
    fn outcome_states() {
        assert_eq!(TurnOutcome::Complete.state(), TurnState::Complete);
        assert_eq!(TurnOutcome::Cancelled.state(), TurnState::Cancelled);
        let errored = TurnOutcome::Errored(AiError::CredentialMissing);
        assert_eq!(errored.state(), TurnState::Errored);
        assert!(errored.error().is_some_and(AiError::needs_configuration));
    }
}
