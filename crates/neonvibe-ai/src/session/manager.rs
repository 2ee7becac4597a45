//! Session struct and per-tick state transitions.

use neonvibe_common::{FileMap, Message, Role, SessionId, TurnState};
use neonvibe_project::{bundle, extract, merge_files};
use tracing::debug;

use crate::AiError;

use super::types::{error_annotation, CancelHandle, SessionError, CANCEL_ANNOTATION};

/// One conversation with its reconstructed project.
///
/// The file map persists across turns of the same session; a new session
/// starts empty.
#[derive(Debug)]
pub struct GenerationSession {
    pub(super) id: SessionId,
    pub(super) messages: Vec<Message>,
    pub(super) files: FileMap,
    /// Always `bundle(files)` as of the last applied fragment.
    pub(super) preview: String,
    pub(super) state: TurnState,
    /// Raw model text of the current turn.
    pub(super) accumulator: String,
    pub(super) cancel: CancelHandle,
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            messages: Vec::new(),
            files: FileMap::new(),
            preview: String::new(),
            state: TurnState::Idle,
            accumulator: String::new(),
            cancel: CancelHandle::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn files(&self) -> &FileMap {
        &self.files
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state == TurnState::Streaming
    }

    /// Handle for cancelling turns of this session from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Only meaningful while streaming; always `false` otherwise.
    pub fn cancel_requested(&self) -> bool {
        self.is_streaming() && self.cancel.is_cancelled()
    }

    /// Start a turn for `prompt`.
    ///
    /// Appends the user message and an empty in-progress model message,
    /// clears any earlier cancel request and enters `Streaming`.
    pub fn begin_turn(&mut self, prompt: &str) -> Result<(), SessionError> {
        if self.is_streaming() {
            return Err(SessionError::Busy);
        }
        if prompt.trim().is_empty() {
            return Err(SessionError::EmptyPrompt);
        }

        self.messages.push(Message::user(prompt));
        self.messages.push(Message::model(String::new()));
        self.accumulator.clear();
        self.cancel.reset();
        self.state = TurnState::Streaming;
        Ok(())
    }

    /// History sent to the provider: everything up to and including the
    /// newest user message.
    pub fn request_history(&self) -> &[Message] {
        match self.messages.split_last() {
            Some((last, rest)) if self.is_streaming() && last.role == Role::Model => rest,
            _ => &self.messages,
        }
    }

    /// Fold one fragment into the transcript, the file map and the preview.
    ///
    /// Returns the number of files added or changed by this tick. Ignored
    /// unless a turn is streaming.
    pub fn apply_fragment(&mut self, fragment: &str) -> usize {
        if !self.is_streaming() {
            return 0;
        }

        self.accumulator.push_str(fragment);
        if let Some(current) = self.messages.last_mut() {
            current.content.clone_from(&self.accumulator);
        }

        let changed = merge_files(&mut self.files, extract(&self.accumulator));
        if changed > 0 {
            self.preview = bundle(&self.files);
            debug!(session = %self.id, changed, files = self.files.len(), "Project files updated");
        }
        changed
    }

    /// Fragments ran out without cancellation or error.
    pub fn finish_complete(&mut self) -> bool {
        self.finish(TurnState::Complete, None)
    }

    /// Stop the turn and annotate the model message once.
    pub fn finish_cancelled(&mut self) -> bool {
        self.finish(TurnState::Cancelled, Some(CANCEL_ANNOTATION.to_string()))
    }

    /// Fail the turn and annotate the model message with the error.
    pub fn finish_errored(&mut self, error: &AiError) -> bool {
        self.finish(TurnState::Errored, Some(error_annotation(error)))
    }

    /// Leave `Streaming` for `state`. Files and preview keep their last
    /// applied values. Returns `false` when no turn was streaming.
    fn finish(&mut self, state: TurnState, annotation: Option<String>) -> bool {
        if !self.is_streaming() {
            return false;
        }
        if let (Some(note), Some(current)) = (annotation, self.messages.last_mut()) {
            current.content.push_str(&note);
        }
        self.state = state;
        self.cancel.reset();
        true
    }
}
