//! Driving one turn from a fragment source.

use futures_util::StreamExt;
use neonvibe_common::{EventBus, SessionEvent};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::provider::{connect, AdapterConfig};
use crate::FragmentSource;

use super::manager::GenerationSession;
use super::types::{error_text, SessionError, TurnOutcome};

/// Marks the turn cancelled if its future is dropped mid-stream.
struct TurnGuard<'a> {
    session: &'a mut GenerationSession,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if self.session.is_streaming() {
            warn!(session = %self.session.id, "Turn abandoned while streaming");
            self.session.finish_cancelled();
        }
    }
}

impl GenerationSession {
    /// Connect to the configured provider and run one turn.
    ///
    /// A connection failure (a missing API key included) still records the
    /// prompt and ends the turn as `Errored`, so the transcript shows why.
    pub async fn generate(
        &mut self,
        config: &AdapterConfig,
        prompt: &str,
        events: &EventBus,
    ) -> Result<TurnOutcome, SessionError> {
        match connect(config) {
            Ok(source) => self.run_turn(source.as_ref(), prompt, events).await,
            Err(error) => {
                self.begin_turn(prompt)?;
                self.publish_started(events);
                Ok(self.conclude(TurnOutcome::Errored(error), events))
            }
        }
    }

    /// Run one turn against `source`, folding in every fragment.
    ///
    /// Cancellation is checked before each fragment is applied and also
    /// races the pending network read, so a stalled provider does not hold
    /// the turn open. Dropping the returned future cancels the turn.
    pub async fn run_turn(
        &mut self,
        source: &dyn FragmentSource,
        prompt: &str,
        events: &EventBus,
    ) -> Result<TurnOutcome, SessionError> {
        self.begin_turn(prompt)?;
        let token = self.cancel.current();

        info!(session = %self.id, provider = source.name(), "Generation turn started");
        self.publish_started(events);

        let mut guard = TurnGuard { session: self };
        let outcome = guard.session.consume(source, &token, events).await;
        Ok(guard.session.conclude(outcome, events))
    }

    async fn consume(
        &mut self,
        source: &dyn FragmentSource,
        token: &CancellationToken,
        events: &EventBus,
    ) -> TurnOutcome {
        let history = self.request_history().to_vec();
        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = source.stream(&history) => Some(result),
        };
        let mut stream = match opened {
            None => return TurnOutcome::Cancelled,
            Some(Err(error)) => return TurnOutcome::Errored(error),
            Some(Ok(stream)) => stream,
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                item = stream.next() => Some(item),
            };
            match next {
                None => return TurnOutcome::Cancelled,
                Some(None) => return TurnOutcome::Complete,
                Some(Some(Err(error))) => return TurnOutcome::Errored(error),
                Some(Some(Ok(fragment))) => {
                    // Raced fragments arriving with the cancel are dropped.
                    if token.is_cancelled() {
                        return TurnOutcome::Cancelled;
                    }
                    let changed = self.apply_fragment(&fragment);
                    self.publish_tick(changed, events);
                }
            }
        }
    }

    /// Apply the terminal transition for `outcome` and announce it.
    fn conclude(&mut self, outcome: TurnOutcome, events: &EventBus) -> TurnOutcome {
        match &outcome {
            TurnOutcome::Complete => {
                self.finish_complete();
                info!(session = %self.id, files = self.files.len(), "Generation turn complete");
            }
            TurnOutcome::Cancelled => {
                self.finish_cancelled();
                info!(session = %self.id, "Generation turn cancelled");
            }
            TurnOutcome::Errored(error) => {
                self.finish_errored(error);
                warn!(session = %self.id, kind = ?error.kind(), error = %error, "Generation turn failed");
            }
        }

        events.publish(SessionEvent::TurnFinished {
            session: self.id.clone(),
            state: self.state,
            message: outcome.error().map(error_text),
        });
        outcome
    }

    fn publish_started(&self, events: &EventBus) {
        events.publish(SessionEvent::TurnStarted {
            session: self.id.clone(),
        });
    }

    fn publish_tick(&self, changed: usize, events: &EventBus) {
        events.publish(SessionEvent::TranscriptUpdated {
            session: self.id.clone(),
            content: self.accumulator.clone(),
        });
        if changed > 0 {
            events.publish(SessionEvent::PreviewUpdated {
                session: self.id.clone(),
                files: self.files.clone(),
                preview: self.preview.clone(),
            });
        }
    }
}
