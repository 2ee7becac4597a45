use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::SessionId;
use crate::types::{FileMap, TurnState};

/// Notifications published by the session controller.
///
/// `PreviewUpdated` carries the file map and the bundled preview of the
/// same tick, so subscribers never pair a preview with another tick's files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    TurnStarted {
        session: SessionId,
    },
    TranscriptUpdated {
        session: SessionId,
        content: String,
    },
    PreviewUpdated {
        session: SessionId,
        files: FileMap,
        preview: String,
    },
    TurnFinished {
        session: SessionId,
        state: TurnState,
        message: Option<String>,
    },
}

pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let session = SessionId::from("s1");

        bus.publish(SessionEvent::TurnStarted {
            session: session.clone(),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::TurnStarted { session: s } if s == session));
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let delivered = bus.publish(SessionEvent::TranscriptUpdated {
            session: SessionId::from("s1"),
            content: "hello".into(),
        });
        assert_eq!(delivered, 2);

        assert!(matches!(
            rx1.recv().await.unwrap(),
            SessionEvent::TranscriptUpdated { .. }
        ));
        assert!(matches!(
            rx2.recv().await.unwrap(),
            SessionEvent::TranscriptUpdated { .. }
        ));
    }

    #[test]
    fn publish_without_subscribers_returns_zero() {
        let bus = EventBus::new(4);
        let delivered = bus.publish(SessionEvent::TurnFinished {
            session: SessionId::from("s1"),
            state: TurnState::Complete,
            message: None,
        });
        assert_eq!(delivered, 0);
    }

    #[test]
    fn preview_event_serializes_with_tag() {
        let mut files = FileMap::new();
        files.insert("index.html".into(), "<html></html>".into());
        let event = SessionEvent::PreviewUpdated {
            session: SessionId::from("s1"),
            files,
            preview: "<html></html>".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PreviewUpdated");
        assert_eq!(json["data"]["files"]["index.html"], "<html></html>");
    }
}
