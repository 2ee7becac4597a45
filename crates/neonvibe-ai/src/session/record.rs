//! Persisted form of a session.

use neonvibe_common::{FileMap, Message, SessionId, TurnState};
use serde::{Deserialize, Serialize};

use super::manager::GenerationSession;

const TITLE_CHARS: usize = 30;
const UNTITLED: &str = "Untitled Project";

/// Snapshot written to history after a turn ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    pub title: String,
    pub messages: Vec<Message>,
    #[serde(rename = "projectFiles")]
    pub files: FileMap,
    #[serde(rename = "previewHtml")]
    pub preview: String,
    /// Unix epoch milliseconds.
    pub last_modified: i64,
}

/// Title from the first message: its first 30 characters, with `...` when
/// truncated.
pub fn derive_title(messages: &[Message]) -> String {
    let Some(first) = messages.first() else {
        return UNTITLED.to_string();
    };
    let mut title: String = first.content.chars().take(TITLE_CHARS).collect();
    if first.content.chars().count() > TITLE_CHARS {
        title.push_str("...");
    }
    title
}

impl GenerationSession {
    /// Snapshot the session for persistence.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id.clone(),
            title: derive_title(&self.messages),
            messages: self.messages.clone(),
            files: self.files.clone(),
            preview: self.preview.clone(),
            last_modified: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Restore a saved session, idle and ready for the next turn.
    pub fn from_record(record: SessionRecord) -> Self {
        let mut session = Self::with_id(record.id);
        session.messages = record.messages;
        session.files = record.files;
        session.preview = record.preview;
        session.state = TurnState::Idle;
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_prompt_is_title() {
        assert_eq!(derive_title(&[Message::user("todo app")]), "todo app");
    }

    #[test]
    fn long_prompt_is_truncated() {
        let prompt = "a neon synthwave landing page for my band";
        let title = derive_title(&[Message::user(prompt)]);
        assert_eq!(title, "a neon synthwave landing page ...");
        assert_eq!(title.chars().count(), 33);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let prompt = "é".repeat(40);
        assert_eq!(derive_title(&[Message::user(prompt)]), format!("{}...", "é".repeat(30)));
    }

    #[test]
    fn empty_history_is_untitled() {
        assert_eq!(derive_title(&[]), "Untitled Project");
    }

    #[test]
    fn record_uses_history_field_names() {
        let record = SessionRecord {
            id: SessionId::from("s1"),
            title: "t".into(),
            messages: vec![Message::user("hi")],
            files: FileMap::from([("index.html".to_string(), "<p>".to_string())]),
            preview: "<p>".into(),
            last_modified: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "s1");
        assert_eq!(json["projectFiles"]["index.html"], "<p>");
        assert_eq!(json["previewHtml"], "<p>");
        assert_eq!(json["lastModified"], 1_700_000_000_000_i64);
        assert_eq!(json["messages"][0]["role"], "user");

        let back: SessionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
