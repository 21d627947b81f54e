use crate::model::ChatTurn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod store;

pub const SCHEMA_VERSION: u32 = 1;

/// Upper bound on locally kept conversations; the oldest are evicted.
pub const HISTORY_LIMIT: usize = 50;

const PREVIEW_MAX_CHARS: usize = 60;

/// One locally persisted conversation, newest activity first in the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub messages: Vec<ChatTurn>,
    pub timestamp: DateTime<Utc>,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryFile {
    pub schema_version: u32,
    pub conversations: Vec<ConversationSummary>,
}

impl Default for HistoryFile {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            conversations: Vec::new(),
        }
    }
}

/// Sidebar preview text: the first user turn, truncated.
pub fn preview_of(turns: &[ChatTurn]) -> String {
    let source = turns
        .iter()
        .find(|turn| turn.role == "user")
        .or_else(|| turns.first())
        .map(|turn| turn.content.as_str())
        .unwrap_or("");

    let first_line = source.lines().next().unwrap_or(source).trim();
    if first_line.chars().count() <= PREVIEW_MAX_CHARS {
        return first_line.to_string();
    }
    first_line.chars().take(PREVIEW_MAX_CHARS).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::preview_of;
    use crate::model::ChatTurn;
    use chrono::Utc;

    fn turn(role: &str, content: &str) -> ChatTurn {
        ChatTurn {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn preview_uses_first_user_turn() {
        let turns = vec![turn("assistant", "greeting"), turn("user", "where is my order")];
        assert_eq!(preview_of(&turns), "where is my order");
    }

    #[test]
    fn preview_truncates_long_first_lines() {
        let long = "x".repeat(80);
        let preview = preview_of(&[turn("user", &long)]);
        assert_eq!(preview.chars().count(), 61);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn preview_of_empty_transcript_is_empty() {
        assert_eq!(preview_of(&[]), "");
    }
}
