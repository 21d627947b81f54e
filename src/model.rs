use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged exchange, as returned by `GET /messages`. Server-assigned and
/// read-only on the client; a page of these is replaced wholesale per fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub user_query: String,
    pub refined_query: String,
    pub answer: String,
    pub conversation_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCount {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_query: String,
    pub conversation_history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub refined_query: String,
    pub original_query: String,
    pub conversation_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{ChatResponse, MessageCount, MessageRecord};

    #[test]
    fn message_record_decodes_wire_shape() {
        let data = r#"{
  "id": 7,
  "user_query": "What are your opening hours?",
  "refined_query": "opening hours",
  "answer": "We are open 9-5.",
  "conversation_id": "conv-1",
  "timestamp": "2024-01-02T09:00:00Z"
}"#;
        let record: MessageRecord =
            serde_json::from_str(data).expect("wire message should decode");
        assert_eq!(record.id, 7);
        assert_eq!(record.conversation_id.as_deref(), Some("conv-1"));
        assert_eq!(record.timestamp.to_rfc3339(), "2024-01-02T09:00:00+00:00");
    }

    #[test]
    fn message_record_allows_null_conversation_id() {
        let data = r#"{
  "id": 1,
  "user_query": "hi",
  "refined_query": "",
  "answer": "",
  "conversation_id": null,
  "timestamp": "2024-01-01T10:00:00Z"
}"#;
        let record: MessageRecord =
            serde_json::from_str(data).expect("null conversation_id should decode");
        assert!(record.conversation_id.is_none());
        assert!(record.refined_query.is_empty());
    }

    #[test]
    fn count_and_chat_responses_decode() {
        let count: MessageCount =
            serde_json::from_str(r#"{"count": 42}"#).expect("count should decode");
        assert_eq!(count.count, 42);

        let chat: ChatResponse = serde_json::from_str(
            r#"{"answer":"ok","refined_query":"r","original_query":"o"}"#,
        )
        .expect("chat response without conversation_id should decode");
        assert!(chat.conversation_id.is_none());
    }
}
