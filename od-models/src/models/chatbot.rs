//! Assistant chat types: completion messages and saved exchanges.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// One message in a completion transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// "system", "user", or "assistant".
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: od_core::constants::chat_role::SYSTEM.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: od_core::constants::chat_role::USER.into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: od_core::constants::chat_role::ASSISTANT.into(),
            content: content.into(),
        }
    }
}

/// A saved question/answer exchange as the backend's chatbot endpoint
/// stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: i64,
    /// Exchange category, e.g. "ai_general".
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Flatten saved exchanges into a completion transcript, oldest first.
///
/// Rows are sorted by creation time (string-sorted when a timestamp fails
/// to parse) and each becomes a user/assistant message pair, matching how
/// the dashboard rebuilt the chat view from history.
pub fn flatten_history(mut rows: Vec<ChatExchange>) -> Vec<ChatMessage> {
    rows.sort_by_key(|row| {
        row.created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(i64::MAX)
    });

    let mut messages = Vec::with_capacity(rows.len() * 2);
    for row in rows {
        messages.push(ChatMessage::user(row.question));
        messages.push(ChatMessage::assistant(row.answer));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(question: &str, answer: &str, created_at: &str) -> ChatExchange {
        ChatExchange {
            id: Some("x".into()),
            user_id: 1,
            kind: Some("ai_general".into()),
            question: question.into(),
            answer: answer.into(),
            created_at: Some(created_at.into()),
        }
    }

    #[test]
    fn test_flatten_orders_by_created_at() {
        let rows = vec![
            exchange("second?", "yes", "2025-06-01T12:05:00+00:00"),
            exchange("first?", "no", "2025-06-01T12:00:00+00:00"),
        ];
        let messages = flatten_history(rows);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], ChatMessage::user("first?"));
        assert_eq!(messages[1], ChatMessage::assistant("no"));
        assert_eq!(messages[2], ChatMessage::user("second?"));
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten_history(vec![]).is_empty());
    }

    #[test]
    fn test_exchange_type_field_round_trip() {
        let json = r#"{"userId": 3, "type": "ai_general", "question": "q", "answer": "a"}"#;
        let x: ChatExchange = serde_json::from_str(json).unwrap();
        assert_eq!(x.kind.as_deref(), Some("ai_general"));
        let back = serde_json::to_value(&x).unwrap();
        assert_eq!(back["type"], "ai_general");
    }
}
