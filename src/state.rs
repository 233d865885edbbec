//! Wire and chat types shared by the client, the TUI and the server.
//!
//! These don't depend on any UI framework so the server module can reuse
//! them for its JSON bodies.

use serde::{Deserialize, Serialize};

/// One rendered chat entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Who a chat entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
    /// Describes an action the client took (e.g. "Showing help")
    Meta,
}

/// Server-owned summary of the coaching conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub topic: Option<String>,
    pub word_count: Option<u32>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub explain: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub state: SessionState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_without_notes_decodes() {
        let body = r#"{"reply": "hi", "state": {"topic": "physics", "word_count": 42, "explain": true}}"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.reply, "hi");
        assert_eq!(resp.state.topic.as_deref(), Some("physics"));
        assert_eq!(resp.state.word_count, Some(42));
        assert!(resp.state.explain);
        assert!(resp.state.notes.is_empty());
    }

    #[test]
    fn test_default_state_serializes_nulls() {
        let json = serde_json::to_value(SessionState::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"topic": null, "word_count": null, "notes": [], "explain": false})
        );
    }

    #[test]
    fn test_request_missing_message_is_empty() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.message, "");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = ChatMessage::new(ChatRole::Meta, "Showing help");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"meta","text":"Showing help"}"#);
    }
}
