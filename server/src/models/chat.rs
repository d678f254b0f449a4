use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub text: String,
    pub is_user: bool,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
            sent_at: Utc::now(),
        }
    }

    pub fn from_bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
            sent_at: Utc::now(),
        }
    }
}
