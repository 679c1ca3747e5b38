use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "ack_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Sent,
    Replied,
}

/// Row of `chat_messages`. Serialized as-is into `/send` responses and
/// stream frames.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: Option<String>,
    pub recipient_id: i64,
    pub text: String,
    pub translated_text: Option<String>,
    pub attachments: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Row of `chat_message_status`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgmentEntity {
    pub message_id: i64,
    pub user_id: i64,
    pub status: AckStatus,
    pub status_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Pending acknowledgment joined back to the message that is waiting for an
/// answer.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PendingAcknowledgment {
    pub message_id: i64,
    pub original_sender_id: i64,
    pub original_sender_name: Option<String>,
}
