use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::error;
use crate::modules::chat::schema::{AcknowledgmentEntity, ChatMessage};

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub sender_id: i64,
    pub sender_name: Option<String>,
    pub recipient_id: i64,
    pub text: String,
    pub translated_text: Option<String>,
    pub attachments: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub message_id: Option<i64>,
    pub direction: String,
    pub sender_id: i64,
    pub sender_name: Option<String>,
    pub recipient_id: i64,
    pub message_text: Option<String>,
    pub translated_text: Option<String>,
    pub attachments: Option<serde_json::Value>,
    pub meta: Option<serde_json::Value>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// `POST /send` body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    #[validate(required(message = "senderId is required"))]
    pub sender_id: Option<i64>,
    pub sender_name: Option<String>,
    #[validate(required(message = "recipientId is required"))]
    pub recipient_id: Option<i64>,
    pub text: Option<String>,
    pub attachments: Option<serde_json::Value>,
    #[validate(length(min = 2, max = 16, message = "sourceLang is not a language code"))]
    pub source_lang: Option<String>,
    #[validate(length(min = 2, max = 16, message = "targetLang is not a language code"))]
    pub target_lang: Option<String>,
}

/// A message that passed validation and is ready for the send pipeline.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub sender_id: i64,
    pub sender_name: Option<String>,
    pub recipient_id: i64,
    pub text: String,
    pub attachments: Option<serde_json::Value>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
}

impl TryFrom<SendMessageBody> for OutgoingMessage {
    type Error = error::SystemError;

    fn try_from(body: SendMessageBody) -> Result<Self, Self::Error> {
        let (Some(sender_id), Some(recipient_id)) = (body.sender_id, body.recipient_id) else {
            return Err(error::SystemError::bad_request("senderId and recipientId are required"));
        };

        Ok(OutgoingMessage {
            sender_id,
            sender_name: body.sender_name.filter(|name| !name.trim().is_empty()),
            recipient_id,
            text: body.text.unwrap_or_default(),
            attachments: body.attachments.filter(|a| !a.is_null()),
            source_lang: body.source_lang,
            target_lang: body.target_lang,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub message: ChatMessage,
}

/// `POST /typing` body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TypingBody {
    #[validate(required(message = "senderId is required"))]
    pub sender_id: Option<i64>,
    #[validate(required(message = "recipientId is required"))]
    pub recipient_id: Option<i64>,
    #[validate(
        required(message = "status is required"),
        length(min = 1, message = "status must not be empty")
    )]
    pub status: Option<String>,
}

/// `POST /log` body. Field names follow the `chat_logs` columns.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AuditLogBody {
    pub message_id: Option<i64>,
    #[validate(
        required(message = "direction is required"),
        length(min = 1, max = 32, message = "direction must not be empty")
    )]
    pub direction: Option<String>,
    #[validate(required(message = "sender_id is required"))]
    pub sender_id: Option<i64>,
    pub sender_name: Option<String>,
    #[validate(required(message = "recipient_id is required"))]
    pub recipient_id: Option<i64>,
    pub message_text: Option<String>,
    pub translated_text: Option<String>,
    pub attachments: Option<serde_json::Value>,
    pub meta: Option<serde_json::Value>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TryFrom<AuditLogBody> for NewAuditLog {
    type Error = error::SystemError;

    fn try_from(body: AuditLogBody) -> Result<Self, Self::Error> {
        let (Some(direction), Some(sender_id), Some(recipient_id)) =
            (body.direction, body.sender_id, body.recipient_id)
        else {
            return Err(error::SystemError::bad_request(
                "direction, sender_id and recipient_id are required",
            ));
        };

        Ok(NewAuditLog {
            message_id: body.message_id,
            direction,
            sender_id,
            sender_name: body.sender_name,
            recipient_id,
            message_text: body.message_text,
            translated_text: body.translated_text,
            attachments: body.attachments,
            meta: body.meta,
            created_at: body.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditLogResponse {
    #[serde(rename = "insertId")]
    pub insert_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageDetailResponse {
    pub message: ChatMessage,
    pub status: Vec<AcknowledgmentEntity>,
}

/// `GET /messages` query. `before` + `beforeId` come from the previous page's
/// `cursor`; `before` alone pages strictly by time.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConversationQuery {
    pub user_id: i64,
    pub peer_id: i64,
    pub before: Option<chrono::DateTime<chrono::Utc>>,
    pub before_id: Option<i64>,
    #[validate(range(min = 1, max = 200, message = "limit must be between 1 and 200"))]
    pub limit: Option<i64>,
}

impl ConversationQuery {
    pub fn cursor(&self) -> Option<ConversationCursor> {
        // ids are positive, so 0 keeps every row at `before` out of the page
        self.before
            .map(|before| ConversationCursor { before, before_id: self.before_id.unwrap_or(0) })
    }
}

/// Keyset position of the oldest row on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationCursor {
    pub before: chrono::DateTime<chrono::Utc>,
    pub before_id: i64,
}

impl From<&ChatMessage> for ConversationCursor {
    fn from(message: &ChatMessage) -> Self {
        ConversationCursor { before: message.created_at, before_id: message.id }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub messages: Vec<ChatMessage>,
    pub cursor: Option<ConversationCursor>,
}
