/// Realtime Events
///
/// Các payload được phát qua Event Bus và ghi ra mỗi kết nối `/stream`.
/// Một tin nhắn mới được ghi nguyên dạng (không có trường `type`), các tín
/// hiệu khác mang trường `type` để client phân biệt.
use serde::{Deserialize, Serialize};

use crate::modules::chat::schema::ChatMessage;

/// Event được publish lên bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayEvent {
    /// Tín hiệu typing / replied (có trường `type`)
    Signal(SignalEvent),
    /// Tin nhắn vừa được lưu
    Message(ChatMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalEvent {
    /// User đang gõ / ngừng gõ
    #[serde(rename_all = "camelCase")]
    Typing { sender_id: i64, recipient_id: i64, status: String },

    /// Tin nhắn cũ đã được trả lời
    Replied {
        original_message_id: i64,
        #[serde(rename = "replierId")]
        replier_id: i64,
        #[serde(rename = "replierName")]
        replier_name: Option<String>,
        target: i64,
        #[serde(rename = "targetName")]
        target_name: Option<String>,
        reply: ChatMessage,
    },
}

impl RelayEvent {
    pub fn typing(sender_id: i64, recipient_id: i64, status: impl Into<String>) -> Self {
        RelayEvent::Signal(SignalEvent::Typing { sender_id, recipient_id, status: status.into() })
    }
}

impl From<ChatMessage> for RelayEvent {
    fn from(message: ChatMessage) -> Self {
        RelayEvent::Message(message)
    }
}

/// Frame điều khiển của stream, không đi qua bus
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum ControlFrame {
    /// Frame đầu tiên sau khi subscribe
    Ready { ready: bool },
    /// Keep-alive, giá trị là epoch millis
    Ping { ping: i64 },
}

impl ControlFrame {
    pub fn ready() -> Self {
        ControlFrame::Ready { ready: true }
    }

    pub fn ping_now() -> Self {
        ControlFrame::Ping { ping: chrono::Utc::now().timestamp_millis() }
    }
}
