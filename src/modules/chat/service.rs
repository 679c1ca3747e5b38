/// Chat Service
///
/// Service layer của chat relay, bao gồm:
/// - Gửi tin nhắn (send pipeline)
/// - Tín hiệu typing
/// - Ghi audit log từ bên ngoài
/// - Đọc lịch sử tin nhắn
use std::future::Future;
use std::sync::Arc;

use crate::api::error;
use crate::modules::chat::model::{
    ConversationCursor, ConversationQuery, ConversationResponse, InsertMessage,
    MessageDetailResponse, NewAuditLog, OutgoingMessage,
};
use crate::modules::chat::repository::ChatRepository;
use crate::modules::chat::resolver::{ReplyResolver, ReplyScope};
use crate::modules::chat::schema::ChatMessage;
use crate::modules::realtime::bus::EventBus;
use crate::modules::realtime::events::RelayEvent;
use crate::modules::translation::Translator;

const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub source_lang: String,
    pub target_lang: String,
    pub reply_scope: ReplyScope,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self { source_lang: "auto".into(), target_lang: "en".into(), reply_scope: ReplyScope::Any }
    }
}

#[derive(Clone)]
pub struct ChatService {
    repo: Arc<dyn ChatRepository + Send + Sync>,
    translator: Arc<dyn Translator>,
    bus: Arc<dyn EventBus>,
    resolver: ReplyResolver,
    settings: ChatSettings,
}

/// Chạy một bước phụ của pipeline: lỗi chỉ được log, không làm hỏng request
async fn best_effort<T, F>(step: &'static str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, error::SystemError>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{} failed, continuing without it: {}", step, e);
            None
        }
    }
}

impl ChatService {
    pub fn with_dependencies(
        repo: Arc<dyn ChatRepository + Send + Sync>,
        translator: Arc<dyn Translator>,
        bus: Arc<dyn EventBus>,
        settings: ChatSettings,
    ) -> Self {
        let resolver = ReplyResolver::new(repo.clone(), bus.clone(), settings.reply_scope);
        log::info!("ChatService initialized with reply scope {:?}", settings.reply_scope);
        ChatService { repo, translator, bus, resolver, settings }
    }

    /// Gửi một tin nhắn từ đầu đến cuối
    ///
    /// Flow:
    /// 1. Dịch (best effort)
    /// 2. Lưu message, bước duy nhất được phép làm hỏng request
    /// 3. Ghi audit log (best effort)
    /// 4. Tạo status row `sent` cho người nhận (best effort)
    /// 5. Reply Resolver với người gửi là replier (best effort)
    /// 6. Publish message lên Event Bus
    pub async fn send_message(
        &self,
        outgoing: OutgoingMessage,
    ) -> Result<ChatMessage, error::SystemError> {
        let source = outgoing.source_lang.as_deref().unwrap_or(self.settings.source_lang.as_str());
        let target = outgoing.target_lang.as_deref().unwrap_or(self.settings.target_lang.as_str());

        let translated_text =
            best_effort("translation", self.translate(&outgoing.text, source, target))
                .await
                .flatten();

        let message = self
            .repo
            .insert_message(&InsertMessage {
                sender_id: outgoing.sender_id,
                sender_name: outgoing.sender_name,
                recipient_id: outgoing.recipient_id,
                text: outgoing.text,
                translated_text,
                attachments: outgoing.attachments,
            })
            .await?;

        let meta = message
            .translated_text
            .as_ref()
            .map(|_| serde_json::json!({ "source": source, "target": target }));

        best_effort(
            "audit log",
            self.repo.append_audit_log(&NewAuditLog {
                message_id: Some(message.id),
                direction: "sent".into(),
                sender_id: message.sender_id,
                sender_name: message.sender_name.clone(),
                recipient_id: message.recipient_id,
                message_text: Some(message.text.clone()),
                translated_text: message.translated_text.clone(),
                attachments: message.attachments.clone(),
                meta,
                created_at: Some(message.created_at),
            }),
        )
        .await;

        best_effort(
            "acknowledgment",
            self.repo.insert_acknowledgment(message.id, message.recipient_id),
        )
        .await;

        best_effort("reply resolution", self.resolver.resolve(&message)).await;

        let delivered = self.bus.publish(RelayEvent::from(message.clone()));
        log::info!(
            "Message {} from {} to {} stored and delivered to {} stream(s)",
            message.id,
            message.sender_id,
            message.recipient_id,
            delivered
        );

        Ok(message)
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, error::SystemError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.translator.translate(text, source, target).await
    }

    /// Phát tín hiệu typing, không chạm tới database
    pub fn notify_typing(
        &self,
        sender_id: Option<i64>,
        recipient_id: Option<i64>,
        status: Option<String>,
    ) -> Result<usize, error::SystemError> {
        let (Some(sender_id), Some(recipient_id), Some(status)) =
            (sender_id, recipient_id, status.filter(|s| !s.is_empty()))
        else {
            return Err(error::SystemError::bad_request(
                "senderId, recipientId and status are required",
            ));
        };

        Ok(self.bus.publish(RelayEvent::typing(sender_id, recipient_id, status)))
    }

    /// Ghi audit log do client gửi lên; ở đây lỗi ghi là lỗi của request
    pub async fn append_log(&self, entry: NewAuditLog) -> Result<i64, error::SystemError> {
        let id = self.repo.append_audit_log(&entry).await?;
        log::debug!("Audit log {} appended ({})", id, entry.direction);
        Ok(id)
    }

    pub async fn get_message(&self, id: i64) -> Result<MessageDetailResponse, error::SystemError> {
        let message = self
            .repo
            .find_message(id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;
        let status = self.repo.find_acknowledgments(id).await?;
        Ok(MessageDetailResponse { message, status })
    }

    pub async fn get_conversation(
        &self,
        query: &ConversationQuery,
    ) -> Result<ConversationResponse, error::SystemError> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let messages = self
            .repo
            .find_conversation(query.user_id, query.peer_id, query.cursor(), limit)
            .await?;

        let cursor = if messages.len() as i64 == limit {
            messages.last().map(ConversationCursor::from)
        } else {
            None
        };

        Ok(ConversationResponse { messages, cursor })
    }
}
