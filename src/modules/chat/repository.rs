use crate::api::error;
use crate::modules::chat::model::{ConversationCursor, InsertMessage, NewAuditLog};
use crate::modules::chat::schema::{AcknowledgmentEntity, ChatMessage, PendingAcknowledgment};

#[async_trait::async_trait]
pub trait ChatRepository {
    async fn insert_message(
        &self,
        message: &InsertMessage,
    ) -> Result<ChatMessage, error::SystemError>;

    async fn insert_acknowledgment(
        &self,
        message_id: i64,
        user_id: i64,
    ) -> Result<(), error::SystemError>;

    /// Rows for `user_id` still in `sent`, joined to the message that owns them.
    async fn find_pending_acknowledgments(
        &self,
        user_id: i64,
    ) -> Result<Vec<PendingAcknowledgment>, error::SystemError>;

    /// Moves `user_id`'s rows for `message_ids` from `sent` to `replied` in one
    /// conditional update and returns the ids that actually changed. Rows
    /// already `replied` and rows of other recipients are left alone.
    async fn mark_replied(
        &self,
        user_id: i64,
        message_ids: &[i64],
        replied_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<i64>, error::SystemError>;

    async fn append_audit_log(&self, entry: &NewAuditLog) -> Result<i64, error::SystemError>;

    async fn find_message(&self, id: i64) -> Result<Option<ChatMessage>, error::SystemError>;

    async fn find_acknowledgments(
        &self,
        message_id: i64,
    ) -> Result<Vec<AcknowledgmentEntity>, error::SystemError>;

    /// Messages exchanged between two users, newest first, strictly older
    /// than `before` in `(created_at, id)` order.
    async fn find_conversation(
        &self,
        user_a: i64,
        user_b: i64,
        before: Option<ConversationCursor>,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, error::SystemError>;
}
