use crate::{
    api::error,
    modules::chat::{
        model::{ConversationCursor, InsertMessage, NewAuditLog},
        repository::ChatRepository,
        schema::{AcknowledgmentEntity, ChatMessage, PendingAcknowledgment},
    },
};

#[derive(Clone)]
pub struct ChatRepositoryPg {
    pool: sqlx::PgPool,
}

impl ChatRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ChatRepository for ChatRepositoryPg {
    async fn insert_message(
        &self,
        message: &InsertMessage,
    ) -> Result<ChatMessage, error::SystemError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
        INSERT INTO chat_messages
            (sender_id, sender_name, recipient_id, text, translated_text, attachments)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, sender_id, sender_name, recipient_id, text, translated_text, attachments, created_at
        "#,
        )
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(message.recipient_id)
        .bind(&message.text)
        .bind(&message.translated_text)
        .bind(&message.attachments)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn insert_acknowledgment(
        &self,
        message_id: i64,
        user_id: i64,
    ) -> Result<(), error::SystemError> {
        sqlx::query(
            "INSERT INTO chat_message_status (message_id, user_id, status) VALUES ($1, $2, 'sent') ON CONFLICT (message_id, user_id) DO NOTHING",
        )
        .bind(message_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_pending_acknowledgments(
        &self,
        user_id: i64,
    ) -> Result<Vec<PendingAcknowledgment>, error::SystemError> {
        // served by the partial index on (user_id) WHERE status = 'sent'
        let pending = sqlx::query_as::<_, PendingAcknowledgment>(
            r#"
        SELECT
            s.message_id,
            m.sender_id AS original_sender_id,
            m.sender_name AS original_sender_name
        FROM chat_message_status s
        JOIN chat_messages m ON m.id = s.message_id
        WHERE s.user_id = $1
          AND s.status = 'sent'
        ORDER BY s.message_id
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(pending)
    }

    async fn mark_replied(
        &self,
        user_id: i64,
        message_ids: &[i64],
        replied_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<i64>, error::SystemError> {
        if message_ids.is_empty() {
            return Ok(vec![]);
        }

        // single conditional update: concurrent replies cannot both transition a row
        let updated: Vec<i64> = sqlx::query_scalar(
            r#"
        UPDATE chat_message_status
        SET status = 'replied', status_at = $3
        WHERE user_id = $1
          AND message_id = ANY($2)
          AND status = 'sent'
        RETURNING message_id
        "#,
        )
        .bind(user_id)
        .bind(message_ids)
        .bind(replied_at)
        .fetch_all(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn append_audit_log(&self, entry: &NewAuditLog) -> Result<i64, error::SystemError> {
        let id: i64 = sqlx::query_scalar(
            r#"
        INSERT INTO chat_logs
            (message_id, direction, sender_id, sender_name, recipient_id,
             message_text, translated_text, attachments, meta, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, now()))
        RETURNING id
        "#,
        )
        .bind(entry.message_id)
        .bind(&entry.direction)
        .bind(entry.sender_id)
        .bind(&entry.sender_name)
        .bind(entry.recipient_id)
        .bind(&entry.message_text)
        .bind(&entry.translated_text)
        .bind(&entry.attachments)
        .bind(&entry.meta)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_message(&self, id: i64) -> Result<Option<ChatMessage>, error::SystemError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            "SELECT id, sender_id, sender_name, recipient_id, text, translated_text, attachments, created_at FROM chat_messages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_acknowledgments(
        &self,
        message_id: i64,
    ) -> Result<Vec<AcknowledgmentEntity>, error::SystemError> {
        let rows = sqlx::query_as::<_, AcknowledgmentEntity>(
            "SELECT message_id, user_id, status, status_at FROM chat_message_status WHERE message_id = $1 ORDER BY user_id",
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_conversation(
        &self,
        user_a: i64,
        user_b: i64,
        before: Option<ConversationCursor>,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, error::SystemError> {
        // has index on (sender_id, recipient_id, created_at DESC)

        let messages = if let Some(cursor) = before {
            sqlx::query_as::<_, ChatMessage>(
                r#"
            SELECT id, sender_id, sender_name, recipient_id, text, translated_text, attachments, created_at
            FROM chat_messages
            WHERE ((sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1))
              AND (created_at, id) < ($3, $4)
            ORDER BY created_at DESC, id DESC
            LIMIT $5
            "#,
            )
            .bind(user_a)
            .bind(user_b)
            .bind(cursor.before)
            .bind(cursor.before_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, ChatMessage>(
                r#"
            SELECT id, sender_id, sender_name, recipient_id, text, translated_text, attachments, created_at
            FROM chat_messages
            WHERE (sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
            )
            .bind(user_a)
            .bind(user_b)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(messages)
    }
}
