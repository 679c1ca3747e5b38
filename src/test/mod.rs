//! In-memory fakes shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::error;
use crate::modules::chat::model::{ConversationCursor, InsertMessage, NewAuditLog};
use crate::modules::chat::repository::ChatRepository;
use crate::modules::chat::schema::{
    AckStatus, AcknowledgmentEntity, ChatMessage, PendingAcknowledgment,
};
use crate::modules::translation::Translator;

#[derive(Default)]
struct Tables {
    messages: Vec<ChatMessage>,
    statuses: Vec<AcknowledgmentEntity>,
    logs: Vec<(i64, NewAuditLog)>,
    frozen_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Mirrors `ChatRepositoryPg` semantics over plain vectors.
#[derive(Default)]
pub struct MemoryChatRepository {
    tables: Mutex<Tables>,
    pub fail_messages: AtomicBool,
    pub fail_acknowledgments: AtomicBool,
    pub fail_audit: AtomicBool,
}

impl MemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message inserted from now on gets `at` as its `created_at`.
    pub fn freeze_clock(&self, at: chrono::DateTime<chrono::Utc>) {
        self.tables.lock().unwrap().frozen_at = Some(at);
    }

    pub fn message_count(&self) -> usize {
        self.tables.lock().unwrap().messages.len()
    }

    pub fn status_count(&self) -> usize {
        self.tables.lock().unwrap().statuses.len()
    }

    pub fn log_count(&self) -> usize {
        self.tables.lock().unwrap().logs.len()
    }

    pub fn logs(&self) -> Vec<NewAuditLog> {
        self.tables.lock().unwrap().logs.iter().map(|(_, entry)| entry.clone()).collect()
    }

    pub fn status_of(&self, message_id: i64, user_id: i64) -> Option<AcknowledgmentEntity> {
        self.tables
            .lock()
            .unwrap()
            .statuses
            .iter()
            .find(|s| s.message_id == message_id && s.user_id == user_id)
            .cloned()
    }
}

fn db_down() -> error::SystemError {
    error::SystemError::DatabaseError("connection refused".into())
}

#[async_trait::async_trait]
impl ChatRepository for MemoryChatRepository {
    async fn insert_message(
        &self,
        message: &InsertMessage,
    ) -> Result<ChatMessage, error::SystemError> {
        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(db_down());
        }

        let mut tables = self.tables.lock().unwrap();
        let row = ChatMessage {
            id: tables.messages.len() as i64 + 1,
            sender_id: message.sender_id,
            sender_name: message.sender_name.clone(),
            recipient_id: message.recipient_id,
            text: message.text.clone(),
            translated_text: message.translated_text.clone(),
            attachments: message.attachments.clone(),
            created_at: tables.frozen_at.unwrap_or_else(chrono::Utc::now),
        };
        tables.messages.push(row.clone());
        Ok(row)
    }

    async fn insert_acknowledgment(
        &self,
        message_id: i64,
        user_id: i64,
    ) -> Result<(), error::SystemError> {
        if self.fail_acknowledgments.load(Ordering::SeqCst) {
            return Err(db_down());
        }

        let mut tables = self.tables.lock().unwrap();
        let exists =
            tables.statuses.iter().any(|s| s.message_id == message_id && s.user_id == user_id);
        if !exists {
            tables.statuses.push(AcknowledgmentEntity {
                message_id,
                user_id,
                status: AckStatus::Sent,
                status_at: None,
            });
        }
        Ok(())
    }

    async fn find_pending_acknowledgments(
        &self,
        user_id: i64,
    ) -> Result<Vec<PendingAcknowledgment>, error::SystemError> {
        let tables = self.tables.lock().unwrap();
        let mut pending: Vec<PendingAcknowledgment> = tables
            .statuses
            .iter()
            .filter(|s| s.user_id == user_id && s.status == AckStatus::Sent)
            .filter_map(|s| {
                tables.messages.iter().find(|m| m.id == s.message_id).map(|m| {
                    PendingAcknowledgment {
                        message_id: m.id,
                        original_sender_id: m.sender_id,
                        original_sender_name: m.sender_name.clone(),
                    }
                })
            })
            .collect();
        pending.sort_by_key(|p| p.message_id);
        Ok(pending)
    }

    async fn mark_replied(
        &self,
        user_id: i64,
        message_ids: &[i64],
        replied_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<i64>, error::SystemError> {
        let mut tables = self.tables.lock().unwrap();
        let mut updated = Vec::new();
        for status in tables.statuses.iter_mut() {
            if status.user_id == user_id
                && message_ids.contains(&status.message_id)
                && status.status == AckStatus::Sent
            {
                status.status = AckStatus::Replied;
                status.status_at = Some(replied_at);
                updated.push(status.message_id);
            }
        }
        Ok(updated)
    }

    async fn append_audit_log(&self, entry: &NewAuditLog) -> Result<i64, error::SystemError> {
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(db_down());
        }

        let mut tables = self.tables.lock().unwrap();
        let id = tables.logs.len() as i64 + 1;
        tables.logs.push((id, entry.clone()));
        Ok(id)
    }

    async fn find_message(&self, id: i64) -> Result<Option<ChatMessage>, error::SystemError> {
        Ok(self.tables.lock().unwrap().messages.iter().find(|m| m.id == id).cloned())
    }

    async fn find_acknowledgments(
        &self,
        message_id: i64,
    ) -> Result<Vec<AcknowledgmentEntity>, error::SystemError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .statuses
            .iter()
            .filter(|s| s.message_id == message_id)
            .cloned()
            .collect())
    }

    async fn find_conversation(
        &self,
        user_a: i64,
        user_b: i64,
        before: Option<ConversationCursor>,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, error::SystemError> {
        let tables = self.tables.lock().unwrap();
        let mut messages: Vec<ChatMessage> = tables
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == user_a && m.recipient_id == user_b)
                    || (m.sender_id == user_b && m.recipient_id == user_a)
            })
            .filter(|m| before.map_or(true, |b| (m.created_at, m.id) < (b.before, b.before_id)))
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        messages.truncate(limit as usize);
        Ok(messages)
    }
}

/// What the scripted translator answers with.
pub enum TranslatorScript {
    Translate(&'static str),
    Fail,
}

pub struct ScriptedTranslator {
    script: TranslatorScript,
    pub calls: AtomicUsize,
}

impl ScriptedTranslator {
    pub fn new(script: TranslatorScript) -> Self {
        Self { script, calls: AtomicUsize::new(0) }
    }
}

#[async_trait::async_trait]
impl Translator for ScriptedTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<Option<String>, error::SystemError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            TranslatorScript::Translate(text) => Ok(Some(text.to_string())),
            TranslatorScript::Fail => {
                Err(error::SystemError::InternalError("provider timed out".into()))
            }
        }
    }
}
