/// Reply Resolver
///
/// Khi có tin nhắn mới, xác định những tin nhắn trước đó mà nó trả lời,
/// chuyển trạng thái `sent → replied` và báo cho người gửi ban đầu.
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::error;
use crate::modules::chat::repository::ChatRepository;
use crate::modules::chat::schema::{ChatMessage, PendingAcknowledgment};
use crate::modules::realtime::bus::EventBus;
use crate::modules::realtime::events::{RelayEvent, SignalEvent};

/// Phạm vi một tin trả lời được coi là "đã trả lời"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyScope {
    /// Mọi tin đang chờ người gửi reply trả lời, bất kể ai gửi
    #[default]
    Any,
    /// Chỉ các tin đang chờ của đúng cặp (người nhận reply → người gửi reply)
    Pair,
}

impl FromStr for ReplyScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pair" => Ok(ReplyScope::Pair),
            "any" => Ok(ReplyScope::Any),
            other => Err(format!("unknown reply scope `{other}`")),
        }
    }
}

#[derive(Clone)]
pub struct ReplyResolver {
    repo: Arc<dyn ChatRepository + Send + Sync>,
    bus: Arc<dyn EventBus>,
    scope: ReplyScope,
}

impl ReplyResolver {
    pub fn new(
        repo: Arc<dyn ChatRepository + Send + Sync>,
        bus: Arc<dyn EventBus>,
        scope: ReplyScope,
    ) -> Self {
        Self { repo, bus, scope }
    }

    /// Xử lý `reply` như một câu trả lời của `reply.sender_id`.
    ///
    /// Flow:
    /// 1. Tìm các status row của replier còn `sent`
    /// 2. Lọc theo scope
    /// 3. Cập nhật hàng loạt bằng một câu UPDATE có điều kiện
    /// 4. Publish một event `replied` cho mỗi người gửi ban đầu
    ///
    /// Chỉ những row thực sự được UPDATE mới sinh event, nên gọi lại với
    /// cùng tập message không phát event trùng. Trả về số event đã publish.
    pub async fn resolve(&self, reply: &ChatMessage) -> Result<usize, error::SystemError> {
        let pending = self.repo.find_pending_acknowledgments(reply.sender_id).await?;

        let pending: Vec<PendingAcknowledgment> = match self.scope {
            ReplyScope::Pair => pending
                .into_iter()
                .filter(|p| p.original_sender_id == reply.recipient_id)
                .collect(),
            ReplyScope::Any => pending,
        };

        if pending.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i64> = pending.iter().map(|p| p.message_id).collect();
        let updated = self.repo.mark_replied(reply.sender_id, &ids, reply.created_at).await?;

        if updated.is_empty() {
            log::debug!("Pending rows for user {} were already replied", reply.sender_id);
            return Ok(0);
        }

        // newest transitioned message per original sender
        let mut targets: BTreeMap<i64, &PendingAcknowledgment> = BTreeMap::new();
        for row in pending.iter().filter(|p| updated.contains(&p.message_id)) {
            targets
                .entry(row.original_sender_id)
                .and_modify(|current| {
                    if row.message_id > current.message_id {
                        *current = row;
                    }
                })
                .or_insert(row);
        }

        for (target, row) in &targets {
            self.bus.publish(RelayEvent::Signal(SignalEvent::Replied {
                original_message_id: row.message_id,
                replier_id: reply.sender_id,
                replier_name: reply.sender_name.clone(),
                target: *target,
                target_name: row.original_sender_name.clone(),
                reply: reply.clone(),
            }));
        }

        log::info!(
            "Message {} replied to {} pending message(s) from {} sender(s)",
            reply.id,
            updated.len(),
            targets.len()
        );

        Ok(targets.len())
    }
}
