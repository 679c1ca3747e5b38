/// Event Bus
///
/// Publish/subscribe trong process: mỗi kết nối `/stream` giữ một subscription,
/// mỗi lần publish event được đẩy vào channel của tất cả subscriber đang sống.
/// Không lưu trữ, không đảm bảo giao hàng ngoài "ai đang nghe thì nhận".
/// Channel có giới hạn: subscriber không đọc kịp sẽ bị bỏ event khi đầy.
///
/// `EventBus` là trait để có thể thay bằng broker phân tán (Redis pub/sub,
/// queue...) mà không phải sửa service hay broadcaster.
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use uuid::Uuid;

use super::events::RelayEvent;

/// Số event tối đa đang chờ trong channel của một subscriber
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 256;

/// ID duy nhất của một subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle trả về cho subscriber: ID để unsubscribe + đầu nhận của channel
pub struct Subscription {
    pub id: SubscriptionId,
    pub receiver: Receiver<Arc<RelayEvent>>,
}

pub trait EventBus: Send + Sync {
    fn subscribe(&self) -> Subscription;

    /// Gọi nhiều lần không sao
    fn unsubscribe(&self, id: SubscriptionId);

    /// Giao event cho mọi subscriber hiện tại, trả về số subscriber đã nhận.
    /// Subscriber lỗi hoặc đầy channel không ảnh hưởng các subscriber khác và
    /// không báo lỗi ngược lại cho publisher.
    fn publish(&self, event: RelayEvent) -> usize;

    fn subscriber_count(&self) -> usize;
}

/// Bus trong bộ nhớ, chỉ tới được subscriber cùng process
pub struct InMemoryEventBus {
    subscribers: RwLock<HashMap<SubscriptionId, Sender<Arc<RelayEvent>>>>,
    buffer: usize,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_SUBSCRIBER_BUFFER)
    }

    pub fn with_buffer(buffer: usize) -> Self {
        Self { subscribers: RwLock::new(HashMap::new()), buffer: buffer.max(1) }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for InMemoryEventBus {
    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = SubscriptionId::new();

        let mut guard = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(id, tx);

        tracing::debug!("Added subscriber {}, total subscribers: {}", id, guard.len());

        Subscription { id, receiver: rx }
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut guard = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);

        if guard.remove(&id).is_some() {
            tracing::debug!("Removed subscriber {}, remaining: {}", id, guard.len());
        }
    }

    fn publish(&self, event: RelayEvent) -> usize {
        let event = Arc::new(event);
        let mut dead = Vec::new();
        let mut delivered = 0;

        {
            let guard = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
            for (id, sender) in guard.iter() {
                match sender.try_send(Arc::clone(&event)) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("Subscriber {} is not keeping up, event dropped", id);
                    }
                    Err(TrySendError::Closed(_)) => dead.push(*id),
                }
            }
        }

        // Receiver đã bị drop nhưng chưa kịp unsubscribe
        if !dead.is_empty() {
            let mut guard = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
            for id in &dead {
                guard.remove(id);
            }
            tracing::debug!(
                "Publish: {} dead subscribers cleaned up, {} active",
                dead.len(),
                guard.len()
            );
        }

        delivered
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
