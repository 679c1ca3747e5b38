/// Stream Broadcaster
///
/// Nối một kết nối `/stream` (Server-Sent Events) với Event Bus:
/// - Open:      subscribe + gửi `{"ready":true}`
/// - Streaming: mỗi event trên bus → một frame `data: <json>\n\n`
/// - Keep-alive: `{"ping":<epoch millis>}` theo chu kỳ cố định
/// - Close:     client ngắt kết nối → unsubscribe + huỷ timer
///
/// Outbound: Event Bus → pump task → mpsc channel → response body → Client
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web::Bytes;
use futures_util::Stream;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError, Sender};
use tokio::time::{self, Instant, MissedTickBehavior};

use super::bus::{EventBus, Subscription, SubscriptionId};
use super::events::ControlFrame;

/// Số frame tối đa chờ ghi ra một kết nối
const FRAME_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct StreamSettings {
    pub keep_alive: Duration,
    pub frame_buffer: usize,
}

impl StreamSettings {
    pub fn new(keep_alive: Duration) -> Self {
        Self { keep_alive: keep_alive.max(Duration::from_millis(1)), frame_buffer: FRAME_BUFFER }
    }
}

/// Unsubscribe khi bị drop, kể cả khi pump task bị huỷ giữa chừng
struct SubscriptionGuard {
    bus: Arc<dyn EventBus>,
    id: SubscriptionId,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
        tracing::debug!("Stream {} closed, subscription released", self.id);
    }
}

/// Mở một stream mới. Body trả về kết thúc khi bus bị đóng; khi client ngắt
/// kết nối actix drop body, pump task thấy channel đóng và tự dọn dẹp.
pub fn open(
    bus: Arc<dyn EventBus>,
    settings: StreamSettings,
) -> impl Stream<Item = Result<Bytes, Infallible>> + 'static {
    let subscription = bus.subscribe();
    let (tx, rx) = mpsc::channel::<Bytes>(settings.frame_buffer.max(1));

    tracing::debug!("Stream {} opened", subscription.id);

    forward(&tx, &ControlFrame::ready());

    let guard = SubscriptionGuard { bus, id: subscription.id };
    actix_web::rt::spawn(pump(guard, subscription, tx, settings.keep_alive));

    futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|frame| (Ok::<_, Infallible>(frame), rx))
    })
}

async fn pump(
    guard: SubscriptionGuard,
    mut subscription: Subscription,
    out: Sender<Bytes>,
    keep_alive: Duration,
) {
    let mut ticker = time::interval_at(Instant::now() + keep_alive, keep_alive);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = out.closed() => break,
            event = subscription.receiver.recv() => {
                let Some(event) = event else { break };
                if !forward(&out, &*event) {
                    break;
                }
            }
            _ = ticker.tick() => {
                if !forward(&out, &ControlFrame::ping_now()) {
                    break;
                }
            }
        }
    }

    drop(guard);
}

/// Trả về false khi client đã ngắt kết nối. Lỗi serialize hoặc client đọc
/// chậm (buffer đầy) chỉ bỏ qua frame đó.
fn forward<T: Serialize + ?Sized>(out: &Sender<Bytes>, payload: &T) -> bool {
    match encode_frame(payload) {
        Ok(frame) => match out.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Client đọc chậm, bỏ qua một stream frame");
                true
            }
            Err(TrySendError::Closed(_)) => false,
        },
        Err(e) => {
            tracing::warn!("Không thể serialize stream frame: {}", e);
            true
        }
    }
}

pub fn encode_frame<T: Serialize + ?Sized>(payload: &T) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(payload)?;
    Ok(Bytes::from(format!("data: {json}\n\n")))
}
