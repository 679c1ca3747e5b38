/// Realtime Module
///
/// Phát event trực tiếp tới các client đang kết nối:
///
/// - Event payloads (RelayEvent & ControlFrame)
/// - Event Bus (subscribe / unsubscribe / publish)
/// - Stream Broadcaster (một kết nối SSE ↔ một subscription)
/// - HTTP handler (GET /stream)
pub mod broadcaster;
pub mod bus;
pub mod events;
pub mod handler;
