/// Stream HTTP Handler
///
/// Endpoint: GET /stream
///
/// Giữ kết nối mở với `Content-Type: text/event-stream`; vòng đời của
/// subscription gắn với vòng đời của response body.
use actix_web::{get, http::header, web, HttpRequest, HttpResponse};

use super::broadcaster::{self, StreamSettings};
use super::bus::EventBus;

#[get("/stream")]
pub async fn stream_events(
    req: HttpRequest,
    bus: web::Data<dyn EventBus>,
    settings: web::Data<StreamSettings>,
) -> HttpResponse {
    tracing::debug!("Stream request từ {:?}", req.peer_addr());

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(broadcaster::open(bus.into_inner(), *settings.get_ref()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(stream_events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::realtime::bus::InMemoryEventBus;
    use actix_web::{test, App};
    use std::sync::Arc;
    use std::time::Duration;

    #[actix_web::test]
    async fn test_stream_responds_with_event_stream() {
        let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(bus.clone()))
                .app_data(web::Data::new(StreamSettings::new(Duration::from_secs(30))))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/stream").to_request();
        let res = test::call_service(&app, req).await;

        assert!(res.status().is_success());
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap(),
            "text/event-stream"
        );
        assert_eq!(bus.subscriber_count(), 1);
    }
}
