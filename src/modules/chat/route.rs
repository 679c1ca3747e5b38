use actix_web::web::ServiceConfig;

use crate::modules::chat::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(send_message)
        .service(notify_typing)
        .service(append_log)
        .service(get_message)
        .service(get_conversation);
}
