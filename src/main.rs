use actix_cors::Cors;
use actix_web::{self, http::header, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::{
    configs::{build_translator, connect_database, run_migrations},
    modules::{
        chat::{
            repository_pg::ChatRepositoryPg,
            service::{ChatService, ChatSettings},
        },
        realtime::{
            broadcaster::StreamSettings,
            bus::{EventBus, InMemoryEventBus},
        },
    },
};

mod api;
mod configs;
mod constants;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Chat relay is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    run_migrations(&db_pool).await.map_err(|e| std::io::Error::other(e.to_string()))?;

    let translator = build_translator().map_err(|e| std::io::Error::other(e.to_string()))?;
    let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());

    let chat_repo = ChatRepositoryPg::new(db_pool);
    let chat_service = ChatService::with_dependencies(
        Arc::new(chat_repo),
        translator,
        bus.clone(),
        ChatSettings {
            source_lang: ENV.translate_source.clone(),
            target_lang: ENV.translate_target.clone(),
            reply_scope: ENV.reply_scope,
        },
    );
    let stream_settings = StreamSettings::new(Duration::from_secs(ENV.stream_keep_alive));

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(chat_service.clone()))
            .app_data(web::Data::from(bus.clone()))
            .app_data(web::Data::new(stream_settings))
            .service(health_check)
            .configure(modules::chat::route::configure)
            .configure(modules::realtime::handler::configure)
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
