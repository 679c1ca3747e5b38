use crate::modules::chat::resolver::ReplyScope;

pub struct Env {
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub translate_url: Option<String>,
    pub translate_api_key: Option<String>,
    pub translate_source: String,
    pub translate_target: String,
    pub translate_timeout: u64,
    pub stream_keep_alive: u64,
    pub reply_scope: ReplyScope,
}

impl Env {
    fn new() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32 integer");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");

        let translate_url = std::env::var("TRANSLATE_URL").ok().filter(|url| !url.is_empty());
        let translate_api_key =
            std::env::var("TRANSLATE_API_KEY").ok().filter(|key| !key.is_empty());
        let translate_source =
            std::env::var("TRANSLATE_SOURCE").unwrap_or_else(|_| "auto".to_string());
        let translate_target =
            std::env::var("TRANSLATE_TARGET").unwrap_or_else(|_| "en".to_string());
        let translate_timeout = std::env::var("TRANSLATE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u64>()
            .expect("TRANSLATE_TIMEOUT_SECS must be a valid u64 integer");

        let stream_keep_alive = std::env::var("STREAM_KEEP_ALIVE_SECS")
            .unwrap_or_else(|_| "25".to_string())
            .parse::<u64>()
            .expect("STREAM_KEEP_ALIVE_SECS must be a valid u64 integer");

        let reply_scope = std::env::var("REPLY_SCOPE")
            .unwrap_or_else(|_| "any".to_string())
            .parse::<ReplyScope>()
            .expect("REPLY_SCOPE must be either `pair` or `any`");

        Env {
            database_url,
            database_max_connections,
            frontend_url,
            ip,
            port,
            translate_url,
            translate_api_key,
            translate_source,
            translate_target,
            translate_timeout,
            stream_keep_alive,
            reply_scope,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
