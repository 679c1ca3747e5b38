use std::sync::Arc;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    api::error,
    modules::translation::{http::HttpTranslator, DisabledTranslator, Translator},
    ENV,
};

pub async fn connect_database() -> Result<PgPool, error::SystemError> {
    let database_url = &ENV.database_url;
    let pool = PgPoolOptions::new()
        .max_connections(ENV.database_max_connections)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), error::SystemError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| error::SystemError::InternalError(Box::new(e)))?;
    Ok(())
}

pub fn build_translator() -> Result<Arc<dyn Translator>, error::SystemError> {
    match &ENV.translate_url {
        Some(url) => {
            let translator = HttpTranslator::new(
                url.clone(),
                ENV.translate_api_key.clone(),
                std::time::Duration::from_secs(ENV.translate_timeout),
            )?;
            log::info!("Translation provider configured at {}", url);
            Ok(Arc::new(translator))
        }
        None => {
            log::warn!("TRANSLATE_URL not set, messages will be stored untranslated");
            Ok(Arc::new(DisabledTranslator))
        }
    }
}
