use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::api::error;
use crate::modules::translation::Translator;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
}

/// Client for a LibreTranslate-style `POST {text, source, target}` endpoint.
/// One attempt per call, bounded by the client timeout.
pub struct HttpTranslator {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(
        url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, error::SystemError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url, api_key })
    }
}

#[async_trait::async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, error::SystemError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let request = TranslateRequest { text, source, target, api_key: self.api_key.as_deref() };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<TranslateResponse>()
            .await?;

        Ok(response.translated_text.filter(|t| !t.is_empty()))
    }
}
