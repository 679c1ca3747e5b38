/// Translation provider seam.
///
/// The provider is an unreliable external service: callers treat every error
/// as "no translation" and keep going.
pub mod http;

use crate::api::error;

#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Returns `Ok(None)` when there is nothing to translate or translation
    /// is switched off.
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, error::SystemError>;
}

/// Used when no provider URL is configured.
pub struct DisabledTranslator;

#[async_trait::async_trait]
impl Translator for DisabledTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<Option<String>, error::SystemError> {
        Ok(None)
    }
}
