use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::app_config::ComparisonConfig;
use crate::errors::ProviderError;
use crate::language_utils::Language;
use crate::providers::ComparisonProvider;

/// Google Translate client for side-by-side comparison
///
/// Uses the public `translate_a/single` endpoint. It is unofficial and
/// rate-limited, so every failure is expected to be handled as
/// "comparison unavailable" by the caller.
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// Service endpoint URL
    endpoint: String,
    /// Whether comparison is switched on
    enabled: bool,
}

impl GoogleTranslate {
    /// Create a new client from configuration
    pub fn new(config: &ComparisonConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            enabled: config.enabled,
        }
    }

    /// Build the request URL for one text
    pub fn request_url(&self, text: &str, source: Language, target: Language) -> Result<Url, ProviderError> {
        let base = format!("{}/translate_a/single", self.endpoint.trim_end_matches('/'));
        Url::parse_with_params(
            &base,
            &[
                ("client", "gtx"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid comparison endpoint '{}': {}", base, e)))
    }

    /// Extract the translated text from the nested array response
    ///
    /// The first element is a list of segments whose first item is the translated chunk.
    pub fn extract_text(body: &Value) -> Result<String, ProviderError> {
        let segments = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::ParseError("Missing translation segments".to_string()))?;

        let text: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        if text.trim().is_empty() {
            return Err(ProviderError::ParseError("Empty translation".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl ComparisonProvider for GoogleTranslate {
    fn name(&self) -> &str {
        "Google Translate"
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::Unavailable("comparison disabled in configuration".to_string()));
        }

        let url = self.request_url(text, source, target)?;
        debug!("Requesting comparison translation {} -> {}", source, target);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google Translate error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let body = response.json::<Value>().await?;
        Self::extract_text(&body)
    }
}
