use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app_config::InferenceConfig;
use crate::errors::ProviderError;
use crate::providers::TranslationProvider;
use crate::translation::cache::ModelCache;
use crate::translation::pipeline::ModelRef;

/// HTTP client for a translation inference server
///
/// Speaks the Hugging Face Inference API shape: `POST {endpoint}/models/{id}`
/// with `{"inputs": text}`, answered by `[{"translation_text": ...}]`.
/// Hub models go to `endpoint`; local and on-disk override models go to
/// `local_endpoint` with their path as identifier.
#[derive(Debug)]
pub struct InferenceClient {
    /// HTTP client for making requests
    client: Client,
    /// Endpoint for public hub models
    endpoint: String,
    /// Endpoint for local fine-tuned models
    local_endpoint: String,
    /// Optional bearer token for the hub endpoint
    api_key: String,
    /// Resolved handles, one per model
    handles: ModelCache<ModelHandle>,
}

/// Everything needed to call one model
#[derive(Debug, Clone)]
pub struct ModelHandle {
    /// Fully built request URL
    pub url: Url,
    /// Whether the hub token should be sent
    pub authenticated: bool,
}

/// Translation request body
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a> {
    /// Text to translate
    inputs: &'a str,
}

/// One translation candidate in the response
#[derive(Debug, Deserialize)]
pub struct InferenceOutput {
    /// The translated text
    pub translation_text: String,
}

/// Error body returned by the inference server
#[derive(Debug, Deserialize)]
struct InferenceErrorBody {
    error: String,
}

impl InferenceClient {
    /// Create a new client from configuration
    pub fn new(config: &InferenceConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            local_endpoint: config.local_endpoint.clone(),
            api_key: config.api_key.clone(),
            handles: ModelCache::new(),
        }
    }

    /// Build the handle for a model without touching the cache
    pub fn build_handle(&self, model: &ModelRef) -> Result<ModelHandle, ProviderError> {
        let local = model.is_local();
        let base = if local { &self.local_endpoint } else { &self.endpoint };
        let mut url = Url::parse(base.trim_end_matches('/'))
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", base, e)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ProviderError::RequestFailed(format!("Endpoint cannot be a base: {}", base)))?;
            segments.pop_if_empty().push("models");
            let location = model.location();
            if local {
                // The whole path is one identifier.
                segments.push(&location);
            } else {
                segments.extend(location.split('/'));
            }
        }

        Ok(ModelHandle {
            url,
            authenticated: !local && !self.api_key.is_empty(),
        })
    }
}

#[async_trait]
impl TranslationProvider for InferenceClient {
    async fn translate(&self, model: &ModelRef, text: &str) -> Result<String, ProviderError> {
        let handle = self.handles.get_or_load(model, |m| self.build_handle(m))?;
        debug!("Translating {} chars with {}", text.chars().count(), model);

        let mut request = self
            .client
            .post(handle.url.clone())
            .json(&InferenceRequest { inputs: text });
        if handle.authenticated {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<InferenceErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            error!("Inference error for {} ({}): {}", model, status, message);
            return Err(ProviderError::from_status(status.as_u16(), message));
        }

        let outputs = response.json::<Vec<InferenceOutput>>().await?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.translation_text)
            .ok_or_else(|| ProviderError::ParseError(format!("Empty response from {}", model)))
    }
}
