/*!
 * Provider interfaces for the external collaborators.
 *
 * Every external black box is reached through one of these traits:
 * - `TranslationProvider`: resolved model + text -> text (`inference`)
 * - `TransliterationProvider`: romanized text -> target script (`itrans`)
 * - `MetricProvider`: hypothesis + reference -> scores (`crate::evaluation::metrics`)
 * - `ComparisonProvider`: optional second opinion (`google`)
 *
 * `mock` holds deterministic implementations used by the test suite.
 */

use std::fmt::Debug;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::evaluation::metrics::{MetricCapabilities, Metrics};
use crate::language_utils::Language;
use crate::translation::pipeline::ModelRef;

/// Machine translation backend
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate `text` with the given resolved model
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error; a failure
    ///   here is fatal for the request
    async fn translate(&self, model: &ModelRef, text: &str) -> Result<String, ProviderError>;
}

/// Script conversion without semantic translation
pub trait TransliterationProvider: Send + Sync + Debug {
    /// Convert normalized romanized text into the script of `target`
    fn transliterate(&self, text: &str, target: Language) -> Result<String, ProviderError>;

    /// Short label reported in the result route
    fn scheme(&self) -> &str;
}

/// Metric engine
///
/// Metrics that cannot be computed are returned as `None`, never as errors.
pub trait MetricProvider: Send + Sync + Debug {
    /// Score a hypothesis against a single reference
    fn score(&self, hypothesis: &str, reference: &str) -> Metrics;

    /// Which metrics this provider can compute at all
    fn capabilities(&self) -> MetricCapabilities;
}

/// Optional external translator used only for comparison
#[async_trait]
pub trait ComparisonProvider: Send + Sync + Debug {
    /// Display name of the provider
    fn name(&self) -> &str;

    /// Whether the provider can be called at all (configuration, credentials)
    fn is_available(&self) -> bool {
        true
    }

    /// Translate with the external service; transient failures are expected
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, ProviderError>;
}

pub mod google;
pub mod inference;
pub mod itrans;
pub mod mock;
