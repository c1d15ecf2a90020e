/*!
 * Core translation service implementation.
 *
 * `TranslationService` runs one interactive request end to end: validation,
 * the transliteration shortcut, model hops, Hindi post-processing, scoring
 * against an optional reference and the history append.
 */

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::evaluation::metrics::{Metrics, StandardMetrics};
use crate::history::{HistoryRow, HistoryStore};
use crate::language_utils::{Language, looks_romanized};
use crate::providers::google::GoogleTranslate;
use crate::providers::inference::InferenceClient;
use crate::providers::itrans::ItransTransliterator;
use crate::providers::{ComparisonProvider, MetricProvider, TranslationProvider, TransliterationProvider};

use super::pipeline::{PipelineDescriptor, PipelineResolver};
use super::postprocess::{TextPiece, apply_hindi_rules, normalize_romanized, split_acronyms};

/// One interactive translation request
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub source: Language,
    pub target: Language,
    pub text: String,
    /// Reference translation; empty or missing means no scoring
    pub reference: Option<String>,
    /// Treat ASCII input as romanized target-language text
    pub force_transliteration: bool,
}

impl TranslationRequest {
    pub fn new(source: Language, target: Language, text: impl Into<String>) -> Self {
        Self {
            source,
            target,
            text: text.into(),
            reference: None,
            force_transliteration: false,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_transliteration(mut self, force: bool) -> Self {
        self.force_transliteration = force;
        self
    }

    /// Reference text, if non-blank
    pub fn reference_text(&self) -> Option<&str> {
        self.reference.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }
}

/// How the output was produced
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Source and target are the same language
    Identity,
    /// Script conversion with the named scheme
    Transliteration(String),
    /// Model pipeline
    Translated(PipelineDescriptor),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            Self::Transliteration(_) => write!(f, "transliteration"),
            Self::Translated(pipeline) => write!(f, "{}", pipeline),
        }
    }
}

/// What happened to the history row for a request
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryStatus {
    /// Row appended
    Logged,
    /// Not logged (identity route or no store attached)
    Skipped,
    /// Append failed; the translation itself succeeded
    Failed(String),
}

/// Output of a successful request
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub translated_text: String,
    pub route: Route,
    pub metrics: Metrics,
    pub history: HistoryStatus,
}

/// Outcome of the optional comparison call
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Available(String),
    Unavailable(String),
}

impl Comparison {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Available(text) => Some(text),
            Self::Unavailable(_) => None,
        }
    }
}

/// Translation orchestrator
#[derive(Debug, Clone)]
pub struct TranslationService {
    resolver: PipelineResolver,
    translator: Arc<dyn TranslationProvider>,
    transliterator: Arc<dyn TransliterationProvider>,
    metrics: Arc<dyn MetricProvider>,
    comparison: Option<Arc<dyn ComparisonProvider>>,
    history: Option<HistoryStore>,
}

impl TranslationService {
    /// Create a service with no comparison provider and no history store
    pub fn new(
        resolver: PipelineResolver,
        translator: Arc<dyn TranslationProvider>,
        transliterator: Arc<dyn TransliterationProvider>,
        metrics: Arc<dyn MetricProvider>,
    ) -> Self {
        Self {
            resolver,
            translator,
            transliterator,
            metrics,
            comparison: None,
            history: None,
        }
    }

    /// Build the service with the concrete providers named in the configuration
    pub fn from_config(config: &Config) -> Self {
        let service = Self::new(
            PipelineResolver::new(&config.models),
            Arc::new(InferenceClient::new(&config.inference)),
            Arc::new(ItransTransliterator::new()),
            Arc::new(StandardMetrics::new(config.evaluation.meteor_enabled)),
        )
        .with_history(HistoryStore::new(config.storage.history_path()));

        if config.comparison.enabled {
            service.with_comparison(Arc::new(GoogleTranslate::new(&config.comparison)))
        } else {
            service
        }
    }

    pub fn with_comparison(mut self, comparison: Arc<dyn ComparisonProvider>) -> Self {
        self.comparison = Some(comparison);
        self
    }

    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    /// Same service with history logging switched off
    pub fn without_history(&self) -> Self {
        Self {
            history: None,
            ..self.clone()
        }
    }

    pub fn resolver(&self) -> &PipelineResolver {
        &self.resolver
    }

    pub fn metric_provider(&self) -> Arc<dyn MetricProvider> {
        Arc::clone(&self.metrics)
    }

    pub fn comparison_provider(&self) -> Option<Arc<dyn ComparisonProvider>> {
        self.comparison.clone()
    }

    /// Run one request
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult, TranslationError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        if request.source == request.target {
            debug!("Identity route for {}", request.source);
            return Ok(TranslationResult {
                translated_text: request.text.clone(),
                route: Route::Identity,
                metrics: Metrics::absent(),
                history: HistoryStatus::Skipped,
            });
        }

        let (mut translated_text, route) = if self.should_transliterate(request, text) {
            let output = self.transliterate(text, request.target)?;
            (output, Route::Transliteration(self.transliterator.scheme().to_string()))
        } else {
            let pipeline = self.resolver.resolve(request.source, request.target)?;
            let output = self.run_pipeline(&pipeline, text).await?;
            (output, Route::Translated(pipeline))
        };
        if request.target == Language::Hindi {
            translated_text = apply_hindi_rules(text, &translated_text);
        }

        let reference = request.reference_text();
        let metrics = match reference {
            Some(reference) => self.metrics.score(&translated_text, reference),
            None => Metrics::absent(),
        };

        let history = self.log_history(request, reference.unwrap_or(""), &translated_text);
        info!("Translated {} -> {} via {}", request.source, request.target, route);

        Ok(TranslationResult {
            translated_text,
            route,
            metrics,
            history,
        })
    }

    /// Ask the comparison provider for its translation of the same request
    pub async fn compare(&self, request: &TranslationRequest) -> Comparison {
        let Some(provider) = self.comparison.as_ref() else {
            return Comparison::Unavailable("no comparison provider configured".to_string());
        };
        if !provider.is_available() {
            return Comparison::Unavailable(format!("{} is disabled", provider.name()));
        }
        let text = request.text.trim();
        if text.is_empty() {
            return Comparison::Unavailable("empty input".to_string());
        }

        match provider.translate(text, request.source, request.target).await {
            Ok(output) => Comparison::Available(output),
            Err(e) => {
                warn!("{} comparison failed: {}", provider.name(), e);
                Comparison::Unavailable(e.to_string())
            }
        }
    }

    /// English to a Devanagari target with romanized input
    ///
    /// Pure ASCII input always qualifies, so `force_transliteration` adds
    /// nothing here; it cannot override a non-ASCII character either.
    fn should_transliterate(&self, request: &TranslationRequest, text: &str) -> bool {
        request.source == Language::English && request.target.uses_devanagari() && looks_romanized(text)
    }

    fn transliterate(&self, text: &str, target: Language) -> Result<String, TranslationError> {
        if target != Language::Hindi {
            return Ok(self.transliterator.transliterate(&normalize_romanized(text), target)?);
        }

        // Known acronyms keep their Hindi letter names instead of being spelled out phonetically.
        let mut output = String::with_capacity(text.len() * 3);
        for piece in split_acronyms(text) {
            match piece {
                TextPiece::Acronym(spelling) => output.push_str(spelling),
                TextPiece::Plain(plain) => {
                    let core = plain.trim();
                    let leading = &plain[..plain.len() - plain.trim_start().len()];
                    let trailing = &plain[plain.trim_end().len()..];
                    output.push_str(leading);
                    if !core.is_empty() {
                        output.push_str(&self.transliterator.transliterate(&normalize_romanized(core), target)?);
                        output.push_str(trailing);
                    }
                }
            }
        }
        Ok(output)
    }

    async fn run_pipeline(&self, pipeline: &PipelineDescriptor, text: &str) -> Result<String, TranslationError> {
        let mut current = text.to_string();
        for hop in pipeline.hops() {
            debug!("Hop {} -> {} with {}", hop.source, hop.target, hop.model);
            current = self.translator.translate(&hop.model, &current).await?;
        }
        Ok(current)
    }

    fn log_history(&self, request: &TranslationRequest, reference: &str, output: &str) -> HistoryStatus {
        let Some(store) = self.history.as_ref() else {
            return HistoryStatus::Skipped;
        };
        let row = HistoryRow {
            source_lang: request.source.name().to_string(),
            target_lang: request.target.name().to_string(),
            src_text: request.text.clone(),
            ref_text: reference.to_string(),
            our_translation: output.to_string(),
        };
        match store.append(&row) {
            Ok(()) => HistoryStatus::Logged,
            Err(e) => {
                warn!("Could not log translation to history: {}", e);
                HistoryStatus::Failed(e.to_string())
            }
        }
    }
}
