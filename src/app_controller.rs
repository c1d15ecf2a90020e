use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::app_config::Config;
use crate::errors::{PersistenceError, TranslationError};
use crate::evaluation::batch::{BatchEvaluator, EvaluationReport, summarize_file};
use crate::evaluation::corpus::CorpusSummary;
use crate::evaluation::metrics::Metrics;
use crate::file_utils::FileManager;
use crate::language_utils::Language;
use crate::translation::core::{Comparison, HistoryStatus, TranslationRequest, TranslationResult, TranslationService};
use crate::translation::pipeline::PipelineDescriptor;

// @module: Application controller wiring configuration to the services

/// Result of an interactive translation, with the optional comparison
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOutcome {
    pub result: TranslationResult,
    pub comparison: Option<Comparison>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Orchestrator built from the configuration
    service: TranslationService,
}

impl Controller {
    // @method: Create a controller with the concrete providers named in the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        FileManager::ensure_dir(&config.storage.data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", config.storage.data_dir))?;
        let service = TranslationService::from_config(&config);
        Ok(Self { config, service })
    }

    /// Create a controller around an already assembled service
    pub fn with_service(config: Config, service: TranslationService) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate one request, optionally asking the comparison provider too
    pub async fn translate(
        &self,
        request: &TranslationRequest,
        compare: bool,
        log_history: bool,
    ) -> Result<TranslationOutcome, TranslationError> {
        let service = if log_history {
            self.service.clone()
        } else {
            self.service.without_history()
        };

        let result = service.translate(request).await?;
        if let HistoryStatus::Failed(reason) = &result.history {
            warn!("Translation succeeded but was not saved to history: {}", reason);
        }

        let comparison = if compare {
            Some(service.compare(request).await)
        } else {
            None
        };

        Ok(TranslationOutcome { result, comparison })
    }

    /// Evaluate the history file, defaulting to the configured locations
    pub async fn evaluate(
        &self,
        history: Option<PathBuf>,
        output: Option<PathBuf>,
        retranslate: bool,
    ) -> Result<EvaluationReport, PersistenceError> {
        let history = history.unwrap_or_else(|| self.config.storage.history_path());
        let output = output.unwrap_or_else(|| self.config.storage.evaluation_path());

        let mut evaluator = BatchEvaluator::new(self.service.metric_provider());
        if let Some(comparison) = self.service.comparison_provider() {
            evaluator = evaluator.with_comparison(Arc::clone(&comparison));
        }
        if retranslate {
            info!("Re-running every history row through the translation pipeline");
            evaluator = evaluator.with_retranslation(&self.service);
        }

        evaluator.evaluate(&history, &output).await
    }

    /// Summary of the last evaluation file
    pub fn report(&self, output: Option<PathBuf>) -> Result<CorpusSummary, PersistenceError> {
        let output = output.unwrap_or_else(|| self.config.storage.evaluation_path());
        summarize_file(&output)
    }

    /// Pipeline that would serve a pair
    pub fn resolve(&self, source: Language, target: Language) -> Result<PipelineDescriptor, TranslationError> {
        self.service.resolver().resolve(source, target)
    }
}

fn format_metric(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "unavailable".to_string(), |v| format!("{:.*}", precision, v))
}

/// Render metrics for display; absent values read "unavailable"
pub fn format_metrics(metrics: &Metrics) -> String {
    format!(
        "BLEU: {} | TER: {} | METEOR: {}",
        format_metric(metrics.bleu, 2),
        format_metric(metrics.ter, 2),
        format_metric(metrics.meteor, 3)
    )
}

/// Render an interactive outcome for the terminal
pub fn format_outcome(outcome: &TranslationOutcome) -> String {
    let result = &outcome.result;
    let mut lines = vec![
        result.translated_text.clone(),
        format!("Model: {}", result.route),
    ];
    if result.metrics.any() {
        lines.push(format_metrics(&result.metrics));
    }
    match &outcome.comparison {
        Some(Comparison::Available(text)) => lines.push(format!("Google: {}", text)),
        Some(Comparison::Unavailable(reason)) => lines.push(format!("Google: unavailable ({})", reason)),
        None => {}
    }
    lines.join("\n")
}

/// Render a batch report for the terminal
pub fn format_report(report: &EvaluationReport) -> String {
    let mut lines = vec![
        format!("Evaluated {} rows", report.rows.len()),
        report.summary.to_string(),
    ];
    if !report.failures.is_empty() {
        lines.push(format!("{} row issues:", report.failures.len()));
        for failure in &report.failures {
            lines.push(format!("  row {}: {}", failure.index, failure.reason));
        }
    }
    lines.join("\n")
}
