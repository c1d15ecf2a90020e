/*!
 * Batch evaluation over the translation history.
 *
 * Every history row is scored independently; a failing row (malformed
 * record, comparison outage, retranslation error) is recorded in the report
 * and never aborts the run. The evaluation file is rewritten in full.
 */

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::errors::PersistenceError;
use crate::history::{EvaluationRow, HistoryRow, HistoryStore, read_evaluation, write_evaluation};
use crate::language_utils::Language;
use crate::providers::{ComparisonProvider, MetricProvider};
use crate::translation::core::{TranslationRequest, TranslationService};

use super::corpus::{CorpusAccumulator, CorpusSummary};

/// A row that could not be fully evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    /// 1-based data row number in the history file
    pub index: usize,
    pub reason: String,
}

/// Result of one batch run
#[derive(Debug, Clone, Default)]
pub struct EvaluationReport {
    pub rows: Vec<EvaluationRow>,
    pub summary: CorpusSummary,
    pub failures: Vec<RowFailure>,
}

/// Replays history rows through the metric and comparison providers
#[derive(Debug, Clone)]
pub struct BatchEvaluator {
    metrics: Arc<dyn MetricProvider>,
    comparison: Option<Arc<dyn ComparisonProvider>>,
    retranslator: Option<TranslationService>,
    show_progress: bool,
}

impl BatchEvaluator {
    pub fn new(metrics: Arc<dyn MetricProvider>) -> Self {
        Self {
            metrics,
            comparison: None,
            retranslator: None,
            show_progress: true,
        }
    }

    pub fn with_comparison(mut self, comparison: Arc<dyn ComparisonProvider>) -> Self {
        self.comparison = Some(comparison);
        self
    }

    /// Re-run every row through `service` instead of reusing the logged translation
    ///
    /// History logging is switched off on the service so the replay does not
    /// append to the file being read.
    pub fn with_retranslation(mut self, service: &TranslationService) -> Self {
        self.retranslator = Some(service.without_history());
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Evaluate every row of `history_path` and replace `output_path`
    pub async fn evaluate(&self, history_path: &Path, output_path: &Path) -> Result<EvaluationReport, PersistenceError> {
        let records = HistoryStore::new(history_path).rows()?;
        info!("Evaluating {} history rows from {:?}", records.len(), history_path);

        if let Some(provider) = self.comparison.as_ref().filter(|p| !p.is_available()) {
            warn!("{} is unavailable; comparison columns will be empty", provider.name());
        }
        let unavailable = self.metrics.capabilities().unavailable();
        if !unavailable.is_empty() {
            warn!("Metrics unavailable: {}", unavailable.join(", "));
        }

        let progress = self.progress_bar(records.len() as u64);
        let mut rows = Vec::with_capacity(records.len());
        let mut failures = Vec::new();

        for (i, record) in records.into_iter().enumerate() {
            let index = i + 1;
            match record {
                Ok(history) => {
                    let row = self.evaluate_row(index, &history, &mut failures).await;
                    rows.push(row);
                }
                Err(e) => {
                    warn!("Skipping malformed history row {}: {}", index, e);
                    failures.push(RowFailure { index, reason: e.to_string() });
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        write_evaluation(output_path, &rows)?;
        let summary = summarize_rows(&rows);
        info!(
            "Wrote {} evaluation rows to {:?} ({} issues)",
            rows.len(),
            output_path,
            failures.len()
        );

        Ok(EvaluationReport { rows, summary, failures })
    }

    async fn evaluate_row(&self, index: usize, history: &HistoryRow, failures: &mut Vec<RowFailure>) -> EvaluationRow {
        let mut row = EvaluationRow::from_history(history);
        let languages = parse_languages(history);
        if let Err(reason) = &languages {
            failures.push(RowFailure { index, reason: reason.clone() });
        }

        if let (Some(service), Ok((source, target))) = (self.retranslator.as_ref(), &languages) {
            let mut request = TranslationRequest::new(*source, *target, history.src_text.clone()).with_transliteration(true);
            if history.has_reference() {
                request = request.with_reference(history.ref_text.clone());
            }
            match service.translate(&request).await {
                Ok(result) => row.our_translation = result.translated_text,
                Err(e) => {
                    warn!("Row {}: retranslation failed, keeping logged output: {}", index, e);
                    failures.push(RowFailure { index, reason: format!("retranslation: {}", e) });
                }
            }
        }

        if history.has_reference() && !row.our_translation.trim().is_empty() {
            let ours = self.metrics.score(&row.our_translation, &row.ref_text);
            row.bleu = ours.bleu;
            row.ter = ours.ter;
            row.meteor = ours.meteor;
        }

        if let (Some(provider), Ok((source, target))) = (self.comparison.as_ref(), &languages) {
            if provider.is_available() && !history.src_text.trim().is_empty() {
                match provider.translate(history.src_text.trim(), *source, *target).await {
                    Ok(text) => row.google_translation = text,
                    Err(e) => {
                        warn!("Row {}: {} unavailable: {}", index, provider.name(), e);
                        failures.push(RowFailure { index, reason: format!("comparison: {}", e) });
                    }
                }
            }
        }

        if history.has_reference() && !row.google_translation.trim().is_empty() {
            let google = self.metrics.score(&row.google_translation, &row.ref_text);
            row.google_bleu = google.bleu;
            row.google_ter = google.ter;
            row.google_meteor = google.meteor;
        }

        debug!("Row {} scored: bleu={:?} google_bleu={:?}", index, row.bleu, row.google_bleu);
        row
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%) {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("█▓▒░"));
        progress
    }
}

fn parse_languages(row: &HistoryRow) -> Result<(Language, Language), String> {
    let source = Language::from_str(&row.source_lang).map_err(|e| e.to_string())?;
    let target = Language::from_str(&row.target_lang).map_err(|e| e.to_string())?;
    Ok((source, target))
}

/// Corpus summary of evaluated rows
///
/// Each side only counts rows that carry its own metrics.
pub fn summarize_rows(rows: &[EvaluationRow]) -> CorpusSummary {
    let mut ours = CorpusAccumulator::new();
    let mut google = CorpusAccumulator::new();
    for row in rows {
        if row.has_our_metrics() {
            ours.add(&row.our_translation, &row.ref_text, row.meteor);
        }
        if row.has_google_metrics() {
            google.add(&row.google_translation, &row.ref_text, row.google_meteor);
        }
    }
    CorpusSummary {
        ours: ours.finish(),
        google: google.finish(),
    }
}

/// Recompute the corpus summary of an existing evaluation file
pub fn summarize_file(path: &Path) -> Result<CorpusSummary, PersistenceError> {
    Ok(summarize_rows(&read_evaluation(path)?))
}
