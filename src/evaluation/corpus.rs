/*!
 * Corpus-level aggregation.
 *
 * BLEU and TER accumulate sufficient statistics across rows and derive one
 * score at the end. METEOR is the mean of the rows where it was computed.
 */

use std::fmt;

use serde::Serialize;

use super::metrics::{BleuStats, TerStats};

/// Accumulates one side (ours or comparison) of a corpus
#[derive(Debug, Clone, Default)]
pub struct CorpusAccumulator {
    bleu: BleuStats,
    ter: TerStats,
    meteor_sum: f64,
    meteor_count: usize,
    rows: usize,
}

impl CorpusAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one scored row; rows with an empty reference are ignored
    pub fn add(&mut self, hypothesis: &str, reference: &str, meteor: Option<f64>) {
        if reference.trim().is_empty() {
            return;
        }
        self.bleu += BleuStats::from_sentence(hypothesis, reference);
        self.ter += TerStats::from_sentence(hypothesis, reference);
        if let Some(value) = meteor.filter(|v| v.is_finite()) {
            self.meteor_sum += value;
            self.meteor_count += 1;
        }
        self.rows += 1;
    }

    /// Number of rows that contributed
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Derive the summary for this side
    pub fn finish(&self) -> SideSummary {
        if self.rows == 0 {
            return SideSummary::default();
        }
        SideSummary {
            corpus_bleu: Some(self.bleu.corpus_score()),
            corpus_ter: Some(self.ter.score()),
            avg_meteor: (self.meteor_count > 0).then(|| self.meteor_sum / self.meteor_count as f64),
            rows_scored: self.rows,
        }
    }
}

/// Aggregate scores for one system
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SideSummary {
    pub corpus_bleu: Option<f64>,
    pub corpus_ter: Option<f64>,
    pub avg_meteor: Option<f64>,
    pub rows_scored: usize,
}

impl SideSummary {
    /// Whether any row contributed
    pub fn has_data(&self) -> bool {
        self.rows_scored > 0
    }
}

/// Corpus scores for our system and the comparison provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub ours: SideSummary,
    pub google: SideSummary,
}

impl CorpusSummary {
    /// Whether any row had a reference
    pub fn has_data(&self) -> bool {
        self.ours.has_data()
    }
}

fn fmt_score(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}

impl fmt::Display for SideSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_data() {
            return write!(f, "unavailable");
        }
        write!(
            f,
            "BLEU {} | TER {} | METEOR {} ({} rows)",
            fmt_score(self.corpus_bleu, 2),
            fmt_score(self.corpus_ter, 2),
            fmt_score(self.avg_meteor, 3),
            self.rows_scored
        )
    }
}

impl fmt::Display for CorpusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_data() {
            return write!(f, "No references found in history; corpus metrics unavailable.");
        }
        writeln!(f, "Our system (corpus): {}", self.ours)?;
        write!(f, "Google (corpus):     {}", self.google)
    }
}
