/*!
 * Translation metrics against a reference.
 *
 * - BLEU: sacreBLEU defaults (4-gram, exponential smoothing, brevity penalty), 0-100
 * - TER: token-level edit distance over reference length, lowercased, 0-100+
 * - METEOR: exact-match unigram METEOR with fragmentation penalty, 0-1
 *
 * BLEU and TER keep their sufficient statistics so corpus scores can be
 * derived from accumulated counts instead of averaged sentence scores.
 */

use std::collections::HashMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::providers::MetricProvider;

/// Highest n-gram order used by BLEU
pub const MAX_NGRAM_ORDER: usize = 4;

const METEOR_ALPHA: f64 = 0.9;
const METEOR_BETA: f64 = 3.0;
const METEOR_GAMMA: f64 = 0.5;

/// Scores for one hypothesis; `None` means not computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub bleu: Option<f64>,
    pub ter: Option<f64>,
    pub meteor: Option<f64>,
}

impl Metrics {
    /// All metrics absent
    pub fn absent() -> Self {
        Self::default()
    }

    /// Whether any metric was computed
    pub fn any(&self) -> bool {
        self.bleu.is_some() || self.ter.is_some() || self.meteor.is_some()
    }
}

/// Which metrics a provider can compute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricCapabilities {
    pub bleu: bool,
    pub ter: bool,
    pub meteor: bool,
}

impl MetricCapabilities {
    /// Every metric available
    pub fn all() -> Self {
        Self { bleu: true, ter: true, meteor: true }
    }

    /// Names of metrics that are unavailable
    pub fn unavailable(&self) -> Vec<&'static str> {
        [("BLEU", self.bleu), ("TER", self.ter), ("METEOR", self.meteor)]
            .into_iter()
            .filter(|(_, available)| !available)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Split text into tokens, separating punctuation (including the danda) from words
pub fn tokenize(text: &str) -> Vec<String> {
    let mut spaced = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if c.is_ascii_punctuation() || c == '।' || c == '॥' {
            spaced.push(' ');
            spaced.push(c);
            spaced.push(' ');
        } else {
            spaced.push(c);
        }
    }
    spaced.split_whitespace().map(str::to_string).collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], u64> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for gram in tokens.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

/// BLEU sufficient statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BleuStats {
    /// Clipped n-gram matches per order
    pub matches: [u64; MAX_NGRAM_ORDER],
    /// Hypothesis n-gram counts per order
    pub totals: [u64; MAX_NGRAM_ORDER],
    pub hyp_len: u64,
    pub ref_len: u64,
}

impl BleuStats {
    /// Collect statistics for one hypothesis/reference pair
    pub fn from_sentence(hypothesis: &str, reference: &str) -> Self {
        let hyp = tokenize(hypothesis);
        let reference = tokenize(reference);
        let mut stats = Self {
            hyp_len: hyp.len() as u64,
            ref_len: reference.len() as u64,
            ..Self::default()
        };

        for n in 1..=MAX_NGRAM_ORDER {
            let hyp_counts = ngram_counts(&hyp, n);
            let ref_counts = ngram_counts(&reference, n);
            stats.totals[n - 1] = hyp.len().saturating_sub(n - 1) as u64;
            stats.matches[n - 1] = hyp_counts
                .iter()
                .map(|(gram, count)| (*count).min(ref_counts.get(gram).copied().unwrap_or(0)))
                .sum();
        }
        stats
    }

    /// Score with all four orders; used for corpus BLEU
    pub fn corpus_score(&self) -> f64 {
        self.score(false)
    }

    /// Score with orders that have no n-grams dropped; used for sentence BLEU
    pub fn sentence_score(&self) -> f64 {
        self.score(true)
    }

    fn score(&self, effective_order: bool) -> f64 {
        if self.hyp_len == 0 {
            return 0.0;
        }

        let mut precisions = [0.0_f64; MAX_NGRAM_ORDER];
        let mut smooth = 1.0_f64;
        let mut order = MAX_NGRAM_ORDER;

        for n in 0..MAX_NGRAM_ORDER {
            if self.totals[n] == 0 {
                if effective_order {
                    order = n;
                }
                break;
            }
            precisions[n] = if self.matches[n] == 0 {
                smooth *= 2.0;
                100.0 / (smooth * self.totals[n] as f64)
            } else {
                100.0 * self.matches[n] as f64 / self.totals[n] as f64
            };
        }

        if order == 0 || precisions[..order].iter().any(|p| *p <= 0.0) {
            return 0.0;
        }

        let log_mean = precisions[..order].iter().map(|p| p.ln()).sum::<f64>() / order as f64;
        self.brevity_penalty() * log_mean.exp()
    }

    fn brevity_penalty(&self) -> f64 {
        if self.hyp_len >= self.ref_len {
            1.0
        } else {
            (1.0 - self.ref_len as f64 / self.hyp_len as f64).exp()
        }
    }
}

impl AddAssign for BleuStats {
    fn add_assign(&mut self, other: Self) {
        for n in 0..MAX_NGRAM_ORDER {
            self.matches[n] += other.matches[n];
            self.totals[n] += other.totals[n];
        }
        self.hyp_len += other.hyp_len;
        self.ref_len += other.ref_len;
    }
}

/// TER sufficient statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerStats {
    /// Token edits needed to turn the hypothesis into the reference
    pub edits: u64,
    pub ref_len: u64,
}

impl TerStats {
    /// Collect statistics for one hypothesis/reference pair (case-insensitive)
    pub fn from_sentence(hypothesis: &str, reference: &str) -> Self {
        let hyp: Vec<String> = hypothesis.split_whitespace().map(str::to_lowercase).collect();
        let reference: Vec<String> = reference.split_whitespace().map(str::to_lowercase).collect();
        Self {
            edits: edit_distance(&hyp, &reference) as u64,
            ref_len: reference.len() as u64,
        }
    }

    /// TER in percent
    pub fn score(&self) -> f64 {
        if self.ref_len == 0 {
            return if self.edits > 0 { 100.0 } else { 0.0 };
        }
        100.0 * self.edits as f64 / self.ref_len as f64
    }
}

impl AddAssign for TerStats {
    fn add_assign(&mut self, other: Self) {
        self.edits += other.edits;
        self.ref_len += other.ref_len;
    }
}

/// Levenshtein distance over tokens
fn edit_distance(a: &[String], b: &[String]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, token_a) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, token_b) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(token_a != token_b);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Exact-match METEOR score in 0..1
pub fn meteor(hypothesis: &str, reference: &str) -> f64 {
    let hyp: Vec<String> = tokenize(&hypothesis.to_lowercase());
    let reference: Vec<String> = tokenize(&reference.to_lowercase());
    if hyp.is_empty() || reference.is_empty() {
        return 0.0;
    }

    // Align each hypothesis token to the first unused identical reference token.
    let mut used = vec![false; reference.len()];
    let mut alignment: Vec<(usize, usize)> = Vec::new();
    for (h, token) in hyp.iter().enumerate() {
        if let Some(r) = (0..reference.len()).find(|&r| !used[r] && reference[r] == *token) {
            used[r] = true;
            alignment.push((h, r));
        }
    }

    let matches = alignment.len() as f64;
    if matches == 0.0 {
        return 0.0;
    }

    let precision = matches / hyp.len() as f64;
    let recall = matches / reference.len() as f64;
    let fmean = precision * recall / (METEOR_ALPHA * precision + (1.0 - METEOR_ALPHA) * recall);

    let chunks = 1 + alignment
        .windows(2)
        .filter(|pair| !(pair[1].0 == pair[0].0 + 1 && pair[1].1 == pair[0].1 + 1))
        .count();
    let fragmentation = chunks as f64 / matches;
    let penalty = METEOR_GAMMA * fragmentation.powf(METEOR_BETA);

    fmean * (1.0 - penalty)
}

/// Built-in metric engine
#[derive(Debug, Clone)]
pub struct StandardMetrics {
    meteor_enabled: bool,
}

impl StandardMetrics {
    /// Create a metric engine; METEOR can be switched off
    pub fn new(meteor_enabled: bool) -> Self {
        Self { meteor_enabled }
    }
}

impl Default for StandardMetrics {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MetricProvider for StandardMetrics {
    fn score(&self, hypothesis: &str, reference: &str) -> Metrics {
        if reference.trim().is_empty() {
            return Metrics::absent();
        }
        Metrics {
            bleu: Some(BleuStats::from_sentence(hypothesis, reference).sentence_score()),
            ter: Some(TerStats::from_sentence(hypothesis, reference).score()),
            meteor: self.meteor_enabled.then(|| meteor(hypothesis, reference)),
        }
    }

    fn capabilities(&self) -> MetricCapabilities {
        MetricCapabilities {
            meteor: self.meteor_enabled,
            ..MetricCapabilities::all()
        }
    }
}
