/*!
 * Scoring and batch evaluation.
 *
 * - `metrics`: BLEU, TER and METEOR plus their sufficient statistics
 * - `corpus`: corpus-level aggregation for our system and the comparison provider
 * - `batch`: replays the history file and writes the evaluation file
 */

pub use self::batch::{BatchEvaluator, EvaluationReport, RowFailure, summarize_file, summarize_rows};
pub use self::corpus::{CorpusAccumulator, CorpusSummary, SideSummary};
pub use self::metrics::{MetricCapabilities, Metrics, StandardMetrics};

pub mod batch;
pub mod corpus;
pub mod metrics;
