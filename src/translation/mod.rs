/*!
 * Translation of interactive requests.
 *
 * - `core`: the orchestrator that runs a request end to end
 * - `pipeline`: language pair to model resolution, with English pivot
 * - `cache`: process-wide store of loaded model handles
 * - `postprocess`: romanization cleanup and fixed Hindi output rules
 */

pub use self::core::{
    Comparison, HistoryStatus, Route, TranslationRequest, TranslationResult, TranslationService,
};
pub use self::pipeline::{Hop, ModelRef, PipelineDescriptor, PipelineResolver};

pub mod cache;
pub mod core;
pub mod pipeline;
pub mod postprocess;
