/*!
 * # indicmt - Indic machine translation orchestrator
 *
 * A Rust library that routes English, Hindi and Marathi text through
 * pre-trained translation models, with an English pivot when a pair has no
 * model of its own.
 *
 * ## Features
 *
 * - Pipeline resolution: per-pair overrides, local fine-tuned models, public defaults
 * - ITRANS transliteration for romanized English-to-Indic input
 * - Fixed Hindi post-processing rules (acronyms, progressive aspect)
 * - BLEU, TER and METEOR against an optional reference
 * - Append-only translation history and batch evaluation with corpus scores
 * - Optional comparison against Google Translate
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Request orchestration:
 *   - `translation::core`: The translation service
 *   - `translation::pipeline`: Language pair to model resolution
 *   - `translation::cache`: Model handle cache
 *   - `translation::postprocess`: Romanization cleanup and Hindi rules
 * - `evaluation`: Metrics, corpus aggregation and the batch evaluator
 * - `history`: History and evaluation CSV files
 * - `providers`: Provider traits and their clients:
 *   - `providers::inference`: Model inference endpoint client
 *   - `providers::itrans`: ITRANS transliteration
 *   - `providers::google`: Google Translate comparison client
 *   - `providers::mock`: Deterministic providers for tests
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Supported languages and ISO code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod evaluation;
pub mod file_utils;
pub mod history;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use language_utils::Language;
pub use translation::{TranslationRequest, TranslationResult, TranslationService};
