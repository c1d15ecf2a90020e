/*!
 * Common test utilities for the indicmt test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;

use indicmt::app_config::ModelConfig;
use indicmt::evaluation::metrics::StandardMetrics;
use indicmt::history::HISTORY_COLUMNS;
use indicmt::language_utils::Language;
use indicmt::providers::mock::{CountingTransliterator, MockTranslator};
use indicmt::translation::{PipelineResolver, TranslationService};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes a history file with the standard header and the given rows
pub fn create_history_file(dir: &Path, rows: &[[&str; 5]]) -> Result<PathBuf> {
    let mut writer = csv::Writer::from_path(dir.join("historical.csv"))?;
    writer.write_record(HISTORY_COLUMNS)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(dir.join("historical.csv"))
}

/// Route log output through env_logger once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Short model ids so mock outputs stay readable
pub fn test_models() -> Vec<(Language, Language, &'static str)> {
    vec![
        (Language::English, Language::Hindi, "en-hi"),
        (Language::Hindi, Language::English, "hi-en"),
        (Language::English, Language::Marathi, "en-mr"),
        (Language::Marathi, Language::English, "mr-en"),
    ]
}

/// Resolver with the short test models and no local model directory
pub fn test_resolver() -> PipelineResolver {
    let config = ModelConfig {
        local_model_root: PathBuf::from("/nonexistent/indicmt/models"),
        ..ModelConfig::default()
    };
    PipelineResolver::new(&config).with_default_models(test_models())
}

/// Service over mock providers; clones of the mocks share their call counters
pub fn test_service(translator: &MockTranslator, transliterator: &CountingTransliterator) -> TranslationService {
    TranslationService::new(
        test_resolver(),
        Arc::new(translator.clone()),
        Arc::new(transliterator.clone()),
        Arc::new(StandardMetrics::default()),
    )
}
