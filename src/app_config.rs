use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::file_utils::FileManager;
use crate::language_utils::normalize_pair_key;

/// Application configuration module
/// This module handles loading, validating and saving configuration settings.
/// The configuration is read once at startup; there is no hot reload.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Where history and evaluation files live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Model selection settings
    #[serde(default)]
    pub models: ModelConfig,

    /// Translation inference backend
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Optional comparison provider
    #[serde(default)]
    pub comparison: ComparisonConfig,

    /// Metric settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Storage locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the append-only history CSV
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory receiving the evaluation CSV
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            out_dir: default_out_dir(),
        }
    }
}

impl StorageConfig {
    /// Path of the history CSV
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE_NAME)
    }

    /// Path of the evaluation CSV
    pub fn evaluation_path(&self) -> PathBuf {
        self.out_dir.join(EVALUATION_FILE_NAME)
    }
}

/// Model selection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelConfig {
    /// Root directory holding fine-tuned models as `<src>-<tgt>` subdirectories
    #[serde(default = "default_local_model_root")]
    pub local_model_root: PathBuf,

    /// Per-pair model overrides keyed by "src_tgt" (e.g. "en_hi")
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            local_model_root: default_local_model_root(),
            overrides: BTreeMap::new(),
        }
    }
}

/// Translation inference backend settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InferenceConfig {
    /// Endpoint serving public hub models
    #[serde(default = "default_inference_endpoint")]
    pub endpoint: String,

    /// Endpoint serving local fine-tuned models (same route shape)
    #[serde(default = "default_local_endpoint")]
    pub local_endpoint: String,

    /// Bearer token for the hub endpoint
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_inference_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_inference_endpoint(),
            local_endpoint: default_local_endpoint(),
            api_key: String::new(),
            timeout_secs: default_inference_timeout_secs(),
        }
    }
}

/// Comparison provider (Google Translate) settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ComparisonConfig {
    /// Whether the comparison path is used at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Service endpoint URL
    #[serde(default = "default_comparison_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_comparison_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_comparison_endpoint(),
            timeout_secs: default_comparison_timeout_secs(),
        }
    }
}

/// Metric settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EvaluationConfig {
    /// METEOR can be switched off; it is then reported as unavailable
    #[serde(default = "default_true")]
    pub meteor_enabled: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { meteor_enabled: true }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the `log` crate's filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

pub const HISTORY_FILE_NAME: &str = "historical.csv";
pub const EVALUATION_FILE_NAME: &str = "eval_results.csv";

/// Prefix of environment variables that override a pair's model, e.g. `MT_MODEL_en_hi`
pub const MODEL_OVERRIDE_ENV_PREFIX: &str = "MT_MODEL_";

fn default_data_dir() -> PathBuf {
    PathBuf::from("/tmp/data")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("/tmp/out")
}

fn default_local_model_root() -> PathBuf {
    PathBuf::from("models/local")
}

fn default_inference_endpoint() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_local_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_inference_timeout_secs() -> u64 {
    60
}

fn default_comparison_endpoint() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_comparison_timeout_secs() -> u64 {
    15
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a JSON file, creating it with defaults if missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            debug!("Loaded configuration from {:?}", path);
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
        Ok(config)
    }

    /// Merge `MT_MODEL_<src>_<tgt>` variables into the override table
    ///
    /// Environment entries win over file entries for the same pair.
    pub fn apply_env_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(pair) = key.strip_prefix(MODEL_OVERRIDE_ENV_PREFIX) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            match normalize_pair_key(pair) {
                Ok(pair) => {
                    debug!("Model override from environment: {} -> {}", pair, value);
                    self.models.overrides.insert(pair, value);
                }
                Err(e) => warn!("Ignoring {}: {}", key, e),
            }
        }
    }

    /// Validate the configuration for consistency and required values
    ///
    /// Override keys are rewritten to their canonical "src_tgt" form and a
    /// leading `~` in the storage and model directories is expanded.
    pub fn validate(&mut self) -> Result<()> {
        self.storage.data_dir = FileManager::expand_home(&self.storage.data_dir);
        self.storage.out_dir = FileManager::expand_home(&self.storage.out_dir);
        self.models.local_model_root = FileManager::expand_home(&self.models.local_model_root);

        let mut normalized = BTreeMap::new();
        for (key, location) in &self.models.overrides {
            let pair = normalize_pair_key(key)
                .map_err(|e| anyhow!("Invalid model override key '{}': {}", key, e))?;
            if location.trim().is_empty() {
                return Err(anyhow!("Model override for '{}' has an empty location", key));
            }
            if let Some(previous) = normalized.insert(pair.clone(), location.clone()) {
                warn!("Duplicate model override for {}: '{}' replaced by '{}'", pair, previous, location);
            }
        }
        self.models.overrides = normalized;

        if self.inference.endpoint.trim().is_empty() {
            return Err(anyhow!("Inference endpoint cannot be empty"));
        }
        if self.inference.timeout_secs == 0 {
            return Err(anyhow!("Inference timeout must be greater than zero"));
        }
        if self.comparison.enabled && self.comparison.endpoint.trim().is_empty() {
            return Err(anyhow!("Comparison endpoint cannot be empty when comparison is enabled"));
        }

        Ok(())
    }
}
