/*!
 * Error types for the indicmt application.
 *
 * The taxonomy mirrors how failures are surfaced:
 * - validation errors (empty input, unsupported language) go straight back to the caller
 * - provider errors on the primary path fail the request
 * - provider errors on optional paths are downgraded to "unavailable" by the caller
 * - persistence errors are reported separately from translation errors
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to an external provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider is switched off or cannot serve this request at all
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur while producing a translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The input text is empty or whitespace only
    #[error("Please enter text to translate")]
    EmptyInput,

    /// A language outside the supported set was requested
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// No model could be resolved for a hop
    #[error("No translation model available for {source_lang} -> {target_lang}")]
    NoModel {
        source_lang: String,
        target_lang: String,
    },

    /// Error from a provider on the primary path
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl TranslationError {
    /// Whether this error is a validation problem the caller should prompt about
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::UnsupportedLanguage(_))
    }
}

/// Errors that can occur when reading or writing history and evaluation files
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// No history file exists yet
    #[error("No history available at {0:?}. Generate translations first.")]
    NoHistory(PathBuf),

    /// No evaluation output exists yet
    #[error("No evaluation results found at {0:?}")]
    NoEvaluation(PathBuf),

    /// A row violates the history invariants
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Filesystem error
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding/decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PersistenceError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration loading or validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from persistence
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Process exit code: 2 for input the user has to correct, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Translation(e) if e.is_validation() => 2,
            _ => 1,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(format!("{:#}", error))
    }
}
