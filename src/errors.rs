/*!
 * Error types for the studio-localizer application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
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
}

impl ProviderError {
    /// Whether a retry has a reasonable chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }

    /// Map an HTTP status and body to the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
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

/// A single (beat, language) task that could not be produced
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageFailure {
    /// Target language of the failed task
    pub language: String,
    /// Human readable cause
    pub reason: String,
}

/// All failed languages of one beat
#[derive(Debug, Clone, PartialEq)]
pub struct BeatFailure {
    /// Position of the beat in the document
    pub beat_index: usize,
    /// Failed languages with their causes
    pub failures: Vec<LanguageFailure>,
}

impl BeatFailure {
    /// Names of the failed languages, in configured order
    pub fn languages(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.language.as_str()).collect()
    }
}

impl std::fmt::Display for BeatFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let details = self
            .failures
            .iter()
            .map(|failure| format!("{}: {}", failure.language, failure.reason))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "beat {} ({})", self.beat_index, details)
    }
}

/// Errors raised by the localization pipeline
#[derive(Error, Debug)]
pub enum LocalizeError {
    /// The external translator failed for one (beat, language) pair
    #[error("Translation of beat {beat_index} into '{language}' failed: {source}")]
    Translation {
        /// Position of the beat in the document
        beat_index: usize,
        /// Target language
        language: String,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// The segmenter exceeded its recursion bound
    #[error("Segmentation of '{language}' text failed: {reason}")]
    Segmentation {
        /// Language whose rules were applied
        language: String,
        /// What went wrong
        reason: String,
    },

    /// Missing or inconsistent configuration, raised before any task starts
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// At least one task failed while the run was configured to abort
    #[error("Localization incomplete: {}", format_failures(.0))]
    Incomplete(Vec<BeatFailure>),

    /// The run was cancelled before every beat completed
    #[error("Localization cancelled")]
    Cancelled,
}

fn format_failures(failures: &[BeatFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from localization
    #[error("Localization error: {0}")]
    Localize(#[from] LocalizeError),

    /// Malformed studio document
    #[error("Document error: {0}")]
    Document(#[from] serde_json::Error),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
