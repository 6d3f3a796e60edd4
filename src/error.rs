//! Error types for the roster pipeline.
//!
//! Only [`NormalizeError`] originates in the resolution core, and it is always
//! recovered by dropping the offending candidate. [`ConnectorError`] is caught
//! at the connector boundary and degrades to an empty batch. [`ConfigError`] is
//! the one kind that aborts a run.

use crate::models::SourceKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Malformed candidate from {origin}: display name is empty ({reference})")]
    MalformedCandidate {
        origin: SourceKind,
        reference: String,
    },
}

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid CSS selector `{0}`")]
    Selector(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ConnectorError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            ConnectorError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ConnectorError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Relevance keyword set must not be empty")]
    EmptyRelevanceKeywords,

    #[error("Relevance threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),
}
