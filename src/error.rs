use std::path::PathBuf;

use thiserror::Error;

/// Failure while querying a single platform capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("{0} is not exposed by this platform")]
    Unsupported(&'static str),
    #[error("{probe} probe failed: {message}")]
    Failed {
        probe: &'static str,
        message: String,
    },
}

impl ProbeError {
    pub fn failed(probe: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            probe,
            message: message.into(),
        }
    }
}

/// Errors raised while loading or validating an [`AdaptiveConfig`](crate::AdaptiveConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while installing compatibility placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShimError {
    #[error("graphics namespace is not available")]
    NamespaceMissing,
    #[error("failed to register placeholder for {symbol}: {message}")]
    Registration { symbol: String, message: String },
}
