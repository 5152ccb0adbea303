//! Error types for the users search adapter

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building the adapter or talking to the cluster.
///
/// Construction-time variants (`Io`, `Yaml`, `Json`, `Config`, `Client`) are
/// fatal: no query can be issued until the setup is fixed. `Transport` and
/// `Remote` come back through a search's failure channel exactly as the
/// cluster client produced them.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings or credentials file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid YAML
    #[error("invalid settings file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Credentials file or response body is not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Semantically invalid configuration (no endpoints, bad address, ...)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The HTTP client could not be built
    #[error("failed to build cluster client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request signing failed
    #[error("failed to sign request: {0}")]
    Signing(String),

    /// Network level failure reported by the HTTP client
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The cluster answered with a non-success status; `body` is its error
    /// document as returned
    #[error("cluster responded with {status}: {body}")]
    Remote { status: StatusCode, body: Value },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status of a remote failure, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }
}
