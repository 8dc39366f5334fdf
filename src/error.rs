//! Error types shared across the client, controller, and outputs.
//!
//! Only a few of these ever reach the controller: transport and status
//! failures are absorbed by the mock fallback inside
//! [`NewsClient`](crate::api::NewsClient), so what surfaces in practice is
//! [`NewsError::Malformed`] from normalization.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    /// The request could not be sent or the body could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("GNews request failed: {message} (Status {status})")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NewsError>;
