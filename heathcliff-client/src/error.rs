//! Error types for the client binary.

use crate::api_client::ClientError;
use crate::config::ConfigError;
use heathcliff_core::ReportError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Usage: {0}")]
    Usage(String),
}
