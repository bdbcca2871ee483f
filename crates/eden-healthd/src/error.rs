//! Error types for eden-healthd

use eden_registry_health::ConfigError;
use thiserror::Error;

/// Daemon errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Monitor could not be constructed or started
    #[error("health monitor error: {0}")]
    Monitor(#[from] ConfigError),

    /// Report could not be rendered
    #[error("failed to render status report: {0}")]
    Render(#[from] serde_json::Error),
}

impl From<config::ConfigError> for DaemonError {
    fn from(e: config::ConfigError) -> Self {
        DaemonError::Config(e.to_string())
    }
}

/// Result type for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
