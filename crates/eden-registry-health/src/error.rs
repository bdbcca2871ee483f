//! Error types for eden-registry-health.
//!
//! Probe failures are never errors here: they become failed samples. The
//! only things surfaced to callers are misconfiguration and gate rejections.

use thiserror::Error;

use crate::state::HealthStatus;

/// Configuration rejected at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Thresholds violate `critical > alert >= 1`.
    #[error(
        "invalid thresholds: critical_threshold ({critical}) must be greater than alert_threshold ({alert}), and alert_threshold must be at least 1"
    )]
    InvalidThresholds { alert: u32, critical: u32 },

    /// Polling interval of zero.
    #[error("monitor interval must be greater than zero")]
    ZeroInterval,

    /// Probe timeout of zero.
    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,

    /// Registry URL could not be parsed or joined with the probe path.
    #[error("invalid registry url '{url}': {reason}")]
    InvalidRegistryUrl { url: String, reason: String },

    /// HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    HttpClient(String),

    /// Configuration source could not be loaded.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A caller asked to serve data while the dependency is unhealthy and the
/// policy forbids fallback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct PolicyViolation {
    /// Status at the time of the decision.
    pub status: HealthStatus,

    /// Classifier message at the time of the decision.
    pub message: String,

    /// Full rejection reason.
    pub reason: String,
}

/// Errors from [`EnforcementGate::serve`](crate::gate::EnforcementGate::serve).
#[derive(Debug, Error)]
pub enum GateError<E> {
    /// The gate refused to serve any data.
    #[error(transparent)]
    Rejected(#[from] PolicyViolation),

    /// The live fetch failed and no fallback was permitted.
    #[error("registry fetch failed: {0}")]
    Source(E),
}
