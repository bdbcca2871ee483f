//! Probe outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One probe outcome.
///
/// `error_message` is present if and only if the probe failed. The fields are
/// private so that invariant can only be established through
/// [`HealthSample::success`] and [`HealthSample::failure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSample {
    timestamp: DateTime<Utc>,
    success: bool,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl HealthSample {
    /// Create a successful sample.
    pub fn success(timestamp: DateTime<Utc>, latency_ms: u64) -> Self {
        Self {
            timestamp,
            success: true,
            latency_ms,
            error_message: None,
        }
    }

    /// Create a failed sample.
    pub fn failure(timestamp: DateTime<Utc>, latency_ms: u64, error: impl Into<String>) -> Self {
        Self {
            timestamp,
            success: false,
            latency_ms,
            error_message: Some(error.into()),
        }
    }

    /// Instant the probe completed.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether the probe succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Wall-clock duration of the probe call.
    pub fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    /// Stringified cause of a failed probe.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}
