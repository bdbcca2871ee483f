//! Health status and the rolled-up health state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::config::EnforcementPolicy;
use crate::sample::HealthSample;

/// Message carried by the state before any probe has completed.
pub const AWAITING_FIRST_CHECK: &str = "awaiting first check";

/// Health status of the Registry dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Last probe succeeded.
    Healthy,

    /// Failing for at least `alert_threshold` consecutive checks.
    Degraded,

    /// Failing for at least `critical_threshold` consecutive checks.
    Critical,
}

impl HealthStatus {
    /// Coarse availability figure for dashboards.
    ///
    /// This is not an uptime percentage and must not be read as one.
    pub fn availability(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 100,
            HealthStatus::Degraded => 75,
            HealthStatus::Critical => 0,
        }
    }

    /// Whether the status is [`HealthStatus::Healthy`].
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "Healthy"),
            HealthStatus::Degraded => write!(f, "Degraded"),
            HealthStatus::Critical => write!(f, "Critical"),
        }
    }
}

/// Process-wide rollup of the sample sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthState {
    /// Current status.
    pub status: HealthStatus,

    /// Timestamp of the most recent sample.
    pub last_check: Option<DateTime<Utc>>,

    /// Timestamp of the most recent successful sample.
    pub last_success: Option<DateTime<Utc>>,

    /// Failures since the last success.
    pub consecutive_failures: u32,

    /// Latency of the most recent sample, of either outcome.
    pub latency_ms: u64,

    /// Human-readable explanation of the current status.
    pub message: String,
}

impl HealthState {
    /// State before any probe has run.
    pub fn initial() -> Self {
        Self {
            status: HealthStatus::Healthy,
            last_check: None,
            last_success: None,
            consecutive_failures: 0,
            latency_ms: 0,
            message: AWAITING_FIRST_CHECK.to_string(),
        }
    }

    /// Fold a sample into this state in place.
    pub fn apply(&mut self, sample: &HealthSample, policy: &EnforcementPolicy) {
        *self = classify(sample, self, policy);
    }

    /// Availability derived from the current status.
    pub fn availability(&self) -> u8 {
        self.status.availability()
    }

    /// Whether a probe has completed yet.
    pub fn has_checked(&self) -> bool {
        self.last_check.is_some()
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::initial()
    }
}
