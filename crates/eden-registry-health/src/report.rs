//! Serializable status for reporting endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{EnforcementPolicy, PolicyMode};
use crate::metrics::HealthMetrics;
use crate::state::HealthState;

/// Snapshot of state, metrics, and policy, ready to be rendered as JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// Current health state.
    pub state: HealthState,

    /// Derived metrics.
    pub metrics: HealthMetrics,

    /// Fallback mode in force.
    pub policy_mode: PolicyMode,

    /// Consecutive failures that mark the Registry Degraded.
    pub alert_threshold: u32,

    /// Consecutive failures that mark the Registry Critical.
    pub critical_threshold: u32,

    /// Whether the polling loop is running.
    pub monitoring: bool,

    /// When this report was produced.
    pub generated_at: DateTime<Utc>,
}

impl StatusReport {
    /// Assemble a report.
    pub fn new(
        state: HealthState,
        metrics: HealthMetrics,
        policy: &EnforcementPolicy,
        monitoring: bool,
    ) -> Self {
        Self {
            state,
            metrics,
            policy_mode: policy.mode(),
            alert_threshold: policy.alert_threshold(),
            critical_threshold: policy.critical_threshold(),
            monitoring,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::SampleHistory;

    #[test]
    fn test_report_json_shape() {
        let state = HealthState::initial();
        let metrics = HealthMetrics::derive(&state, &SampleHistory::new(8), None);
        let report = StatusReport::new(state, metrics, &EnforcementPolicy::default(), false);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["policyMode"], "strict_no_fallback");
        assert_eq!(json["state"]["status"], "healthy");
        assert_eq!(json["state"]["consecutiveFailures"], 0);
        assert_eq!(json["metrics"]["availability"], 100);
        assert_eq!(json["monitoring"], false);
    }
}
