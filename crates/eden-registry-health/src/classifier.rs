//! Folds probe samples into [`HealthState`].
//!
//! Classification is a pure function of the consecutive-failure counter, not
//! an incremental stepper: a burst of failures observed at once can move the
//! state from Healthy straight to Critical.

use crate::config::EnforcementPolicy;
use crate::sample::HealthSample;
use crate::state::{HealthState, HealthStatus};

/// Fold `sample` into `prior` and return the new state.
///
/// Any success resets to Healthy. A failure below `alert_threshold` keeps the
/// prior status; only a success clears a Degraded or Critical verdict.
pub fn classify(
    sample: &HealthSample,
    prior: &HealthState,
    policy: &EnforcementPolicy,
) -> HealthState {
    if sample.is_success() {
        return HealthState {
            status: HealthStatus::Healthy,
            last_check: Some(sample.timestamp()),
            last_success: Some(sample.timestamp()),
            consecutive_failures: 0,
            latency_ms: sample.latency_ms(),
            message: format!("operational ({}ms response time)", sample.latency_ms()),
        };
    }

    let failures = prior.consecutive_failures.saturating_add(1);

    let (status, message) = if failures >= policy.critical_threshold() {
        (
            HealthStatus::Critical,
            format!("CRITICAL: unreachable for {} consecutive checks", failures),
        )
    } else if failures >= policy.alert_threshold() {
        (
            HealthStatus::Degraded,
            format!("DEGRADED: failing for {} consecutive checks", failures),
        )
    } else {
        (prior.status, format!("check failed (attempt {})", failures))
    };

    HealthState {
        status,
        last_check: Some(sample.timestamp()),
        last_success: prior.last_success,
        consecutive_failures: failures,
        latency_ms: sample.latency_ms(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyMode;
    use chrono::{Duration, TimeZone, Utc};

    fn policy() -> EnforcementPolicy {
        EnforcementPolicy::new(PolicyMode::StrictNoFallback, 3, 5).unwrap()
    }

    fn fail(offset_secs: i64) -> HealthSample {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset_secs);
        HealthSample::failure(ts, 10_000, "probe timed out after 10000ms")
    }

    fn feed(state: HealthState, samples: &[HealthSample]) -> HealthState {
        samples
            .iter()
            .fold(state, |acc, s| classify(s, &acc, &policy()))
    }

    #[test]
    fn test_success_message_and_timestamps() {
        let ts = Utc::now();
        let state = classify(
            &HealthSample::success(ts, 42),
            &HealthState::initial(),
            &policy(),
        );

        assert_eq!(state.status, HealthStatus::Healthy);
        assert_eq!(state.message, "operational (42ms response time)");
        assert_eq!(state.last_success, Some(ts));
        assert_eq!(state.last_check, Some(ts));
        assert_eq!(state.latency_ms, 42);
    }

    #[test]
    fn test_below_alert_keeps_status() {
        let state = feed(HealthState::initial(), &[fail(1), fail(2)]);
        assert_eq!(state.status, HealthStatus::Healthy);
        assert_eq!(state.consecutive_failures, 2);
        assert_eq!(state.message, "check failed (attempt 2)");
        assert_eq!(state.latency_ms, 10_000);
    }

    #[test]
    fn test_degraded_then_critical_then_recovered() {
        let degraded = feed(HealthState::initial(), &[fail(1), fail(2), fail(3)]);
        assert_eq!(degraded.status, HealthStatus::Degraded);
        assert_eq!(degraded.consecutive_failures, 3);
        assert_eq!(degraded.message, "DEGRADED: failing for 3 consecutive checks");

        let critical = feed(degraded, &[fail(4), fail(5)]);
        assert_eq!(critical.status, HealthStatus::Critical);
        assert_eq!(critical.consecutive_failures, 5);
        assert_eq!(
            critical.message,
            "CRITICAL: unreachable for 5 consecutive checks"
        );

        let ts = Utc::now();
        let healthy = classify(&HealthSample::success(ts, 80), &critical, &policy());
        assert_eq!(healthy.status, HealthStatus::Healthy);
        assert_eq!(healthy.consecutive_failures, 0);
        assert_eq!(healthy.last_success, Some(ts));
    }

    #[test]
    fn test_failure_keeps_last_success() {
        let ts = Utc::now();
        let ok = classify(&HealthSample::success(ts, 5), &HealthState::initial(), &policy());
        let failed = classify(&fail(10), &ok, &policy());
        assert_eq!(failed.last_success, Some(ts));
    }

    #[test]
    fn test_burst_jumps_straight_to_critical() {
        let prior = HealthState {
            consecutive_failures: 4,
            ..HealthState::initial()
        };
        let state = classify(&fail(1), &prior, &policy());
        assert_eq!(state.status, HealthStatus::Critical);
    }

    #[test]
    fn test_sub_threshold_failure_does_not_clear_critical() {
        // A restarted counter below alert still reports the prior verdict.
        let prior = HealthState {
            status: HealthStatus::Critical,
            consecutive_failures: 0,
            ..HealthState::initial()
        };
        let state = classify(&fail(1), &prior, &policy());
        assert_eq!(state.status, HealthStatus::Critical);
        assert_eq!(state.message, "check failed (attempt 1)");
    }
}
