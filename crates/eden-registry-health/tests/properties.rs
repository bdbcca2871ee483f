use chrono::{Duration, TimeZone, Utc};
use eden_registry_health::{
    authorize, classify, ConfigError, Decision, EnforcementPolicy, HealthSample, HealthState,
    HealthStatus, PolicyMode,
};
use proptest::prelude::*;

fn sample(index: usize, success: bool) -> HealthSample {
    let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(index as i64);
    if success {
        HealthSample::success(ts, 20)
    } else {
        HealthSample::failure(ts, 10_000, "probe timed out after 10000ms")
    }
}

fn policy_strategy() -> impl Strategy<Value = EnforcementPolicy> {
    (1u32..10, 1u32..10, any::<bool>()).prop_map(|(alert, gap, permissive)| {
        let mode = if permissive {
            PolicyMode::PermissiveFallback
        } else {
            PolicyMode::StrictNoFallback
        };
        EnforcementPolicy::new(mode, alert, alert + gap).unwrap()
    })
}

fn status_strategy() -> impl Strategy<Value = HealthStatus> {
    prop_oneof![
        Just(HealthStatus::Healthy),
        Just(HealthStatus::Degraded),
        Just(HealthStatus::Critical),
    ]
}

proptest! {
    #[test]
    fn counter_tracks_streak_and_resets_on_success(
        outcomes in prop::collection::vec(any::<bool>(), 0..60),
        policy in policy_strategy(),
    ) {
        let mut state = HealthState::initial();
        let mut streak = 0u32;

        for (i, success) in outcomes.iter().copied().enumerate() {
            let s = sample(i, success);
            state = classify(&s, &state, &policy);

            if success {
                streak = 0;
                prop_assert_eq!(state.status, HealthStatus::Healthy);
                prop_assert_eq!(state.last_success, Some(s.timestamp()));
            } else {
                streak += 1;
            }
            prop_assert_eq!(state.consecutive_failures, streak);
            prop_assert_eq!(state.last_check, Some(s.timestamp()));
        }
    }

    #[test]
    fn status_bands_follow_thresholds(
        outcomes in prop::collection::vec(any::<bool>(), 1..60),
        policy in policy_strategy(),
    ) {
        let mut state = HealthState::initial();

        for (i, success) in outcomes.iter().copied().enumerate() {
            state = classify(&sample(i, success), &state, &policy);
            let n = state.consecutive_failures;

            if n >= policy.critical_threshold() {
                prop_assert_eq!(state.status, HealthStatus::Critical);
            } else if n >= policy.alert_threshold() {
                prop_assert_eq!(state.status, HealthStatus::Degraded);
            }
            if n >= policy.alert_threshold() {
                prop_assert_ne!(state.status, HealthStatus::Healthy);
            }
        }
    }

    #[test]
    fn availability_depends_only_on_status(
        status in status_strategy(),
        failures in 0u32..100,
        latency in 0u64..100_000,
    ) {
        let state = HealthState {
            status,
            consecutive_failures: failures,
            latency_ms: latency,
            ..HealthState::initial()
        };
        let expected = match status {
            HealthStatus::Healthy => 100,
            HealthStatus::Degraded => 75,
            HealthStatus::Critical => 0,
        };
        prop_assert_eq!(state.availability(), expected);
    }

    #[test]
    fn strict_proceeds_iff_healthy_and_permissive_never_rejects(
        status in status_strategy(),
        message in "[a-zA-Z0-9 :()]{0,40}",
        alert in 1u32..10,
        gap in 1u32..10,
    ) {
        let state = HealthState {
            status,
            message,
            ..HealthState::initial()
        };

        let strict = EnforcementPolicy::new(PolicyMode::StrictNoFallback, alert, alert + gap).unwrap();
        let decision = authorize(&state, &strict);
        prop_assert_eq!(decision == Decision::Proceed, status == HealthStatus::Healthy);
        prop_assert_eq!(decision.is_reject(), status != HealthStatus::Healthy);

        let permissive =
            EnforcementPolicy::new(PolicyMode::PermissiveFallback, alert, alert + gap).unwrap();
        prop_assert!(!authorize(&state, &permissive).is_reject());
    }

    #[test]
    fn inverted_or_equal_thresholds_fail_fast(alert in 0u32..50, critical in 0u32..50) {
        prop_assume!(critical <= alert || alert == 0);
        for mode in [PolicyMode::StrictNoFallback, PolicyMode::PermissiveFallback] {
            let result = EnforcementPolicy::new(mode, alert, critical);
            let is_invalid = matches!(result, Err(ConfigError::InvalidThresholds { .. }));
            prop_assert!(is_invalid);
        }
    }
}

#[test]
fn scenario_walkthrough() {
    let strict = EnforcementPolicy::new(PolicyMode::StrictNoFallback, 3, 5).unwrap();
    let permissive = EnforcementPolicy::new(PolicyMode::PermissiveFallback, 3, 5).unwrap();

    let mut state = HealthState::initial();
    for i in 0..3 {
        state = classify(&sample(i, false), &state, &strict);
    }
    assert_eq!(state.status, HealthStatus::Degraded);
    assert_eq!(state.consecutive_failures, 3);

    for i in 3..5 {
        state = classify(&sample(i, false), &state, &strict);
    }
    assert_eq!(state.status, HealthStatus::Critical);
    assert_eq!(state.consecutive_failures, 5);

    match authorize(&state, &strict) {
        Decision::Reject(violation) => assert!(violation.reason.contains("Critical")),
        other => panic!("expected Reject, got {:?}", other),
    }
    assert_eq!(authorize(&state, &permissive), Decision::ProceedWithFallback);

    let success = sample(5, true);
    let recovered = classify(&success, &state, &strict);
    assert_eq!(recovered.status, HealthStatus::Healthy);
    assert_eq!(recovered.consecutive_failures, 0);
    assert_eq!(recovered.last_success, Some(success.timestamp()));

    assert!(matches!(
        EnforcementPolicy::new(PolicyMode::StrictNoFallback, 5, 3),
        Err(ConfigError::InvalidThresholds { .. })
    ));
}
