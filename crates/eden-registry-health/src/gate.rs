//! Fallback enforcement.
//!
//! Callers about to serve Registry data to an end user ask the gate whether
//! they may proceed, must substitute cached or bundled data, or must fail.
//! The answer depends only on the current [`HealthState`] and the configured
//! [`PolicyMode`]; the gate never performs I/O itself.

use std::future::Future;

use serde::Serialize;
use tracing::warn;

use crate::config::{EnforcementPolicy, PolicyMode};
use crate::error::{GateError, PolicyViolation};
use crate::state::HealthState;

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The Registry is healthy; serve live data.
    Proceed,

    /// The Registry is unhealthy; serve cached or bundled data instead.
    ProceedWithFallback,

    /// The Registry is unhealthy and fallback is forbidden.
    Reject(PolicyViolation),
}

impl Decision {
    /// Whether the decision is a rejection.
    pub fn is_reject(&self) -> bool {
        matches!(self, Decision::Reject(_))
    }

    /// Convert into a `Result`, surfacing rejection as an error.
    pub fn into_result(self) -> Result<FallbackMode, PolicyViolation> {
        match self {
            Decision::Proceed => Ok(FallbackMode::Live),
            Decision::ProceedWithFallback => Ok(FallbackMode::Fallback),
            Decision::Reject(violation) => Err(violation),
        }
    }
}

/// Which data a caller was cleared to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackMode {
    /// Live Registry data.
    Live,
    /// Cached or statically bundled data.
    Fallback,
}

/// Decide whether a caller may serve data given the current state.
pub fn authorize(state: &HealthState, policy: &EnforcementPolicy) -> Decision {
    if state.status.is_healthy() {
        return Decision::Proceed;
    }

    match policy.mode() {
        PolicyMode::PermissiveFallback => Decision::ProceedWithFallback,
        PolicyMode::StrictNoFallback => Decision::Reject(PolicyViolation {
            status: state.status,
            message: state.message.clone(),
            reason: format!(
                "dependency is {}: {}; no fallback permitted",
                state.status, state.message
            ),
        }),
    }
}

/// Origin of served data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Fetched live from the Registry.
    Registry,
    /// Substituted from a cache or bundled dataset.
    Fallback,
}

/// Data tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Served<T> {
    /// The data.
    pub data: T,

    /// Where the data came from.
    pub source: DataSource,
}

impl<T> Served<T> {
    fn registry(data: T) -> Self {
        Self {
            data,
            source: DataSource::Registry,
        }
    }

    fn fallback(data: T) -> Self {
        Self {
            data,
            source: DataSource::Fallback,
        }
    }

    /// Whether fallback data was served.
    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }
}

/// Policy-bound gate shared by every data-serving call site.
#[derive(Debug, Clone, Default)]
pub struct EnforcementGate {
    policy: EnforcementPolicy,
}

impl EnforcementGate {
    /// Create a gate for a policy.
    pub fn new(policy: EnforcementPolicy) -> Self {
        Self { policy }
    }

    /// Policy this gate enforces.
    pub fn policy(&self) -> &EnforcementPolicy {
        &self.policy
    }

    /// Decide for the given state.
    pub fn authorize(&self, state: &HealthState) -> Decision {
        authorize(state, &self.policy)
    }

    /// Serve data according to the policy.
    ///
    /// On `Proceed` the live fetch runs. Under permissive policy a failed
    /// live fetch still degrades to `fallback`; under strict policy its error
    /// is returned. On `ProceedWithFallback` the live fetch is skipped.
    /// Substitutions are logged, never raised.
    pub async fn serve<T, E, L, LF, F>(
        &self,
        state: &HealthState,
        live: L,
        fallback: F,
    ) -> Result<Served<T>, GateError<E>>
    where
        L: FnOnce() -> LF,
        LF: Future<Output = Result<T, E>>,
        F: FnOnce() -> T,
        E: std::fmt::Display,
    {
        match self.authorize(state) {
            Decision::Proceed => match live().await {
                Ok(data) => Ok(Served::registry(data)),
                Err(e) => match self.policy.mode() {
                    PolicyMode::PermissiveFallback => {
                        warn!(error = %e, "Registry fetch failed, serving fallback data");
                        Ok(Served::fallback(fallback()))
                    }
                    PolicyMode::StrictNoFallback => Err(GateError::Source(e)),
                },
            },
            Decision::ProceedWithFallback => {
                warn!(
                    status = %state.status,
                    message = %state.message,
                    "Registry unhealthy, serving fallback data"
                );
                Ok(Served::fallback(fallback()))
            }
            Decision::Reject(violation) => Err(GateError::Rejected(violation)),
        }
    }
}
