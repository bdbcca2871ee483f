//! Closure-backed probes.
//!
//! Lets callers plug any async check into the monitor, and gives tests a
//! way to script probe outcomes without a live Registry.

use std::future::Future;

use async_trait::async_trait;

use super::RegistryProbe;
use crate::sample::HealthSample;

/// Probe implementation backed by a closure.
pub struct FnProbe<F> {
    name: String,
    probe_fn: F,
}

impl<F> FnProbe<F> {
    /// Create a named closure probe.
    pub fn new(name: impl Into<String>, probe_fn: F) -> Self {
        Self {
            name: name.into(),
            probe_fn,
        }
    }
}

#[async_trait]
impl<F, Fut> RegistryProbe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = HealthSample> + Send,
{
    async fn probe(&self) -> HealthSample {
        (self.probe_fn)().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Create a probe from a closure returning a sample future.
pub fn probe_fn<F, Fut>(name: impl Into<String>, f: F) -> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = HealthSample> + Send,
{
    FnProbe::new(name, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_closure_probe() {
        let probe = probe_fn("always-up", || async { HealthSample::success(Utc::now(), 3) });

        let sample = probe.probe().await;
        assert!(sample.is_success());
        assert_eq!(sample.latency_ms(), 3);
        assert_eq!(probe.name(), "always-up");
    }
}
