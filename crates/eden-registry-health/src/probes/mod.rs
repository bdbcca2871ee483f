//! Registry probes.
//!
//! A probe performs one lightweight read against the Registry and turns the
//! outcome into a [`HealthSample`]. Probes never fail: network errors,
//! timeouts, and non-2xx responses all become failed samples so the
//! monitoring loop cannot be taken down by the thing it monitors.

mod custom;
mod http;

pub use custom::{probe_fn, FnProbe};
pub use http::HttpRegistryProbe;

use async_trait::async_trait;

use crate::sample::HealthSample;

/// A single lightweight read against the Registry.
#[async_trait]
pub trait RegistryProbe: Send + Sync {
    /// Execute the probe.
    async fn probe(&self) -> HealthSample;

    /// Probe name for logging.
    fn name(&self) -> &str {
        "registry"
    }
}
