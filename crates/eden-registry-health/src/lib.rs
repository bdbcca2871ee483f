//! # Eden Registry Health - Dependency Health Monitoring and Fallback Policy
//!
//! Eden Academy reads agent and creation data from an external Registry
//! service. This crate watches that dependency and tells data-serving call
//! sites whether they may return live data, must substitute cached data, or
//! must fail.
//!
//! ## Key Components
//!
//! - [`probes`]: one lightweight read against the Registry, producing a
//!   [`HealthSample`]. Probes never fail; errors become failed samples.
//! - [`classify`]: folds samples into [`HealthState`] using consecutive
//!   failure counts (Healthy -> Degraded -> Critical, any success resets).
//! - [`EnforcementGate`]: turns the current state and the configured
//!   [`PolicyMode`] into a [`Decision`].
//! - [`HealthMonitor`]: owns the state, runs the polling loop, and exposes
//!   snapshots, metrics, and events.
//!
//! ## Example
//!
//! ```rust,no_run
//! use eden_registry_health::{Decision, HealthConfig, HealthMonitor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HealthConfig::default();
//! let monitor = HealthMonitor::from_config(&config)?;
//!
//! monitor.start_monitoring(config.monitor.interval())?;
//!
//! match monitor.authorize() {
//!     Decision::Proceed => { /* fetch from the Registry */ }
//!     Decision::ProceedWithFallback => { /* serve cached data */ }
//!     Decision::Reject(violation) => return Err(violation.into()),
//! }
//!
//! monitor.stop_monitoring();
//! # Ok(())
//! # }
//! ```
//!
//! ## Policy
//!
//! Exactly one fallback stance applies per deployment:
//!
//! - **StrictNoFallback**: the Registry is the single source of truth. While
//!   it is Degraded or Critical every request is rejected.
//! - **PermissiveFallback**: while the Registry is unhealthy callers serve
//!   cached or bundled data and log the substitution.

pub mod classifier;
pub mod clock;
pub mod config;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod monitor;
pub mod probes;
pub mod report;
pub mod sample;
pub mod state;

// Re-export main types
pub use classifier::classify;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EnforcementPolicy, HealthConfig, MonitorConfig, PolicyMode, RegistryConfig};
pub use error::{ConfigError, ConfigResult, GateError, PolicyViolation};
pub use gate::{authorize, DataSource, Decision, EnforcementGate, FallbackMode, Served};
pub use metrics::{HealthMetrics, SampleHistory};
pub use monitor::{HealthEvent, HealthMonitor};
pub use probes::{probe_fn, FnProbe, HttpRegistryProbe, RegistryProbe};
pub use report::StatusReport;
pub use sample::HealthSample;
pub use state::{HealthState, HealthStatus};
