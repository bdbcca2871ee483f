//! Health monitoring configuration.
//!
//! Defines the Registry endpoint, probe scheduling, and the enforcement
//! policy. Durations are carried as milliseconds so the structs map directly
//! onto config files and environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Default polling interval.
pub const DEFAULT_INTERVAL_MS: u64 = 30_000;

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 10_000;

/// Default number of recent samples kept for latency averaging.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default failure count that moves Healthy to Degraded.
pub const DEFAULT_ALERT_THRESHOLD: u32 = 3;

/// Default failure count that moves Degraded to Critical.
pub const DEFAULT_CRITICAL_THRESHOLD: u32 = 5;

/// Complete configuration for the Registry health core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Registry endpoint configuration.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Probe scheduling configuration.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Fallback enforcement policy.
    #[serde(default)]
    pub policy: EnforcementPolicy,
}

impl HealthConfig {
    /// Check every invariant the runtime relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        self.registry.probe_url()?;
        self.monitor.validate()?;
        self.policy.validate()
    }
}

/// Where the Registry lives and what to read from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the Registry service.
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Path of the lightweight list endpoint used as the probe.
    #[serde(default = "default_probe_path")]
    pub probe_path: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            probe_path: default_probe_path(),
        }
    }
}

impl RegistryConfig {
    /// Full URL the probe reads.
    pub fn probe_url(&self) -> ConfigResult<Url> {
        let invalid = |reason: String| ConfigError::InvalidRegistryUrl {
            url: self.url.clone(),
            reason,
        };

        let mut base = Url::parse(&self.url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("url cannot be used as a base".to_string()));
        }

        // Url::join drops the last segment unless the base ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        base.join(self.probe_path.trim_start_matches('/'))
            .map_err(|e| invalid(e.to_string()))
    }
}

/// Probe scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Interval between scheduled probes.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Timeout applied to each probe, independent of the interval.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Number of recent samples retained.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl MonitorConfig {
    /// Interval between scheduled probes.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Per-probe timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Reject zero durations.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Whether callers may substitute fallback data while the Registry is
/// unhealthy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// The Registry is the single source of truth; unhealthy means reject.
    #[default]
    StrictNoFallback,

    /// Unhealthy means serve cached or bundled data instead.
    PermissiveFallback,
}

impl std::fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyMode::StrictNoFallback => write!(f, "strict_no_fallback"),
            PolicyMode::PermissiveFallback => write!(f, "permissive_fallback"),
        }
    }
}

impl std::str::FromStr for PolicyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "strict_no_fallback" | "strict" => Ok(PolicyMode::StrictNoFallback),
            "permissive_fallback" | "permissive" => Ok(PolicyMode::PermissiveFallback),
            other => Err(ConfigError::Load(format!("unknown policy mode: {}", other))),
        }
    }
}

/// Enforcement policy: fallback mode plus classification thresholds.
///
/// Construction guarantees `critical_threshold > alert_threshold >= 1`,
/// including when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPolicy")]
pub struct EnforcementPolicy {
    mode: PolicyMode,
    alert_threshold: u32,
    critical_threshold: u32,
}

impl EnforcementPolicy {
    /// Create a policy, rejecting inconsistent thresholds.
    pub fn new(mode: PolicyMode, alert_threshold: u32, critical_threshold: u32) -> ConfigResult<Self> {
        let policy = Self {
            mode,
            alert_threshold,
            critical_threshold,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Default thresholds with the given mode.
    pub fn with_mode(mode: PolicyMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Fallback mode.
    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    /// Consecutive failures that mark the Registry Degraded.
    pub fn alert_threshold(&self) -> u32 {
        self.alert_threshold
    }

    /// Consecutive failures that mark the Registry Critical.
    pub fn critical_threshold(&self) -> u32 {
        self.critical_threshold
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.alert_threshold < 1 || self.critical_threshold <= self.alert_threshold {
            return Err(ConfigError::InvalidThresholds {
                alert: self.alert_threshold,
                critical: self.critical_threshold,
            });
        }
        Ok(())
    }
}

impl Default for EnforcementPolicy {
    fn default() -> Self {
        Self {
            mode: PolicyMode::default(),
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

#[derive(Deserialize)]
struct RawPolicy {
    #[serde(default)]
    mode: PolicyMode,
    #[serde(default = "default_alert_threshold")]
    alert_threshold: u32,
    #[serde(default = "default_critical_threshold")]
    critical_threshold: u32,
}

impl TryFrom<RawPolicy> for EnforcementPolicy {
    type Error = ConfigError;

    fn try_from(raw: RawPolicy) -> Result<Self, Self::Error> {
        EnforcementPolicy::new(raw.mode, raw.alert_threshold, raw.critical_threshold)
    }
}

// Default value helpers
fn default_registry_url() -> String {
    "http://localhost:3005".to_string()
}

fn default_probe_path() -> String {
    "api/v1/agents".to_string()
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_alert_threshold() -> u32 {
    DEFAULT_ALERT_THRESHOLD
}

fn default_critical_threshold() -> u32 {
    DEFAULT_CRITICAL_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HealthConfig::default();
        assert_eq!(config.monitor.interval(), Duration::from_secs(30));
        assert_eq!(config.monitor.probe_timeout(), Duration::from_secs(10));
        assert_eq!(config.policy.alert_threshold(), 3);
        assert_eq!(config.policy.critical_threshold(), 5);
        assert_eq!(config.policy.mode(), PolicyMode::StrictNoFallback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let err = EnforcementPolicy::new(PolicyMode::StrictNoFallback, 5, 3).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidThresholds {
                alert: 5,
                critical: 3
            }
        ));
    }

    #[test]
    fn test_equal_and_zero_thresholds_rejected() {
        assert!(EnforcementPolicy::new(PolicyMode::PermissiveFallback, 4, 4).is_err());
        assert!(EnforcementPolicy::new(PolicyMode::PermissiveFallback, 0, 2).is_err());
        assert!(EnforcementPolicy::new(PolicyMode::PermissiveFallback, 1, 2).is_ok());
    }

    #[test]
    fn test_deserialize_validates_policy() {
        let ok: EnforcementPolicy =
            serde_json::from_str(r#"{"mode":"permissive_fallback","alert_threshold":2}"#).unwrap();
        assert_eq!(ok.mode(), PolicyMode::PermissiveFallback);
        assert_eq!(ok.alert_threshold(), 2);
        assert_eq!(ok.critical_threshold(), 5);

        let bad = serde_json::from_str::<EnforcementPolicy>(
            r#"{"alert_threshold":5,"critical_threshold":3}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_probe_url_join() {
        let registry = RegistryConfig {
            url: "https://registry.eden.art/v2".to_string(),
            probe_path: "/api/v1/agents".to_string(),
        };
        assert_eq!(
            registry.probe_url().unwrap().as_str(),
            "https://registry.eden.art/v2/api/v1/agents"
        );

        let bad = RegistryConfig {
            url: "not a url".to_string(),
            ..RegistryConfig::default()
        };
        assert!(matches!(
            bad.probe_url(),
            Err(ConfigError::InvalidRegistryUrl { .. })
        ));
    }

    #[test]
    fn test_zero_durations_rejected() {
        let mut monitor = MonitorConfig::default();
        monitor.interval_ms = 0;
        assert!(matches!(monitor.validate(), Err(ConfigError::ZeroInterval)));

        let mut monitor = MonitorConfig::default();
        monitor.probe_timeout_ms = 0;
        assert!(matches!(monitor.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_policy_mode_parse() {
        assert_eq!(
            "permissive".parse::<PolicyMode>().unwrap(),
            PolicyMode::PermissiveFallback
        );
        assert_eq!(
            "STRICT-NO-FALLBACK".parse::<PolicyMode>().unwrap(),
            PolicyMode::StrictNoFallback
        );
        assert!("sometimes".parse::<PolicyMode>().is_err());
    }
}
