//! Configuration for eden-healthd

use eden_registry_health::HealthConfig;
use serde::{Deserialize, Serialize};

use crate::error::{DaemonError, DaemonResult};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "EDEN_HEALTH";

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Registry, monitor and policy settings
    #[serde(flatten)]
    pub health: HealthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then an optional file, then
    /// `EDEN_HEALTH_*` environment variables (`__` separates nested keys,
    /// e.g. `EDEN_HEALTH_POLICY__MODE`).
    pub fn load(path: Option<&str>) -> DaemonResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`DaemonConfig::load`], reading `EDEN_HEALTH_*` variables from
    /// `env` instead of the process environment when given.
    pub fn load_with_env(
        path: Option<&str>,
        env: Option<config::Map<String, String>>,
    ) -> DaemonResult<Self> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        // Add environment variables
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: DaemonConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants after all overrides are applied
    pub fn validate(&self) -> DaemonResult<()> {
        self.health.validate().map_err(DaemonError::from)
    }
}
