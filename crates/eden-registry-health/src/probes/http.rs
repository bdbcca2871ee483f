//! HTTP probe against the Registry list endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, instrument};
use url::Url;

use super::RegistryProbe;
use crate::clock::{Clock, SystemClock};
use crate::config::{HealthConfig, RegistryConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::sample::HealthSample;

/// Probes the Registry by issuing a GET against its list endpoint.
///
/// Only the status code matters; the body is never read past the headers.
pub struct HttpRegistryProbe {
    /// Shared HTTP client.
    client: reqwest::Client,

    /// Fully resolved probe URL.
    url: Url,

    /// Per-probe timeout.
    timeout: Duration,

    /// Timestamp source.
    clock: Arc<dyn Clock>,
}

impl HttpRegistryProbe {
    /// Create a probe for the given Registry.
    pub fn new(registry: &RegistryConfig, timeout: Duration) -> ConfigResult<Self> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        let mut url = registry.probe_url()?;
        url.query_pairs_mut().append_pair("limit", "1");

        let client = reqwest::Client::builder()
            .user_agent(concat!("eden-registry-health/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            url,
            timeout,
            clock: Arc::new(SystemClock),
        })
    }

    /// Create a probe from the full health configuration.
    pub fn from_config(config: &HealthConfig) -> ConfigResult<Self> {
        Self::new(&config.registry, config.monitor.probe_timeout())
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// URL this probe reads.
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch(&self) -> Result<(), String> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(format!("registry returned HTTP {}", status.as_u16()))
        }
    }
}

#[async_trait]
impl RegistryProbe for HttpRegistryProbe {
    fn name(&self) -> &str {
        "registry-http"
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn probe(&self) -> HealthSample {
        let start = Instant::now();

        let outcome = tokio::time::timeout(self.timeout, self.fetch()).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(())) => {
                debug!(latency_ms, "Registry probe succeeded");
                HealthSample::success(self.clock.now(), latency_ms)
            }
            Ok(Err(reason)) => {
                debug!(latency_ms, error = %reason, "Registry probe failed");
                HealthSample::failure(self.clock.now(), latency_ms, reason)
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                debug!(timeout_ms, "Registry probe timed out");
                HealthSample::failure(
                    self.clock.now(),
                    latency_ms,
                    format!("probe timed out after {}ms", timeout_ms),
                )
            }
        }
    }
}
