//! Daemon composition root and lifecycle

use std::sync::Arc;

use eden_registry_health::{Decision, HealthEvent, HealthMonitor, StatusReport};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::config::DaemonConfig;
use crate::error::DaemonResult;

/// Exit status of `--once` when the gate allows the Registry path.
pub const EXIT_OK: u8 = 0;

/// Exit status of `--once` when the gate rejects.
pub const EXIT_REJECTED: u8 = 1;

/// Owns the health monitor for the lifetime of the process
pub struct Daemon {
    config: DaemonConfig,
    monitor: Arc<HealthMonitor>,
}

impl Daemon {
    /// Build the daemon and its monitor from configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let monitor = HealthMonitor::from_config(&config.health)?;

        Ok(Self {
            config,
            monitor: Arc::new(monitor),
        })
    }

    /// Handle to the monitor
    pub fn monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }

    /// Probe once and return the report and gate decision
    pub async fn check_once(&self) -> (StatusReport, Decision) {
        self.monitor.check_now().await;
        (self.monitor.report(), self.monitor.authorize())
    }

    /// Probe once and map the gate decision to a process exit status:
    /// [`EXIT_OK`] unless the gate rejects, [`EXIT_REJECTED`] if it does.
    pub async fn check_once_exit_code(&self) -> (StatusReport, u8) {
        let (report, decision) = self.check_once().await;
        let code = if decision.is_reject() {
            EXIT_REJECTED
        } else {
            EXIT_OK
        };
        (report, code)
    }

    /// Run until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` completes
    pub async fn run_until<F>(self, shutdown: F) -> DaemonResult<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let events = self.monitor.subscribe();
        let reporter = tokio::spawn(log_events(events));

        self.monitor
            .start_monitoring(self.config.health.monitor.interval())?;

        info!(
            registry = %self.config.health.registry.url,
            interval_ms = self.config.health.monitor.interval_ms,
            policy = %self.monitor.policy().mode(),
            "Registry health daemon running"
        );

        shutdown.await;

        info!("Registry health daemon shutting down");
        self.monitor.stop_monitoring();
        reporter.abort();

        Ok(())
    }
}

/// Surface probe failures that the monitor itself only records at debug level
async fn log_events(mut events: tokio::sync::broadcast::Receiver<HealthEvent>) {
    loop {
        match events.recv().await {
            Ok(HealthEvent::SampleRecorded(sample)) => {
                if let Some(reason) = sample.error_message() {
                    warn!(
                        latency_ms = sample.latency_ms(),
                        error = %reason,
                        "Registry probe failed"
                    );
                }
            }
            Ok(HealthEvent::TickSkipped) => {
                debug!("Registry probe still in flight, tick skipped");
            }
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "Health event reporter lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
