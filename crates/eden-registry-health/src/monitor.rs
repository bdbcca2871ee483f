//! Registry health monitor.
//!
//! The HealthMonitor owns the only writable copy of [`HealthState`]. A single
//! background task probes the Registry on a fixed period; on-demand checks go
//! through the same single-flight guard so at most one probe is outstanding.
//! Readers always receive cloned snapshots.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{EnforcementPolicy, HealthConfig, MonitorConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::gate::{Decision, EnforcementGate};
use crate::metrics::{HealthMetrics, SampleHistory};
use crate::probes::{HttpRegistryProbe, RegistryProbe};
use crate::report::StatusReport;
use crate::sample::HealthSample;
use crate::state::{HealthState, HealthStatus};

/// Events emitted by the health monitor.
#[derive(Debug, Clone)]
pub enum HealthEvent {
    /// The polling loop started (or restarted).
    MonitoringStarted { interval: Duration },

    /// The polling loop stopped.
    MonitoringStopped,

    /// A scheduled tick was dropped because a probe was still in flight.
    TickSkipped,

    /// A probe completed and was folded into the state.
    SampleRecorded(HealthSample),

    /// The status label changed.
    StatusChanged {
        from: HealthStatus,
        to: HealthStatus,
        message: String,
    },
}

/// Everything a probe completion updates, kept under one lock so readers
/// never observe a state without its matching history.
#[derive(Debug)]
struct Tracked {
    state: HealthState,
    history: SampleHistory,
    last_outage: Option<DateTime<Utc>>,
}

/// Shared between the monitor handle and its background task.
struct MonitorInner {
    /// Probe used for every check.
    probe: Arc<dyn RegistryProbe>,

    /// Policy gate.
    gate: EnforcementGate,

    /// Current state and recent samples.
    tracked: RwLock<Tracked>,

    /// Held for the duration of a probe.
    in_flight: tokio::sync::Mutex<()>,

    /// Event broadcaster.
    event_tx: broadcast::Sender<HealthEvent>,
}

/// Handle to the running polling loop.
struct LoopHandle {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl LoopHandle {
    fn cancel(self) {
        let _ = self.stop_tx.send(true);
        self.handle.abort();
    }
}

/// Health monitor for the Registry dependency.
pub struct HealthMonitor {
    inner: Arc<MonitorInner>,
    polling: Mutex<Option<LoopHandle>>,
}

impl HealthMonitor {
    /// Create a monitor with the default history capacity.
    pub fn new(probe: Arc<dyn RegistryProbe>, policy: EnforcementPolicy) -> Self {
        Self::with_config(probe, policy, &MonitorConfig::default())
    }

    /// Create a monitor with explicit monitor settings.
    pub fn with_config(
        probe: Arc<dyn RegistryProbe>,
        policy: EnforcementPolicy,
        config: &MonitorConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);

        Self {
            inner: Arc::new(MonitorInner {
                probe,
                gate: EnforcementGate::new(policy),
                tracked: RwLock::new(Tracked {
                    state: HealthState::initial(),
                    history: SampleHistory::new(config.history_capacity),
                    last_outage: None,
                }),
                in_flight: tokio::sync::Mutex::new(()),
                event_tx,
            }),
            polling: Mutex::new(None),
        }
    }

    /// Build a monitor with an HTTP probe from a full configuration.
    pub fn from_config(config: &HealthConfig) -> ConfigResult<Self> {
        config.validate()?;
        let probe = HttpRegistryProbe::from_config(config)?;
        Ok(Self::with_config(
            Arc::new(probe),
            config.policy.clone(),
            &config.monitor,
        ))
    }

    /// Subscribe to health events.
    pub fn subscribe(&self) -> broadcast::Receiver<HealthEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Policy in force.
    pub fn policy(&self) -> &EnforcementPolicy {
        self.inner.gate.policy()
    }

    /// Gate bound to this monitor's policy.
    pub fn gate(&self) -> &EnforcementGate {
        &self.inner.gate
    }

    /// Start polling: probe now, then every `interval`.
    ///
    /// A loop that is already running is cancelled first, so repeated calls
    /// never stack timers. Must be called from within a tokio runtime.
    #[instrument(skip(self))]
    pub fn start_monitoring(&self, interval: Duration) -> ConfigResult<()> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        let mut polling = self.polling.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(previous) = polling.take() {
            debug!("Cancelling previous polling loop");
            previous.cancel();
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            inner.run_loop(interval, stop_rx).await;
        });

        *polling = Some(LoopHandle { stop_tx, handle });
        drop(polling);

        info!(
            probe = self.inner.probe.name(),
            "Started Registry health monitoring"
        );
        let _ = self
            .inner
            .event_tx
            .send(HealthEvent::MonitoringStarted { interval });

        Ok(())
    }

    /// Stop polling. Returns whether a loop was running.
    pub fn stop_monitoring(&self) -> bool {
        let previous = self
            .polling
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        match previous {
            Some(handle) => {
                handle.cancel();
                info!("Stopped Registry health monitoring");
                let _ = self.inner.event_tx.send(HealthEvent::MonitoringStopped);
                true
            }
            None => false,
        }
    }

    /// Whether a polling loop is active.
    pub fn is_monitoring(&self) -> bool {
        self.polling
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|h| !h.handle.is_finished())
            .unwrap_or(false)
    }

    /// Probe now and return the resulting state.
    ///
    /// If a probe is already in flight this waits for it and returns its
    /// result instead of issuing a second request.
    pub async fn check_now(&self) -> HealthState {
        match self.inner.in_flight.try_lock() {
            Ok(_guard) => self.inner.probe_and_record().await,
            Err(_) => {
                debug!("Probe already in flight, joining it");
                let _guard = self.inner.in_flight.lock().await;
                self.get_status()
            }
        }
    }

    /// Snapshot of the current state.
    pub fn get_status(&self) -> HealthState {
        self.inner.read(|t| t.state.clone())
    }

    /// Derived metrics.
    pub fn get_metrics(&self) -> HealthMetrics {
        self.inner
            .read(|t| HealthMetrics::derive(&t.state, &t.history, t.last_outage))
    }

    /// Recent samples, oldest first.
    pub fn recent_samples(&self) -> Vec<HealthSample> {
        self.inner.read(|t| t.history.iter().cloned().collect())
    }

    /// Decide against the current state.
    pub fn authorize(&self) -> Decision {
        self.inner.gate.authorize(&self.get_status())
    }

    /// Serializable status for reporting endpoints.
    pub fn report(&self) -> StatusReport {
        let (state, metrics) = self.inner.read(|t| {
            (
                t.state.clone(),
                HealthMetrics::derive(&t.state, &t.history, t.last_outage),
            )
        });

        StatusReport::new(state, metrics, self.policy(), self.is_monitoring())
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if let Some(handle) = self
            .polling
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.cancel();
        }
    }
}

/// Tick boundaries after `deadline` that passed strictly before `now`.
fn missed_ticks(deadline: Instant, now: Instant, interval: Duration) -> u32 {
    let elapsed = now.saturating_duration_since(deadline).as_nanos();
    let missed = elapsed.saturating_sub(1) / interval.as_nanos().max(1);
    u32::try_from(missed).unwrap_or(u32::MAX)
}

impl MonitorInner {
    fn read<T>(&self, f: impl FnOnce(&Tracked) -> T) -> T {
        let tracked = self.tracked.read().unwrap_or_else(|e| e.into_inner());
        f(&tracked)
    }

    async fn run_loop(&self, interval: Duration, mut stop_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval_at(Instant::now(), interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                deadline = ticker.tick() => {
                    match self.in_flight.try_lock() {
                        Ok(_guard) => {
                            self.probe_and_record().await;

                            let missed = missed_ticks(deadline, Instant::now(), interval);
                            if missed > 0 {
                                debug!(missed, "Probe overran the polling interval, skipping ticks");
                                for _ in 0..missed {
                                    let _ = self.event_tx.send(HealthEvent::TickSkipped);
                                }
                                let realign = interval.saturating_mul(missed.saturating_add(1));
                                if let Some(next) = deadline.checked_add(realign) {
                                    ticker.reset_at(next);
                                }
                            }
                        }
                        Err(_) => {
                            debug!("Probe still in flight, skipping tick");
                            let _ = self.event_tx.send(HealthEvent::TickSkipped);
                        }
                    }
                }
                _ = stop_rx.changed() => break,
            }
        }

        debug!("Polling loop exited");
    }

    /// Run the probe and fold its sample in. Callers hold `in_flight`.
    async fn probe_and_record(&self) -> HealthState {
        let sample = self.probe.probe().await;
        self.record(sample)
    }

    fn record(&self, sample: HealthSample) -> HealthState {
        let policy = self.gate.policy();

        let (previous, current) = {
            let mut tracked = self.tracked.write().unwrap_or_else(|e| e.into_inner());
            let previous = tracked.state.status;

            tracked.state.apply(&sample, policy);
            tracked.history.push(sample.clone());

            if previous.is_healthy() && !tracked.state.status.is_healthy() {
                tracked.last_outage = Some(sample.timestamp());
            }

            (previous, tracked.state.clone())
        };

        debug!(
            success = sample.is_success(),
            latency_ms = sample.latency_ms(),
            consecutive_failures = current.consecutive_failures,
            message = %current.message,
            "Recorded Registry health sample"
        );

        let _ = self.event_tx.send(HealthEvent::SampleRecorded(sample));

        if previous != current.status {
            match current.status {
                HealthStatus::Healthy => info!(
                    from = %previous,
                    message = %current.message,
                    "Registry recovered"
                ),
                HealthStatus::Degraded => warn!(
                    from = %previous,
                    message = %current.message,
                    "Registry degraded"
                ),
                HealthStatus::Critical => error!(
                    from = %previous,
                    message = %current.message,
                    "Registry critical"
                ),
            }

            let _ = self.event_tx.send(HealthEvent::StatusChanged {
                from: previous,
                to: current.status,
                message: current.message.clone(),
            });
        }

        current
    }
}
