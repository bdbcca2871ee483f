//! Derived, read-only health metrics.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sample::HealthSample;
use crate::state::{HealthState, HealthStatus};

/// Metrics derived from the current state and recent samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    /// Coarse availability from the status (100 / 75 / 0).
    pub availability: u8,

    /// Mean latency of the successful samples in the history window.
    pub avg_latency_ms: u64,

    /// Current status.
    pub status: HealthStatus,

    /// When the most recent outage began.
    pub last_outage: Option<DateTime<Utc>>,
}

impl HealthMetrics {
    /// Derive metrics from a state snapshot and the sample history.
    pub fn derive(
        state: &HealthState,
        history: &SampleHistory,
        last_outage: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            availability: state.availability(),
            avg_latency_ms: history.average_success_latency_ms(),
            status: state.status,
            last_outage,
        }
    }
}

/// Bounded ring of the most recent samples.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples: VecDeque<HealthSample>,
    capacity: usize,
}

impl SampleHistory {
    /// Create a history retaining at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a sample, evicting the oldest when full.
    pub fn push(&mut self, sample: HealthSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples have been recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Retained samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HealthSample> {
        self.samples.iter()
    }

    /// Mean latency of retained successful samples, or 0 if there are none.
    ///
    /// Failed samples are excluded: a timeout reports the timeout budget, not
    /// a response time.
    pub fn average_success_latency_ms(&self) -> u64 {
        let (total, count) = self
            .samples
            .iter()
            .filter(|s| s.is_success())
            .fold((0u128, 0u128), |(total, count), s| {
                (total + u128::from(s.latency_ms()), count + 1)
            });

        if count == 0 {
            0
        } else {
            (total / count) as u64
        }
    }
}
