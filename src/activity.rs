//! Activity tracking state transitions
//!
//! This module owns the incremental movement metrics for one tracked subject:
//! distance traveled, instantaneous and average speed, active/rest time, and
//! the bounded position history the health scorer reads.

use crate::geo;
use crate::types::{ActivityMetrics, PositionFix, PositionSample};
use serde::{Deserialize, Serialize};

/// Maximum number of retained position fixes (oldest evicted first)
pub const HISTORY_CAPACITY: usize = 50;

/// Speed above which a step counts as active rather than resting (m/s)
pub const ACTIVE_SPEED_FLOOR_MPS: f64 = 0.05;

/// Fixed time quantum attributed per update (seconds), matching the 30-second
/// emission cadence
pub const TIME_QUANTUM_SECS: f64 = 30.0;

/// How active/rest time is attributed on each update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeAttribution {
    /// Attribute a fixed 30-second quantum per update, regardless of the
    /// actual sample interval. Matches what the tracking surfaces have
    /// always reported, so derived health scores stay comparable.
    #[default]
    FixedQuantum,
    /// Attribute the wall-clock time elapsed since the previous sample.
    /// Avoids drift when samples arrive faster or slower than every 30
    /// seconds; scores shift accordingly.
    Elapsed,
}

/// Incremental tracker for one subject's movement metrics.
///
/// Single-writer by design: one tracker per live-tracking session, created
/// empty when tracking starts and discarded when it stops.
#[derive(Debug, Clone, Default)]
pub struct ActivityTracker {
    metrics: ActivityMetrics,
    attribution: TimeAttribution,
}

impl ActivityTracker {
    /// Create an empty tracker with the default fixed-quantum attribution
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tracker with a specific time-attribution policy
    pub fn with_attribution(attribution: TimeAttribution) -> Self {
        Self {
            metrics: ActivityMetrics::default(),
            attribution,
        }
    }

    /// Fold one position sample into the metrics.
    ///
    /// Always succeeds given well-formed numeric input: zero elapsed time and
    /// an empty history both degrade to a zero-speed step.
    pub fn update(&mut self, sample: &PositionSample) {
        let (distance_increment, speed, elapsed) = match self.metrics.history.back() {
            Some(last) => {
                let elapsed =
                    (sample.observed_at - last.observed_at).num_milliseconds() as f64 / 1000.0;
                let distance = geo::distance_meters(
                    last.latitude,
                    last.longitude,
                    sample.latitude,
                    sample.longitude,
                );
                (distance, geo::speed_mps(distance, elapsed), elapsed)
            }
            None => (0.0, 0.0, 0.0),
        };

        self.metrics.history.push_back(PositionFix {
            latitude: sample.latitude,
            longitude: sample.longitude,
            observed_at: sample.observed_at,
            speed_mps: speed,
        });
        while self.metrics.history.len() > HISTORY_CAPACITY {
            self.metrics.history.pop_front();
        }

        self.metrics.total_distance_m += distance_increment;
        self.metrics.average_speed_mps = mean_positive_speed(&self.metrics);

        let quantum = match self.attribution {
            TimeAttribution::FixedQuantum => TIME_QUANTUM_SECS,
            TimeAttribution::Elapsed => elapsed.max(0.0),
        };
        if speed > ACTIVE_SPEED_FLOOR_MPS {
            self.metrics.active_seconds += quantum;
        } else {
            self.metrics.rest_seconds += quantum;
        }
    }

    /// Current metrics
    pub fn metrics(&self) -> &ActivityMetrics {
        &self.metrics
    }

    /// Owned snapshot of the current metrics
    pub fn snapshot(&self) -> ActivityMetrics {
        self.metrics.clone()
    }

    /// Discard all accumulated state, as when tracking restarts
    pub fn reset(&mut self) {
        self.metrics = ActivityMetrics::default();
    }
}

/// Mean of the positive speeds in the retained history, or 0 when none exist
fn mean_positive_speed(metrics: &ActivityMetrics) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for fix in &metrics.history {
        if fix.speed_mps > 0.0 {
            sum += fix.speed_mps;
            count += 1;
        }
    }
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}
