//! Core types for the PawTrack engine
//!
//! This module defines the data structures that flow through the tracking
//! pipeline: raw position samples, retained position fixes, accumulated
//! activity metrics, and the tracking record snapshot handed to a sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Front-end that owns a tracking session, for provenance tagging.
///
/// The user and admin tracking surfaces share one engine; the tag only
/// changes how emitted records are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    User,
    Admin,
}

impl RecordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::User => "user",
            RecordSource::Admin => "admin",
        }
    }
}

/// One raw geographic observation delivered by a position source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Latitude in signed degrees
    pub latitude: f64,
    /// Longitude in signed degrees
    pub longitude: f64,
    /// Estimated horizontal error (meters, non-negative)
    pub accuracy: f64,
    /// Observation time. Values fed to the tracker must be non-decreasing;
    /// the engine does not re-sort.
    pub observed_at: DateTime<Utc>,
}

/// A retained history entry: a sample plus the speed computed for the step
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    pub observed_at: DateTime<Utc>,
    /// Instantaneous speed over the step from the previous fix (m/s).
    /// Zero for the first fix of a session.
    pub speed_mps: f64,
}

/// Accumulated movement metrics for one tracked subject.
///
/// Owned and mutated exclusively by one
/// [`ActivityTracker`](crate::activity::ActivityTracker); discarded when
/// tracking stops. Only derived snapshots are persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityMetrics {
    /// Total distance traveled this session (meters, non-decreasing)
    pub total_distance_m: f64,
    /// Mean of the positive speeds in the retained history (m/s)
    pub average_speed_mps: f64,
    /// Time attributed to active movement (seconds)
    pub active_seconds: f64,
    /// Time attributed to rest (seconds)
    pub rest_seconds: f64,
    /// Most recent fixes, oldest first (FIFO, bounded)
    pub history: VecDeque<PositionFix>,
}

impl ActivityMetrics {
    /// Total accumulated tracking time (seconds)
    pub fn total_seconds(&self) -> f64 {
        self.active_seconds + self.rest_seconds
    }

    /// Fraction of tracked time spent active, or 0 when nothing accumulated
    pub fn activity_ratio(&self) -> f64 {
        let total = self.total_seconds();
        if total > 0.0 {
            self.active_seconds / total
        } else {
            0.0
        }
    }

    /// Most recent fix, if any
    pub fn last_fix(&self) -> Option<&PositionFix> {
        self.history.back()
    }
}

/// Categorical health assessment derived from activity metrics.
///
/// Derived on demand; never stored as independent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLabel {
    /// Less than five minutes of accumulated data; not yet scorable
    Monitoring,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthLabel::Monitoring => "monitoring",
            HealthLabel::Poor => "poor",
            HealthLabel::Fair => "fair",
            HealthLabel::Good => "good",
            HealthLabel::Excellent => "excellent",
        }
    }
}

/// Coarse activity-level tag derived from average speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::High => "high",
        }
    }
}

/// How a tracking record was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMethod {
    PhoneGpsAuto,
    AdminGpsAuto,
    ManualRecord,
    AdminManualRecord,
}

impl TrackingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingMethod::PhoneGpsAuto => "phone_gps_auto",
            TrackingMethod::AdminGpsAuto => "admin_gps_auto",
            TrackingMethod::ManualRecord => "manual_record",
            TrackingMethod::AdminManualRecord => "admin_manual_record",
        }
    }
}

/// Snapshot submitted to the tracking-record sink on each emission.
///
/// The persistence timestamp is assigned by the sink's backing store, so the
/// record carries none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    /// Identifier of the tracked subject (e.g. a pet id)
    pub subject_id: String,
    /// Human-readable location description, coordinates to 6 decimal places
    pub location: String,
    pub health_status: HealthLabel,
    pub activity_level: ActivityLevel,
    /// Raw `lat,lng` coordinate pair; absent for manual captures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_coordinates: Option<String>,
    pub tracking_method: TrackingMethod,
    /// Free-text summary of the metrics behind this record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Final state of a tracking session, returned when it stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub subject_id: String,
    pub source: RecordSource,
    /// Position samples consumed from the source
    pub samples_seen: u64,
    /// Records delivered to the sink
    pub records_emitted: u64,
    /// Records still parked in the dead-letter buffer at shutdown
    pub records_buffered: u64,
    /// Metrics at the moment the session stopped
    pub metrics: ActivityMetrics,
    /// Label derived from the final metrics
    pub health: HealthLabel,
}
