//! Tracking-record encoding
//!
//! Builds the [`TrackingRecord`] snapshots submitted to a sink. The location
//! and notes formats match what the pet-fostering backend stores verbatim:
//! coordinates to 6 decimal places, accuracy rounded to whole meters, and a
//! short human-readable metrics summary.

use crate::health;
use crate::types::{
    ActivityMetrics, PositionSample, RecordSource, TrackingMethod, TrackingRecord,
};

/// Encoder for one tracked subject, parameterized by the owning front-end.
#[derive(Debug, Clone)]
pub struct RecordEncoder {
    subject_id: String,
    source: RecordSource,
}

impl RecordEncoder {
    pub fn new(subject_id: impl Into<String>, source: RecordSource) -> Self {
        Self {
            subject_id: subject_id.into(),
            source,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn source(&self) -> RecordSource {
        self.source
    }

    /// Record for the periodic automatic emission.
    pub fn auto_record(
        &self,
        position: &PositionSample,
        metrics: &ActivityMetrics,
    ) -> TrackingRecord {
        let prefix = match self.source {
            RecordSource::User => "Live GPS",
            RecordSource::Admin => "Admin GPS",
        };
        let notes_prefix = match self.source {
            RecordSource::User => "Auto-calculated",
            RecordSource::Admin => "Admin monitoring",
        };
        let method = match self.source {
            RecordSource::User => TrackingMethod::PhoneGpsAuto,
            RecordSource::Admin => TrackingMethod::AdminGpsAuto,
        };

        TrackingRecord {
            subject_id: self.subject_id.clone(),
            location: format!(
                "{}: {:.6}, {:.6} (\u{b1}{}m)",
                prefix,
                position.latitude,
                position.longitude,
                position.accuracy.round() as i64
            ),
            health_status: health::derive_health_label(metrics),
            activity_level: health::activity_level(metrics.average_speed_mps),
            phone_coordinates: Some(format!("{},{}", position.latitude, position.longitude)),
            tracking_method: method,
            notes: Some(format!(
                "{}: Distance: {:.1}m, Speed: {:.2}m/s, Active: {}min",
                notes_prefix,
                metrics.total_distance_m,
                metrics.average_speed_mps,
                (metrics.active_seconds / 60.0).round() as i64
            )),
        }
    }

    /// Record for an operator-initiated manual capture.
    ///
    /// Manual captures skip the raw coordinate pair and never report a `low`
    /// activity level.
    pub fn manual_record(
        &self,
        position: &PositionSample,
        metrics: &ActivityMetrics,
    ) -> TrackingRecord {
        let (prefix, method, notes) = match self.source {
            RecordSource::User => ("Manual GPS", TrackingMethod::ManualRecord, None),
            RecordSource::Admin => (
                "Admin Manual",
                TrackingMethod::AdminManualRecord,
                Some("Manually recorded by administrator".to_string()),
            ),
        };

        TrackingRecord {
            subject_id: self.subject_id.clone(),
            location: format!(
                "{}: {:.6}, {:.6}",
                prefix, position.latitude, position.longitude
            ),
            health_status: health::derive_health_label(metrics),
            activity_level: health::manual_activity_level(metrics.average_speed_mps),
            phone_coordinates: None,
            tracking_method: method,
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityLevel, HealthLabel};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn position() -> PositionSample {
        PositionSample {
            latitude: 48.856614,
            longitude: 2.352222,
            accuracy: 12.4,
            observed_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn metrics() -> ActivityMetrics {
        ActivityMetrics {
            total_distance_m: 152.34,
            average_speed_mps: 0.47,
            active_seconds: 240.0,
            rest_seconds: 360.0,
            history: Default::default(),
        }
    }

    #[test]
    fn test_user_auto_record_format() {
        let encoder = RecordEncoder::new("pet-7", RecordSource::User);
        let record = encoder.auto_record(&position(), &metrics());

        assert_eq!(record.subject_id, "pet-7");
        assert_eq!(record.location, "Live GPS: 48.856614, 2.352222 (\u{b1}12m)");
        assert_eq!(record.tracking_method, TrackingMethod::PhoneGpsAuto);
        assert_eq!(
            record.phone_coordinates.as_deref(),
            Some("48.856614,2.352222")
        );
        assert_eq!(
            record.notes.as_deref(),
            Some("Auto-calculated: Distance: 152.3m, Speed: 0.47m/s, Active: 4min")
        );
        assert_eq!(record.activity_level, ActivityLevel::High);
        // distance 152 m, ratio 0.4, speed 0.47, no history bonus = 85
        assert_eq!(record.health_status, HealthLabel::Excellent);
    }

    #[test]
    fn test_admin_auto_record_format() {
        let encoder = RecordEncoder::new("pet-7", RecordSource::Admin);
        let record = encoder.auto_record(&position(), &metrics());

        assert_eq!(record.location, "Admin GPS: 48.856614, 2.352222 (\u{b1}12m)");
        assert_eq!(record.tracking_method, TrackingMethod::AdminGpsAuto);
        assert!(record
            .notes
            .as_deref()
            .unwrap()
            .starts_with("Admin monitoring: Distance: 152.3m"));
    }

    #[test]
    fn test_user_manual_record_has_no_notes_or_coordinates() {
        let encoder = RecordEncoder::new("pet-7", RecordSource::User);
        let record = encoder.manual_record(&position(), &metrics());

        assert_eq!(record.location, "Manual GPS: 48.856614, 2.352222");
        assert_eq!(record.tracking_method, TrackingMethod::ManualRecord);
        assert_eq!(record.phone_coordinates, None);
        assert_eq!(record.notes, None);
    }

    #[test]
    fn test_admin_manual_record() {
        let encoder = RecordEncoder::new("pet-7", RecordSource::Admin);
        let mut m = metrics();
        m.average_speed_mps = 0.0;
        let record = encoder.manual_record(&position(), &m);

        assert_eq!(record.tracking_method, TrackingMethod::AdminManualRecord);
        assert_eq!(
            record.notes.as_deref(),
            Some("Manually recorded by administrator")
        );
        // manual captures never tag low activity
        assert_eq!(record.activity_level, ActivityLevel::Moderate);
    }

    #[test]
    fn test_accuracy_rounds_to_nearest_meter() {
        let encoder = RecordEncoder::new("pet-7", RecordSource::User);
        let mut pos = position();
        pos.accuracy = 12.5;
        let record = encoder.auto_record(&pos, &metrics());
        assert!(record.location.ends_with("(\u{b1}13m)"));
    }
}
