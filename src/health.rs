//! Health-score derivation
//!
//! Pure functions mapping accumulated activity metrics to a categorical
//! health label and an activity-level tag. The bracket ordering and bound
//! exclusivity below are the externally observable scoring contract and must
//! not be reordered.

use crate::types::{ActivityLevel, ActivityMetrics, HealthLabel};

/// Minimum accumulated tracking time before a score is meaningful (seconds)
pub const MIN_SCORING_SECONDS: f64 = 300.0;

/// Derive the health label from the current metrics.
///
/// Returns [`HealthLabel::Monitoring`] with less than five minutes of
/// accumulated data, regardless of the other fields. Otherwise sums three
/// weighted factors plus a movement-pattern bonus and maps the total:
/// `>=85` excellent, `>=70` good, `>=50` fair, else poor.
pub fn derive_health_label(metrics: &ActivityMetrics) -> HealthLabel {
    let total_time = metrics.total_seconds();
    if total_time < MIN_SCORING_SECONDS {
        return HealthLabel::Monitoring;
    }

    let score = health_score(metrics);

    if score >= 85 {
        HealthLabel::Excellent
    } else if score >= 70 {
        HealthLabel::Good
    } else if score >= 50 {
        HealthLabel::Fair
    } else {
        HealthLabel::Poor
    }
}

/// Weighted activity score, first matching bracket wins.
fn health_score(metrics: &ActivityMetrics) -> u32 {
    let total_distance = metrics.total_distance_m;
    let activity_ratio = metrics.activity_ratio();
    let average_speed = metrics.average_speed_mps;
    let mut score = 0u32;

    // Distance factor
    if total_distance > 50.0 && total_distance < 5000.0 {
        score += 30;
    } else if total_distance > 20.0 {
        score += 20;
    } else {
        score += 10;
    }

    // Activity-ratio factor
    if activity_ratio > 0.2 && activity_ratio < 0.6 {
        score += 30;
    } else if activity_ratio > 0.1 {
        score += 20;
    } else {
        score += 10;
    }

    // Speed factor
    if average_speed > 0.1 && average_speed < 2.0 {
        score += 25;
    } else if average_speed > 0.05 {
        score += 15;
    } else {
        score += 5;
    }

    // Regular movement pattern bonus
    if metrics.history.len() > 10 {
        let mut recent = metrics.history.iter().rev().take(10);
        if recent.any(|fix| fix.speed_mps > 0.1) {
            score += 15;
        }
    }

    score
}

/// Activity-level tag emitted alongside auto-captured records
pub fn activity_level(average_speed_mps: f64) -> ActivityLevel {
    if average_speed_mps > 0.2 {
        ActivityLevel::High
    } else if average_speed_mps > 0.05 {
        ActivityLevel::Moderate
    } else {
        ActivityLevel::Low
    }
}

/// Activity-level tag for manual captures, which never report `low`
pub fn manual_activity_level(average_speed_mps: f64) -> ActivityLevel {
    if average_speed_mps > 0.2 {
        ActivityLevel::High
    } else {
        ActivityLevel::Moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionFix;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn metrics(
        total_distance_m: f64,
        average_speed_mps: f64,
        active_seconds: f64,
        rest_seconds: f64,
    ) -> ActivityMetrics {
        ActivityMetrics {
            total_distance_m,
            average_speed_mps,
            active_seconds,
            rest_seconds,
            history: Default::default(),
        }
    }

    fn push_fixes(m: &mut ActivityMetrics, count: usize, speed: f64) {
        for i in 0..count {
            m.history.push_back(PositionFix {
                latitude: 48.0,
                longitude: 2.0,
                observed_at: Utc.timestamp_opt(1_700_000_000 + i as i64 * 30, 0).unwrap(),
                speed_mps: speed,
            });
        }
    }

    #[test]
    fn test_monitoring_floor_under_five_minutes() {
        // Strong metrics everywhere else must not override the floor
        let mut m = metrics(1000.0, 1.5, 200.0, 50.0);
        push_fixes(&mut m, 20, 1.5);
        assert_eq!(derive_health_label(&m), HealthLabel::Monitoring);
    }

    #[test]
    fn test_perfect_score_scenario() {
        // distance 100 (+30), ratio 0.4 (+30), speed 0.5 (+25), bonus (+15) = 100
        let mut m = metrics(100.0, 0.5, 240.0, 360.0);
        push_fixes(&mut m, 12, 0.5);
        assert_eq!(derive_health_label(&m), HealthLabel::Excellent);
    }

    #[test]
    fn test_sedentary_session_scores_poor() {
        // distance 0 (+10), ratio 0 (+10), speed 0 (+5), no bonus = 25
        let m = metrics(0.0, 0.0, 0.0, 600.0);
        assert_eq!(derive_health_label(&m), HealthLabel::Poor);
    }

    #[test]
    fn test_distance_upper_bound_is_exclusive() {
        // At exactly 5000 m the first bracket no longer matches and the
        // >20 bracket takes over: 20 + 30 + 25 + 15 = 90 -> still excellent,
        // but 10 points below the in-range equivalent.
        let mut in_range = metrics(4999.0, 0.5, 240.0, 360.0);
        push_fixes(&mut in_range, 12, 0.5);
        let mut at_bound = metrics(5000.0, 0.5, 240.0, 360.0);
        push_fixes(&mut at_bound, 12, 0.5);

        assert_eq!(derive_health_label(&in_range), HealthLabel::Excellent);
        assert_eq!(derive_health_label(&at_bound), HealthLabel::Excellent);

        // Shift the speed factor down so the 10-point difference becomes
        // visible at the excellent/good boundary.
        let mut in_range = metrics(4999.0, 0.06, 240.0, 360.0);
        push_fixes(&mut in_range, 12, 0.06);
        let mut at_bound = metrics(5000.0, 0.06, 240.0, 360.0);
        push_fixes(&mut at_bound, 12, 0.06);

        // 30 + 30 + 15 = 75 (no bonus at 0.06 m/s) -> good
        assert_eq!(derive_health_label(&in_range), HealthLabel::Good);
        // 20 + 30 + 15 = 65 -> fair
        assert_eq!(derive_health_label(&at_bound), HealthLabel::Fair);
    }

    #[test]
    fn test_movement_bonus_requires_more_than_ten_fixes() {
        // 30 + 30 + 25 = 85 without the bonus; exactly 10 fixes do not grant it
        let mut short_history = metrics(100.0, 0.5, 240.0, 360.0);
        push_fixes(&mut short_history, 10, 0.5);
        assert_eq!(derive_health_label(&short_history), HealthLabel::Excellent);

        // With 11 slow fixes the bonus is withheld because no recent speed
        // exceeds 0.1 m/s: 30 + 30 + 15 = 75
        let mut slow = metrics(100.0, 0.08, 240.0, 360.0);
        push_fixes(&mut slow, 11, 0.08);
        assert_eq!(derive_health_label(&slow), HealthLabel::Good);
    }

    #[test]
    fn test_label_bracket_boundaries() {
        // 30 + 20 + 25 = 75 -> good
        let m = metrics(100.0, 0.5, 90.0, 510.0);
        assert_eq!(derive_health_label(&m), HealthLabel::Good);

        // 30 + 10 + 25 = 65 -> fair
        let m = metrics(100.0, 0.5, 30.0, 570.0);
        assert_eq!(derive_health_label(&m), HealthLabel::Fair);

        // 10 + 10 + 25 = 45 -> poor
        let m = metrics(10.0, 0.5, 30.0, 570.0);
        assert_eq!(derive_health_label(&m), HealthLabel::Poor);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let mut m = metrics(100.0, 0.5, 240.0, 360.0);
        push_fixes(&mut m, 12, 0.5);
        let first = derive_health_label(&m);
        let second = derive_health_label(&m);
        assert_eq!(first, second);
    }

    #[test]
    fn test_activity_level_thresholds() {
        assert_eq!(activity_level(0.3), ActivityLevel::High);
        assert_eq!(activity_level(0.2), ActivityLevel::Moderate);
        assert_eq!(activity_level(0.06), ActivityLevel::Moderate);
        assert_eq!(activity_level(0.05), ActivityLevel::Low);
        assert_eq!(activity_level(0.0), ActivityLevel::Low);
    }

    #[test]
    fn test_manual_activity_level_never_low() {
        assert_eq!(manual_activity_level(0.3), ActivityLevel::High);
        assert_eq!(manual_activity_level(0.0), ActivityLevel::Moderate);
    }
}
