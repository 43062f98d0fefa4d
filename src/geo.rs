//! Distance and speed primitives
//!
//! Great-circle distance via the Haversine formula plus the guarded speed
//! helper used by the activity tracker. Both are pure; non-finite inputs
//! propagate through unguarded.

/// Earth radius used by the Haversine formula (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points given in signed degrees.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Instantaneous speed in m/s over a step.
///
/// Returns 0 when `elapsed_secs <= 0`, which covers both duplicate and
/// out-of-order timestamps without signaling an error.
pub fn speed_mps(distance_m: f64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    distance_m / elapsed_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_zero_for_identical_points() {
        assert_eq!(distance_meters(48.8566, 2.3522, 48.8566, 2.3522), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric_and_non_negative() {
        let cases = [
            (0.0, 0.0, 10.0, 10.0),
            (-33.8688, 151.2093, 51.5074, -0.1278),
            (89.9, 0.0, -89.9, 180.0),
        ];
        for (lat1, lon1, lat2, lon2) in cases {
            let forward = distance_meters(lat1, lon1, lat2, lon2);
            let backward = distance_meters(lat2, lon2, lat1, lon1);
            assert!(forward >= 0.0);
            assert!((forward - backward).abs() < 1e-6);
        }
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        // One degree of longitude at the equator is ~111,195 m
        let d = distance_meters(0.0, 0.0, 0.0, 1.0);
        let expected = 111_195.0;
        assert!((d - expected).abs() / expected < 0.01, "got {d}");
    }

    #[test]
    fn test_nan_propagates() {
        assert!(distance_meters(f64::NAN, 0.0, 0.0, 1.0).is_nan());
    }

    #[test]
    fn test_speed_guards_non_positive_elapsed() {
        assert_eq!(speed_mps(100.0, 0.0), 0.0);
        assert_eq!(speed_mps(100.0, -5.0), 0.0);
    }

    #[test]
    fn test_speed() {
        assert_eq!(speed_mps(30.0, 15.0), 2.0);
    }
}
