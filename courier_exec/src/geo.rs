//! # Great-circle navigation maths
//!
//! Pure functions over WGS-ish spherical coordinates: haversine distance,
//! initial bearing and destination-point projection. All angles at the API
//! boundary are degrees, all distances meters. The Earth is modelled as a
//! sphere of radius 6 371 000 m, which is accurate to well under 0.5% over
//! the few-kilometre legs a delivery robot flies.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Mean Earth radius.
///
/// Units: meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A geodetic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude, positive north.
    ///
    /// Units: degrees
    pub lat_deg: f64,

    /// Longitude, positive east.
    ///
    /// Units: degrees
    pub lon_deg: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Haversine distance between two positions.
///
/// Symmetric, and zero (to floating tolerance) iff `a == b`.
///
/// Units: meters
pub fn distance_m(a: LatLon, b: LatLon) -> f64 {
    let lat_a = a.lat_deg.to_radians();
    let lat_b = b.lat_deg.to_radians();
    let delta_lat = (b.lat_deg - a.lat_deg).to_radians();
    let delta_lon = (b.lon_deg - a.lon_deg).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial bearing from `a` towards `b`.
///
/// Undefined when `a == b`, in which case 0.0 is returned.
///
/// Units: degrees in [0, 360)
pub fn bearing_deg(a: LatLon, b: LatLon) -> f64 {
    let lat_a = a.lat_deg.to_radians();
    let lat_b = b.lat_deg.to_radians();
    let delta_lon = (b.lon_deg - a.lon_deg).to_radians();

    let x = delta_lon.sin() * lat_b.cos();
    let y = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * delta_lon.cos();

    let bearing = x.atan2(y).to_degrees();

    (bearing + 360.0) % 360.0
}

/// Project a destination point from `origin` along `bearing_deg` for
/// `distance_m` over the great circle.
///
/// For distances much smaller than the Earth's radius,
/// `distance_m(origin, project(origin, b, d)) ≈ d`.
pub fn project(origin: LatLon, bearing_deg: f64, distance_m: f64) -> LatLon {
    let lat = origin.lat_deg.to_radians();
    let lon = origin.lon_deg.to_radians();
    let bearing = bearing_deg.to_radians();
    let angular = distance_m / EARTH_RADIUS_M;

    let new_lat =
        (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos()).asin();

    let new_lon = lon
        + (bearing.sin() * angular.sin() * lat.cos())
            .atan2(angular.cos() - lat.sin() * new_lat.sin());

    LatLon {
        lat_deg: new_lat.to_degrees(),
        lon_deg: new_lon.to_degrees(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_distance_symmetric_and_zero() {
        let a = LatLon { lat_deg: 50.0, lon_deg: 36.0 };
        let b = LatLon { lat_deg: 50.1, lon_deg: 36.2 };

        assert!((distance_m(a, b) - distance_m(b, a)).abs() < 1e-9);
        assert!(distance_m(a, a).abs() < 1e-9);
    }

    #[test]
    fn test_distance_one_degree_longitude() {
        // One degree of longitude at 50N is roughly 71.5 km
        let a = LatLon { lat_deg: 50.0, lon_deg: 36.0 };
        let b = LatLon { lat_deg: 50.0, lon_deg: 37.0 };

        let d = distance_m(a, b);
        assert!(d > 71_000.0 && d < 72_000.0, "got {}", d);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = LatLon { lat_deg: 50.0, lon_deg: 36.0 };

        let north = LatLon { lat_deg: 50.1, lon_deg: 36.0 };
        let east = LatLon { lat_deg: 50.0, lon_deg: 36.1 };
        let south = LatLon { lat_deg: 49.9, lon_deg: 36.0 };

        assert!(bearing_deg(origin, north).abs() < 1e-6);
        assert!((bearing_deg(origin, east) - 90.0).abs() < 0.1);
        assert!((bearing_deg(origin, south) - 180.0).abs() < 1e-6);

        // Degenerate case
        assert_eq!(bearing_deg(origin, origin), 0.0);
    }

    #[test]
    fn test_project_round_trip() {
        // distance(p, project(p, b, d)) must agree with d to 0.5% for short legs
        let origin = LatLon { lat_deg: 50.0, lon_deg: 36.0 };

        for &d in &[10.0, 250.0, 1_000.0, 9_999.0] {
            for &b in &[0.0, 45.0, 133.7, 270.0] {
                let dest = project(origin, b, d);
                let round_trip = distance_m(origin, dest);
                assert!(
                    (round_trip - d).abs() / d < 0.005,
                    "bearing {} dist {} gave {}",
                    b,
                    d,
                    round_trip
                );
            }
        }
    }

    #[test]
    fn test_project_matches_bearing() {
        let origin = LatLon { lat_deg: 50.0, lon_deg: 36.0 };
        let dest = project(origin, 60.0, 500.0);

        assert!((bearing_deg(origin, dest) - 60.0).abs() < 0.1);
    }
}
