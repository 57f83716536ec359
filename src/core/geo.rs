//! Great-circle distance on a spherical Earth.

use crate::models::position::GeoPoint;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in metres between two decimal-degree coordinates.
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // clamp: rounding can push `a` a hair above 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

pub fn distance_between(a: GeoPoint, b: GeoPoint) -> f64 {
    distance_meters(a.lat, a.lng, b.lat, b.lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let d = distance_meters(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111_195.0).abs() < 200.0);
    }

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(distance_meters(30.555, 114.333, 30.555, 114.333), 0.0);
        assert_eq!(distance_meters(-89.9, 179.9, -89.9, 179.9), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pts = [
            (30.555, 114.333),
            (1.55, 55.33),
            (-33.8688, 151.2093),
            (51.5074, -0.1278),
            (0.0, 180.0),
            (90.0, 0.0),
        ];
        for &(la1, ln1) in &pts {
            for &(la2, ln2) in &pts {
                let ab = distance_meters(la1, ln1, la2, ln2);
                let ba = distance_meters(la2, ln2, la1, ln1);
                assert!((ab - ba).abs() < 1e-6, "{ab} != {ba}");
            }
        }
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = distance_meters(0.0, 0.0, 0.0, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - half).abs() < 1.0);
    }
}
