//! Great-circle distance between coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GeoError, Result};

/// Mean Earth radius used for every distance computed by the service.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parse a coordinate from the string fields remote services return.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let invalid = || GeoError::InvalidCoordinate {
            latitude: latitude.to_owned(),
            longitude: longitude.to_owned(),
        };
        let lat = latitude.trim().parse::<f64>().map_err(|_| invalid())?;
        let lon = longitude.trim().parse::<f64>().map_err(|_| invalid())?;
        let coordinate = Self::new(lat, lon);
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(invalid())
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Distance to `other` in miles.
    pub fn miles_to(&self, other: Self) -> f64 {
        haversine_miles(*self, other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Haversine great-circle distance in miles.
///
/// Zero for identical points, symmetric, and bounded above by half the
/// circumference (`π × 3959`).
pub fn haversine_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = lat_b - lat_a;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points.
    2.0 * EARTH_RADIUS_MILES * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Latitude/longitude window enclosing every point within a radius of a center.
///
/// Used as a cheap rejection test before the haversine compare; anything
/// outside the box is guaranteed to be outside the radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    center: Coordinate,
    lat_delta: f64,
    lon_delta: f64,
}

impl BoundingBox {
    pub fn around(center: Coordinate, radius_miles: f64) -> Self {
        let angular = (radius_miles.max(0.0) / EARTH_RADIUS_MILES).min(std::f64::consts::PI);
        let lat_delta = angular.to_degrees();

        let max_lat = center.latitude.abs() + lat_delta;
        let cos_lat = center.latitude.to_radians().cos();
        let lon_delta = if max_lat >= 90.0 || angular.sin() >= cos_lat {
            180.0
        } else {
            (angular.sin() / cos_lat).asin().to_degrees()
        };

        Self {
            center,
            // Widen slightly so floating point never rejects a point on the edge.
            lat_delta: lat_delta + 1e-6,
            lon_delta: (lon_delta + 1e-6).min(180.0),
        }
    }

    pub fn min_latitude(&self) -> f64 {
        (self.center.latitude - self.lat_delta).max(-90.0)
    }

    pub fn max_latitude(&self) -> f64 {
        (self.center.latitude + self.lat_delta).min(90.0)
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        if point.latitude < self.min_latitude() || point.latitude > self.max_latitude() {
            return false;
        }
        let lon_diff = (point.longitude - self.center.longitude + 540.0).rem_euclid(360.0) - 180.0;
        lon_diff.abs() <= self.lon_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const AKRON: Coordinate = Coordinate::new(41.0814, -81.5190);
    const CLEVELAND: Coordinate = Coordinate::new(41.4993, -81.6944);
    const LOS_ANGELES: Coordinate = Coordinate::new(34.0522, -118.2437);
    const NEW_YORK: Coordinate = Coordinate::new(40.7128, -74.0060);

    #[rstest]
    #[case(AKRON, CLEVELAND, 30.3)]
    #[case(NEW_YORK, LOS_ANGELES, 2445.7)]
    fn test_known_distances(#[case] a: Coordinate, #[case] b: Coordinate, #[case] expected: f64) {
        let miles = a.miles_to(b);
        assert_eq!(miles, haversine_miles(a, b));
        assert!(
            (miles - expected).abs() < 1.0,
            "expected ~{expected} miles, got {miles}"
        );
    }

    #[test]
    fn test_antipodal_points_hit_upper_bound() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let miles = haversine_miles(a, b);
        assert!((miles - std::f64::consts::PI * EARTH_RADIUS_MILES).abs() < 1e-6);
    }

    #[test]
    fn test_parse_rejects_garbage_and_out_of_range() {
        assert!(Coordinate::parse("41.08", "-81.51").is_ok());
        assert!(Coordinate::parse(" 41.08 ", "-81.51").is_ok());
        assert!(Coordinate::parse("north", "-81.51").is_err());
        assert!(Coordinate::parse("91.0", "0").is_err());
        assert!(Coordinate::parse("0", "-181").is_err());
        assert!(Coordinate::parse("NaN", "0").is_err());
    }

    #[test]
    fn test_bounding_box_near_antimeridian() {
        let fiji = Coordinate::new(-17.7, 179.9);
        let bbox = BoundingBox::around(fiji, 50.0);
        assert!(bbox.contains(Coordinate::new(-17.7, -179.8)));
        assert!(!bbox.contains(Coordinate::new(-17.7, 170.0)));
    }

    #[test]
    fn test_bounding_box_covering_pole() {
        let bbox = BoundingBox::around(Coordinate::new(89.5, 0.0), 100.0);
        assert!(bbox.contains(Coordinate::new(89.5, 180.0)));
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    proptest! {
        #[test]
        fn prop_distance_to_self_is_zero(p in coordinate()) {
            prop_assert_eq!(haversine_miles(p, p), 0.0);
        }

        #[test]
        fn prop_distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = haversine_miles(a, b);
            let ba = haversine_miles(b, a);
            prop_assert!((ab - ba).abs() < 1e-6, "{} != {}", ab, ba);
        }

        #[test]
        fn prop_distance_bounded_by_half_circumference(a in coordinate(), b in coordinate()) {
            let miles = haversine_miles(a, b);
            prop_assert!(miles >= 0.0);
            prop_assert!(miles <= std::f64::consts::PI * EARTH_RADIUS_MILES + 1e-6);
        }

        #[test]
        fn prop_bounding_box_never_rejects_points_in_radius(
            center in coordinate(),
            point in coordinate(),
            radius in 1.0f64..500.0,
        ) {
            if haversine_miles(center, point) <= radius {
                prop_assert!(BoundingBox::around(center, radius).contains(point));
            }
        }
    }
}
