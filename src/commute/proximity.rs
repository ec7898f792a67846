//! Bounding-box prefilter for "nearby" searches
//!
//! The box is a cheap, conservative superset of the radius disc: it is meant
//! to scope a storage scan, after which candidates are ranked with
//! [`compute_distance`](super::compute_distance).

use serde::{Deserialize, Serialize};

use super::EARTH_RADIUS_MILES;
use crate::models::Coordinate;

/// Approximate miles per degree of latitude
pub const MILES_PER_DEGREE: f64 = 69.0;

/// Floor for `cos(latitude)` so the longitude span stays finite at the poles
const MIN_COS_LATITUDE: f64 = 1e-6;

/// Widest longitude half-span a box can have; anything wider covers the globe
const MAX_LNG_SPAN: f64 = 180.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Whether a coordinate lies inside the box, edges included.
    ///
    /// Boxes crossing the antimeridian extend past ±180; a point on the
    /// other side is compared after shifting it by a full turn.
    #[must_use]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        if coordinate.latitude < self.min_lat || coordinate.latitude > self.max_lat {
            return false;
        }

        let lng = coordinate.longitude;
        [lng, lng - 360.0, lng + 360.0]
            .iter()
            .any(|l| *l >= self.min_lng && *l <= self.max_lng)
    }
}

/// Box around `center` that contains every point within `radius_miles`.
///
/// The longitude span is `radius / (69 * cos(lat))`, widened to the exact
/// spherical half-span where that is larger (high latitudes, large radii).
/// A disc that reaches a pole covers every longitude. Negative radii are
/// treated as zero.
#[must_use]
pub fn bounding_box(center: &Coordinate, radius_miles: f64) -> BoundingBox {
    let radius_miles = radius_miles.max(0.0);

    let lat_degree = radius_miles / MILES_PER_DEGREE;
    let cos_lat = center.latitude.to_radians().cos().abs().max(MIN_COS_LATITUDE);
    let approx = radius_miles / (MILES_PER_DEGREE * cos_lat);
    let lng_degree = approx.max(spherical_lng_span(radius_miles, cos_lat)).min(MAX_LNG_SPAN);

    BoundingBox {
        min_lat: center.latitude - lat_degree,
        max_lat: center.latitude + lat_degree,
        min_lng: center.longitude - lng_degree,
        max_lng: center.longitude + lng_degree,
    }
}

/// Largest longitude offset of any point on the radius circle, in degrees
fn spherical_lng_span(radius_miles: f64, cos_lat: f64) -> f64 {
    let angular = radius_miles / EARTH_RADIUS_MILES;
    if angular >= std::f64::consts::FRAC_PI_2 {
        return MAX_LNG_SPAN;
    }

    let ratio = angular.sin() / cos_lat;
    if ratio >= 1.0 {
        // the disc contains the pole
        MAX_LNG_SPAN
    } else {
        ratio.asin().to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commute::{EARTH_RADIUS_MILES, compute_distance};
    use rstest::rstest;

    /// Point `miles` due north of `center` on the sphere
    fn due_north(center: &Coordinate, miles: f64) -> Coordinate {
        let degrees = (miles / EARTH_RADIUS_MILES).to_degrees();
        Coordinate::new(center.latitude + degrees, center.longitude)
    }

    #[test]
    fn test_box_matches_degree_approximation() {
        let center = Coordinate::new(40.7128, -74.0060);
        let bbox = bounding_box(&center, 10.0);

        let lat_degree = 10.0 / 69.0;
        let lng_degree = 10.0 / (69.0 * 40.7128_f64.to_radians().cos());
        assert!((bbox.min_lat - (center.latitude - lat_degree)).abs() < 1e-12);
        assert!((bbox.max_lat - (center.latitude + lat_degree)).abs() < 1e-12);
        assert!((bbox.min_lng - (center.longitude - lng_degree)).abs() < 1e-12);
        assert!((bbox.max_lng - (center.longitude + lng_degree)).abs() < 1e-12);
    }

    #[rstest]
    #[case(Coordinate::new(40.7128, -74.0060), 10.0)]
    #[case(Coordinate::new(0.0, 0.0), 1.0)]
    #[case(Coordinate::new(-33.8688, 151.2093), 50.0)]
    #[case(Coordinate::new(64.1466, -21.9426), 250.0)]
    fn test_due_north_point_is_inside(#[case] center: Coordinate, #[case] radius: f64) {
        let bbox = bounding_box(&center, radius);
        let north = due_north(&center, radius);

        assert!((compute_distance(&center, &north) - radius).abs() < 1e-6);
        assert!(north.latitude >= bbox.min_lat && north.latitude <= bbox.max_lat);
        assert!(bbox.contains(&north));
    }

    #[rstest]
    #[case(47.6062, -122.3321, 25.0)]
    #[case(80.0, 15.0, 100.0)]
    #[case(70.0, 25.0, 200.0)]
    #[case(85.0, -40.0, 50.0)]
    #[case(60.0, 10.0, 300.0)]
    #[case(-75.0, 170.0, 150.0)]
    fn test_box_contains_radius_disc(#[case] lat: f64, #[case] lng: f64, #[case] radius: f64) {
        let center = Coordinate::new(lat, lng);
        let bbox = bounding_box(&center, radius);

        // sample points just inside the circle in every direction
        for bearing in (0..360).step_by(5) {
            let bearing = f64::from(bearing).to_radians();
            let angular = (radius * 0.999) / EARTH_RADIUS_MILES;
            let lat1 = center.latitude.to_radians();
            let lng1 = center.longitude.to_radians();
            let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
            let lng2 = lng1
                + (bearing.sin() * angular.sin() * lat1.cos())
                    .atan2(angular.cos() - lat1.sin() * lat2.sin());
            let point = Coordinate::new(lat2.to_degrees(), lng2.to_degrees());

            assert!(compute_distance(&center, &point) <= radius);
            assert!(bbox.contains(&point), "missing point at {point:?}");
        }
    }

    #[test]
    fn test_box_reaching_the_pole_spans_all_longitudes() {
        let bbox = bounding_box(&Coordinate::new(88.0, 0.0), 200.0);
        assert_eq!(bbox.min_lng, -180.0);
        assert_eq!(bbox.max_lng, 180.0);
        assert!(bbox.contains(&Coordinate::new(89.5, 179.0)));
    }

    #[rstest]
    #[case(90.0)]
    #[case(-90.0)]
    #[case(89.999_999)]
    fn test_polar_box_is_finite(#[case] latitude: f64) {
        let bbox = bounding_box(&Coordinate::new(latitude, 10.0), 5.0);
        assert!(bbox.min_lng.is_finite() && bbox.max_lng.is_finite());
        assert!(bbox.max_lng - bbox.min_lng <= 360.0);
        assert!(bbox.contains(&Coordinate::new(latitude, -170.0)));
    }

    #[test]
    fn test_zero_and_negative_radius() {
        let center = Coordinate::new(40.0, -74.0);
        let bbox = bounding_box(&center, 0.0);
        assert!(bbox.contains(&center));
        assert!(!bbox.contains(&Coordinate::new(40.001, -74.0)));

        assert_eq!(bounding_box(&center, -5.0), bbox);
    }

    #[test]
    fn test_box_across_antimeridian() {
        let center = Coordinate::new(-17.7134, 179.95);
        let bbox = bounding_box(&center, 20.0);
        assert!(bbox.max_lng > 180.0);
        assert!(bbox.contains(&Coordinate::new(-17.7134, -179.9)));
        assert!(!bbox.contains(&Coordinate::new(-17.7134, -170.0)));
    }
}
