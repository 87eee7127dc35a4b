//! Great-circle routines on a spherical earth.
//!
//! Distances and areas use the WGS84 equatorial radius as the sphere radius,
//! which keeps results consistent with common web-map tooling.

use super::latlng::LatLng;
use geo::{ChamberlainDuquetteArea, Coord, Polygon};

/// Sphere radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Central angle between two points in radians (haversine).
fn central_angle(from: &LatLng, to: &LatLng) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = lat2 - lat1;
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    2.0 * a.sqrt().asin()
}

/// Great-circle distance between two points in meters.
pub fn compute_distance_between(from: &LatLng, to: &LatLng) -> f64 {
    central_angle(from, to) * EARTH_RADIUS_M
}

/// Length of an open path in meters. Paths with fewer than two points have zero length.
pub fn compute_length(path: &[LatLng]) -> f64 {
    path.windows(2)
        .map(|pair| compute_distance_between(&pair[0], &pair[1]))
        .sum()
}

/// Length of the ring formed by `path` plus its closing edge.
pub fn compute_closed_length(path: &[LatLng]) -> f64 {
    match (path.first(), path.last()) {
        (Some(first), Some(last)) if path.len() > 2 => {
            compute_length(path) + compute_distance_between(last, first)
        }
        _ => compute_length(path),
    }
}

fn ring(path: &[LatLng]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = path
        .iter()
        .map(|point| Coord {
            x: point.lng,
            y: point.lat,
        })
        .collect();
    Polygon::new(coords.into(), vec![])
}

/// Signed spherical area of a closed ring in square meters. Counter-clockwise rings are positive.
///
/// Uses the Chamberlain-Duquette polar-triangle sum on the equatorial-radius sphere.
pub fn compute_signed_area(path: &[LatLng]) -> f64 {
    if path.len() < 3 {
        return 0.0;
    }
    ring(path).chamberlain_duquette_signed_area()
}

/// Unsigned spherical area of a closed ring in square meters.
pub fn compute_area(path: &[LatLng]) -> f64 {
    if path.len() < 3 {
        return 0.0;
    }
    ring(path).chamberlain_duquette_unsigned_area()
}

/// Point reached by travelling `distance` meters from `from` along `heading` degrees clockwise from north.
pub fn compute_offset(from: &LatLng, distance: f64, heading: f64) -> LatLng {
    let angular = distance / EARTH_RADIUS_M;
    let heading = heading.to_radians();
    let lat = from.lat.to_radians();
    let lng = from.lng.to_radians();

    let cos_angular = angular.cos();
    let sin_angular = angular.sin();
    let sin_lat = lat.sin();
    let cos_lat = lat.cos();

    let sin_target_lat = cos_angular * sin_lat + sin_angular * cos_lat * heading.cos();
    let target_lng = (sin_angular * cos_lat * heading.sin())
        .atan2(cos_angular - sin_lat * sin_target_lat);

    LatLng::new(
        sin_target_lat.asin().to_degrees(),
        (lng + target_lng).to_degrees(),
    )
}
