//! Converts the live shape into the numbers the flight model needs.

use crate::drawing::overlay::{OverlayGeometry, Shape};
use crate::geometry::{compute_area, compute_closed_length, compute_length, LatLng, LatLngBounds};
use std::f64::consts::PI;

/// Closed corner ring of a rectangle: south-west, north-west, north-east, south-east.
pub fn bounds_to_path(bounds: &LatLngBounds) -> Vec<LatLng> {
    vec![
        bounds.south_west,
        bounds.north_west(),
        bounds.north_east,
        bounds.south_east(),
    ]
}

/// Perimeter in meters. A rectangle is measured around its closed corner ring;
/// a polygon along its vertex path as drawn, without the closing edge.
pub fn perimeter(shape: &Shape) -> f64 {
    match shape.overlay().geometry() {
        OverlayGeometry::Circle { radius, .. } => 2.0 * PI * radius,
        OverlayGeometry::Rectangle { bounds } => compute_closed_length(&bounds_to_path(bounds)),
        OverlayGeometry::Polygon { path } => compute_length(path),
        OverlayGeometry::Marker { .. } => 0.0,
    }
}

/// Area in square meters.
pub fn area(shape: &Shape) -> f64 {
    match shape.overlay().geometry() {
        OverlayGeometry::Circle { radius, .. } => PI * radius * radius,
        OverlayGeometry::Rectangle { bounds } => compute_area(&bounds_to_path(bounds)),
        OverlayGeometry::Polygon { path } => compute_area(path),
        OverlayGeometry::Marker { .. } => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::overlay::{Overlay, OverlayId};
    use crate::geometry::compute_distance_between;

    fn shape(geometry: OverlayGeometry) -> Shape {
        Shape::new(Overlay::new(OverlayId(0), geometry)).unwrap()
    }

    #[test]
    fn circle_measures_are_planar_regardless_of_latitude() {
        for lat in [0.0, 45.0, 80.0] {
            let circle = shape(OverlayGeometry::Circle {
                center: LatLng::new(lat, 10.0),
                radius: 20.0,
            });
            assert!((perimeter(&circle) - 2.0 * PI * 20.0).abs() < 1e-9);
            assert!((area(&circle) - PI * 400.0).abs() < 1e-9);
        }
    }

    #[test]
    fn bounds_to_path_orders_corners() {
        let sw = LatLng::new(37.79, -122.41);
        let ne = LatLng::new(37.80, -122.40);
        let path = bounds_to_path(&LatLngBounds::new(sw, ne));
        assert_eq!(
            path,
            vec![
                sw,
                LatLng::new(37.80, -122.41),
                ne,
                LatLng::new(37.79, -122.40)
            ]
        );
    }

    #[test]
    fn rectangle_perimeter_includes_all_four_sides() {
        let bounds = LatLngBounds::new(LatLng::new(0.0, 0.0), LatLng::new(0.001, 0.002));
        let rectangle = shape(OverlayGeometry::Rectangle { bounds });
        let corners = bounds_to_path(&bounds);
        let expected = compute_distance_between(&corners[0], &corners[1])
            + compute_distance_between(&corners[1], &corners[2])
            + compute_distance_between(&corners[2], &corners[3])
            + compute_distance_between(&corners[3], &corners[0]);
        assert!((perimeter(&rectangle) - expected).abs() < 1e-9);
        assert!(area(&rectangle) > 0.0);
    }

    #[test]
    fn polygon_perimeter_follows_vertex_path_without_closing_edge() {
        let path = vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 0.001),
            LatLng::new(0.001, 0.001),
        ];
        let legs = compute_distance_between(&path[0], &path[1])
            + compute_distance_between(&path[1], &path[2]);
        let polygon = shape(OverlayGeometry::Polygon { path });
        assert!((perimeter(&polygon) - legs).abs() < 1e-9);
        assert!((perimeter(&polygon) - 222.639).abs() < 1e-2);
    }

    #[test]
    fn rectangle_ring_exceeds_matching_polygon_by_closing_side() {
        let bounds = LatLngBounds::new(LatLng::new(37.79, -122.41), LatLng::new(37.7905, -122.409));
        let corners = bounds_to_path(&bounds);
        let closing = compute_distance_between(&corners[3], &corners[0]);
        let rectangle = shape(OverlayGeometry::Rectangle { bounds });
        let polygon = shape(OverlayGeometry::Polygon { path: corners });
        assert!((perimeter(&rectangle) - perimeter(&polygon) - closing).abs() < 1e-9);
        assert!((area(&rectangle) - area(&polygon)).abs() < 1e-9);
    }

    #[test]
    fn two_vertex_polygon_has_single_leg_and_no_area() {
        let path = vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.001)];
        let leg = compute_distance_between(&path[0], &path[1]);
        let polygon = shape(OverlayGeometry::Polygon { path });
        assert!((perimeter(&polygon) - leg).abs() < 1e-9);
        assert_eq!(area(&polygon), 0.0);
    }
}
