use dronecore::drawing::OverlayGeometry;
use dronecore::geometry::{compute_offset, LatLng, LatLngBounds};

/// Rectangle of the given ground size centred on `center`.
pub fn rectangle_template(center: LatLng, width_m: f64, height_m: f64) -> OverlayGeometry {
    let north = compute_offset(&center, height_m / 2.0, 0.0);
    let east = compute_offset(&center, width_m / 2.0, 90.0);
    let south = compute_offset(&center, height_m / 2.0, 180.0);
    let west = compute_offset(&center, width_m / 2.0, 270.0);
    OverlayGeometry::Rectangle {
        bounds: LatLngBounds::new(
            LatLng::new(south.lat, west.lng),
            LatLng::new(north.lat, east.lng),
        ),
    }
}
