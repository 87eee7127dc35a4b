pub mod format;
pub mod latlng;
pub mod spherical;

pub use format::{parse_float, to_fixed, to_url_value};
pub use latlng::{LatLng, LatLngBounds};
pub use spherical::{
    compute_area, compute_closed_length, compute_distance_between, compute_length,
    compute_offset, compute_signed_area, EARTH_RADIUS_M,
};
