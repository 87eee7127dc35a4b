use crate::drawing::overlay::{OverlayId, OverlayType};
use crate::flight::estimator::FlightConstants;
use crate::geometry::LatLng;
use crate::map_interface::geocoder::GeocodeStatus;
use serde::{Deserialize, Serialize};

/// Startup configuration for a survey session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub center: LatLng,
    pub zoom: u8,
    /// Raw contents of the height input at startup.
    pub initial_height: String,
    pub constants: FlightConstants,
    /// Offers the landing-marker tool alongside the shape tools.
    pub marker_support: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            center: LatLng::new(37.792, -122.403),
            zoom: 17,
            initial_height: "0".to_string(),
            constants: FlightConstants::default(),
            marker_support: true,
        }
    }
}

/// Common error type for planner operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("Geocoding failed: {0}")]
    Geocode(GeocodeStatus),
    #[error("drawing tool {0} is not available")]
    ToolUnavailable(OverlayType),
    #[error("no drawing tool is selected")]
    NotDrawing,
    #[error("expected a {expected} overlay, got {found}")]
    ToolMismatch {
        expected: OverlayType,
        found: OverlayType,
    },
    #[error("invalid edit: {0}")]
    InvalidEdit(String),
    #[error("unknown overlay {0}")]
    UnknownOverlay(OverlayId),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
