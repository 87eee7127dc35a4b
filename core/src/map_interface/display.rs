use crate::drawing::overlay::OverlayType;
use crate::flight::{Flight, FlightConstants, FlightTimeEstimate};
use crate::geometry::{to_fixed, to_url_value, LatLng};
use serde::{Deserialize, Serialize};

/// Flight record together with the timings derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightReadout {
    pub flight: Flight,
    pub estimate: FlightTimeEstimate,
}

/// Read-only output fields of the planner.
pub trait FlightDisplay: Send {
    fn show_flight(&mut self, readout: &FlightReadout);
    fn show_constants(&mut self, constants: &FlightConstants);
    fn show_landing(&mut self, position: &LatLng);
    fn show_shape_type(&mut self, kind: OverlayType);
}

/// Formatted field values, as a front end would display them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadoutBoard {
    pub perimeter: String,
    pub area: String,
    pub radius: String,
    pub num_laps: String,
    pub time_per_lap: String,
    pub time_total: String,
    pub drone_speed: String,
    pub imagery_height: String,
    pub landing_location: String,
    /// Type of the active shape; front ends show the radius input for circles only.
    pub data_shape: Option<OverlayType>,
}

impl ReadoutBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn radius_input_visible(&self) -> bool {
        self.data_shape == Some(OverlayType::Circle)
    }
}

impl FlightDisplay for ReadoutBoard {
    fn show_flight(&mut self, readout: &FlightReadout) {
        let flight = &readout.flight;
        let estimate = &readout.estimate;
        self.perimeter = to_fixed(flight.perimeter, 0);
        self.area = to_fixed(flight.area, 0);
        self.radius = to_fixed(flight.radius, 0);
        self.num_laps = to_fixed(estimate.num_laps, 0);
        self.time_per_lap = to_fixed(estimate.time_per_lap, 0);
        self.time_total = to_fixed(estimate.time_total, 0);
    }

    fn show_constants(&mut self, constants: &FlightConstants) {
        self.drone_speed = to_fixed(constants.drone_speed, 1);
        self.imagery_height = to_fixed(constants.imagery_height, 0);
    }

    fn show_landing(&mut self, position: &LatLng) {
        self.landing_location = to_url_value(position, 4);
    }

    fn show_shape_type(&mut self, kind: OverlayType) {
        self.data_shape = Some(kind);
    }
}
