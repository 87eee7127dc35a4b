use dronecore::drawing::{DrawingState, Overlay};
use dronecore::flight::{Flight, FlightTimeEstimate};
use dronecore::geometry::LatLng;
use dronecore::map_interface::{MapHost, MapView, ReadoutBoard};
use dronecore::telemetry::MetricsSnapshot;
use dronecore::SurveySession;
use serde::{Deserialize, Serialize};

/// Everything a remote front end needs to redraw the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightModel {
    pub board: ReadoutBoard,
    pub flight: Flight,
    pub estimate: FlightTimeEstimate,
    pub state: DrawingState,
    pub center: LatLng,
    pub zoom: u8,
    pub overlays: Vec<Overlay>,
    pub metrics: MetricsSnapshot,
}

impl FlightModel {
    pub fn capture(session: &SurveySession<MapView>, board: ReadoutBoard) -> Self {
        let map = session.map();
        Self {
            board,
            flight: session.flight(),
            estimate: session.estimate(),
            state: session.state(),
            center: map.center(),
            zoom: map.zoom(),
            overlays: map.overlays().to_vec(),
            metrics: session.metrics(),
        }
    }
}
