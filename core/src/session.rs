//! A planning session: one map, one flight record, one live shape.

use crate::drawing::{
    Completion, DrawingController, DrawingState, EditOutcome, OverlayEdit, OverlayGeometry,
    OverlayId, OverlayType, SharedDisplay,
};
use crate::flight::{estimate, Flight, FlightConstants, FlightField, FlightState, FlightTimeEstimate};
use crate::geometry::{parse_float, LatLng};
use crate::map_interface::{FlightReadout, GeocodeOutcome, Geocoder, MapHost, MapView};
use crate::prelude::{PlannerResult, SessionOptions};
use crate::search::SearchController;
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use std::sync::Arc;

fn readout(flight: &Flight, constants: &FlightConstants) -> FlightReadout {
    FlightReadout {
        flight: *flight,
        estimate: estimate(flight.perimeter, flight.height, constants),
    }
}

pub struct SurveySession<M: MapHost> {
    map: M,
    flight: FlightState,
    drawing: DrawingController,
    search: SearchController,
    constants: FlightConstants,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl SurveySession<MapView> {
    /// Session over an in-memory map centred as configured.
    pub fn with_map_view(options: &SessionOptions, display: SharedDisplay) -> Self {
        Self::new(MapView::new(options.center, options.zoom), options, display)
    }
}

impl<M: MapHost> SurveySession<M> {
    pub fn new(map: M, options: &SessionOptions, display: SharedDisplay) -> Self {
        let metrics = Arc::new(MetricsRecorder::new());
        let constants = options.constants;
        let logger = LogManager::new("session");

        let mut flight = FlightState::new();
        flight.set(FlightField::Height, parse_float(&options.initial_height));
        for field in FlightField::ALL {
            let display = display.clone();
            flight.subscribe(field, move |_, snapshot| {
                let readout = readout(snapshot, &constants);
                if let Ok(mut display) = display.lock() {
                    display.show_flight(&readout);
                }
            });
        }

        let drawing =
            DrawingController::new(options.marker_support, display.clone(), metrics.clone());
        let search = SearchController::new(metrics.clone());

        if let Ok(mut display) = display.lock() {
            display.show_constants(&constants);
        }
        logger.record(&format!(
            "session ready at {},{} zoom {}",
            map.center().lat,
            map.center().lng,
            map.zoom()
        ));

        Self {
            map,
            flight,
            drawing,
            search,
            constants,
            metrics,
            logger,
        }
    }

    pub fn select_tool(&mut self, tool: Option<OverlayType>) -> PlannerResult<()> {
        self.drawing.select_tool(tool, &mut self.map)
    }

    pub fn complete_overlay(&mut self, geometry: OverlayGeometry) -> PlannerResult<Completion> {
        self.drawing
            .complete_overlay(geometry, &mut self.map, &mut self.flight)
    }

    /// Selects the matching tool and completes the drawing in one step.
    pub fn draw(&mut self, geometry: OverlayGeometry) -> PlannerResult<Completion> {
        self.select_tool(Some(geometry.kind()))?;
        self.complete_overlay(geometry)
    }

    pub fn edit(&mut self, id: OverlayId, edit: &OverlayEdit) -> PlannerResult<EditOutcome> {
        self.drawing
            .edit(id, edit, &mut self.map, &mut self.flight)
    }

    /// Height input changed. Unparsable text becomes NaN.
    pub fn set_height_input(&mut self, raw: &str) {
        self.set_height(parse_float(raw));
    }

    pub fn set_height(&mut self, height: f64) {
        self.logger.detail(&format!("height {}", height));
        self.flight.set(FlightField::Height, height);
    }

    /// Radius input changed. Unparsable text becomes NaN.
    pub fn set_radius_input(&mut self, raw: &str) -> PlannerResult<()> {
        self.set_radius(parse_float(raw))
    }

    pub fn set_radius(&mut self, radius: f64) -> PlannerResult<()> {
        self.drawing
            .set_radius(radius, &mut self.map, &mut self.flight)
    }

    pub fn search(&mut self, query: &str, geocoder: &dyn Geocoder) -> PlannerResult<LatLng> {
        self.search.search(query, geocoder, &mut self.map)
    }

    pub fn apply_geocode(&mut self, outcome: GeocodeOutcome) -> PlannerResult<LatLng> {
        self.search.apply(outcome, &mut self.map)
    }

    pub fn flight(&self) -> Flight {
        self.flight.snapshot()
    }

    pub fn estimate(&self) -> FlightTimeEstimate {
        self.readout().estimate
    }

    pub fn readout(&self) -> FlightReadout {
        readout(&self.flight.snapshot(), &self.constants)
    }

    pub fn constants(&self) -> &FlightConstants {
        &self.constants
    }

    pub fn state(&self) -> DrawingState {
        self.drawing.state()
    }

    pub fn drawing(&self) -> &DrawingController {
        &self.drawing
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LatLngBounds;
    use crate::map_interface::{GazetteerEntry, GazetteerGeocoder, GeocodeStatus, ReadoutBoard};
    use crate::prelude::PlannerError;
    use std::f64::consts::PI;
    use std::sync::Mutex;

    fn session(height: &str) -> (SurveySession<MapView>, Arc<Mutex<ReadoutBoard>>) {
        let board = Arc::new(Mutex::new(ReadoutBoard::new()));
        let options = SessionOptions {
            initial_height: height.to_string(),
            ..Default::default()
        };
        let display: SharedDisplay = board.clone();
        (SurveySession::with_map_view(&options, display), board)
    }

    #[test]
    fn startup_reads_height_and_renders_constants() {
        let (session, board) = session("12");
        assert_eq!(session.flight().height, 12.0);
        assert_eq!(session.flight().perimeter, 0.0);

        let board = board.lock().unwrap();
        assert_eq!(board.drone_speed, "6.7");
        assert_eq!(board.imagery_height, "5");
        assert_eq!(board.perimeter, "");
    }

    #[test]
    fn circle_drives_readout() {
        let (mut session, board) = session("12");
        session
            .draw(OverlayGeometry::Circle {
                center: LatLng::new(37.792, -122.403),
                radius: 100.0 / (2.0 * PI),
            })
            .unwrap();

        let estimate = session.estimate();
        assert_eq!(estimate.num_laps, 3.0);
        assert!((estimate.time_per_lap - 105.0 / 6.7056).abs() < 1e-9);
        assert!((estimate.time_total - 3.0 * 105.0 / 6.7056).abs() < 1e-9);

        let board = board.lock().unwrap();
        assert_eq!(board.perimeter, "100");
        assert_eq!(board.radius, "16");
        assert_eq!(board.num_laps, "3");
        assert_eq!(board.time_per_lap, "16");
        assert_eq!(board.time_total, "47");
        assert!(board.radius_input_visible());
    }

    #[test]
    fn height_changes_rerender_laps() {
        let (mut session, board) = session("0");
        session.set_height_input("23");
        assert_eq!(board.lock().unwrap().num_laps, "5");

        session.set_height_input("tall");
        assert!(session.flight().height.is_nan());
        assert_eq!(board.lock().unwrap().num_laps, "NaN");
        assert_eq!(board.lock().unwrap().time_total, "NaN");
    }

    #[test]
    fn radius_input_resizes_circle() {
        let (mut session, _) = session("10");
        let drawn = session
            .draw(OverlayGeometry::Circle {
                center: LatLng::new(37.792, -122.403),
                radius: 5.0,
            })
            .unwrap();

        session.set_radius_input("8").unwrap();

        let overlay = session.map().overlay(drawn.id).unwrap();
        assert_eq!(overlay.radius(), Some(8.0));
        assert!((session.flight().area - 64.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn shape_replacement_leaves_one_overlay() {
        let (mut session, board) = session("10");
        session
            .draw(OverlayGeometry::Circle {
                center: LatLng::new(37.792, -122.403),
                radius: 5.0,
            })
            .unwrap();
        session
            .draw(OverlayGeometry::Rectangle {
                bounds: LatLngBounds::new(
                    LatLng::new(37.7918, -122.4032),
                    LatLng::new(37.7922, -122.4028),
                ),
            })
            .unwrap();

        assert_eq!(session.map().overlay_count(), 1);
        assert_eq!(session.state(), DrawingState::HasShape);
        assert!(!board.lock().unwrap().radius_input_visible());
        assert!(session.flight().area > 0.0);
    }

    #[test]
    fn failed_search_keeps_center() {
        let (mut session, _) = session("10");
        let before = session.map().center();
        let geocoder = GazetteerGeocoder::new(vec![GazetteerEntry {
            name: "Coit Tower".into(),
            location: LatLng::new(37.8024, -122.4058),
        }]);

        let error = session.search("atlantis", &geocoder).unwrap_err();
        assert_eq!(error, PlannerError::Geocode(GeocodeStatus::ZeroResults));
        assert_eq!(session.map().center(), before);

        let center = session.search("coit", &geocoder).unwrap();
        assert_eq!(session.map().center(), center);

        let error = session
            .apply_geocode(Err(GeocodeStatus::OverQueryLimit))
            .unwrap_err();
        assert_eq!(error.to_string(), "Geocoding failed: OVER_QUERY_LIMIT");
        assert_eq!(session.map().center(), center);
        assert_eq!(session.metrics().geocode_failures, 2);
    }
}
