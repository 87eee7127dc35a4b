use crate::drawing::adapter;
use crate::drawing::overlay::{
    EditSignal, Overlay, OverlayEdit, OverlayGeometry, OverlayId, OverlayType, Shape,
};
use crate::flight::{FlightField, FlightState};
use crate::geometry::LatLng;
use crate::map_interface::{FlightDisplay, MapHost};
use crate::prelude::{PlannerError, PlannerResult};
use crate::telemetry::{LogManager, MetricsRecorder};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Display handle shared between the controller and the flight listeners.
pub type SharedDisplay = Arc<Mutex<dyn FlightDisplay>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "tool", rename_all = "snake_case")]
pub enum DrawingState {
    Idle,
    Drawing(OverlayType),
    HasShape,
}

/// What a completed drawing turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: OverlayId,
    pub kind: OverlayType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    Applied {
        signals: Vec<EditSignal>,
        recomputed: bool,
    },
    /// The overlay was replaced earlier; its edits no longer reach anything.
    Ignored,
}

/// Edit signals each overlay type listens for once installed.
fn listened_signals(kind: OverlayType) -> &'static [EditSignal] {
    match kind {
        OverlayType::Circle => &[EditSignal::CenterChanged, EditSignal::RadiusChanged],
        OverlayType::Rectangle => &[EditSignal::BoundsChanged],
        OverlayType::Polygon => &[
            EditSignal::DragEnd,
            EditSignal::PathInsertAt,
            EditSignal::PathRemoveAt,
            EditSignal::PathSetAt,
        ],
        OverlayType::Marker => &[EditSignal::PositionChanged],
    }
}

/// Owns the drawing tools and the single live shape and marker.
pub struct DrawingController {
    tools: Vec<OverlayType>,
    drawing_mode: Option<OverlayType>,
    shape: Option<Shape>,
    marker: Option<Overlay>,
    /// Flight radius mirrors the live circle while set.
    radius_bound: bool,
    next_id: u64,
    display: SharedDisplay,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl DrawingController {
    pub fn new(marker_support: bool, display: SharedDisplay, metrics: Arc<MetricsRecorder>) -> Self {
        let mut tools = OverlayType::SHAPES.to_vec();
        if marker_support {
            tools.push(OverlayType::Marker);
        }
        Self {
            tools,
            drawing_mode: None,
            shape: None,
            marker: None,
            radius_bound: false,
            next_id: 0,
            display,
            metrics,
            logger: LogManager::new("drawing"),
        }
    }

    pub fn tools(&self) -> &[OverlayType] {
        &self.tools
    }

    pub fn state(&self) -> DrawingState {
        match (self.drawing_mode, &self.shape) {
            (Some(tool), _) => DrawingState::Drawing(tool),
            (None, Some(_)) => DrawingState::HasShape,
            (None, None) => DrawingState::Idle,
        }
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    pub fn marker(&self) -> Option<&Overlay> {
        self.marker.as_ref()
    }

    /// Picks a drawing tool, or leaves drawing mode with `None`.
    pub fn select_tool(
        &mut self,
        tool: Option<OverlayType>,
        map: &mut dyn MapHost,
    ) -> PlannerResult<()> {
        if let Some(kind) = tool {
            if !self.tools.contains(&kind) {
                return Err(PlannerError::ToolUnavailable(kind));
            }
        }
        self.drawing_mode = tool;
        map.set_drawing_mode(tool);
        Ok(())
    }

    /// Turns a finished drawing into the live shape or marker.
    pub fn complete_overlay(
        &mut self,
        geometry: OverlayGeometry,
        map: &mut dyn MapHost,
        flight: &mut FlightState,
    ) -> PlannerResult<Completion> {
        let expected = self.drawing_mode.ok_or(PlannerError::NotDrawing)?;
        let found = geometry.kind();
        if found != expected {
            return Err(PlannerError::ToolMismatch { expected, found });
        }

        self.drawing_mode = None;
        map.set_drawing_mode(None);

        let id = OverlayId(self.next_id);
        self.next_id += 1;
        let overlay = Overlay::new(id, geometry);

        if found == OverlayType::Marker {
            self.install_marker(overlay, map);
        } else {
            self.install_shape(Shape::new(overlay)?, map, flight);
        }
        Ok(Completion { id, kind: found })
    }

    fn install_shape(&mut self, mut shape: Shape, map: &mut dyn MapHost, flight: &mut FlightState) {
        self.remove_shape(map);

        let kind = shape.kind();
        for signal in listened_signals(kind) {
            shape.overlay_mut().add_listener(*signal);
        }
        if let Some(radius) = shape.overlay().radius() {
            self.radius_bound = true;
            flight.set(FlightField::Radius, radius);
        }

        map.attach_overlay(shape.overlay());
        self.logger
            .record(&format!("installed {} {}", kind, shape.overlay().id()));
        self.shape = Some(shape);

        self.recompute(flight);
        if let Ok(mut display) = self.display.lock() {
            display.show_shape_type(kind);
        }
    }

    fn install_marker(&mut self, mut marker: Overlay, map: &mut dyn MapHost) {
        if let Some(mut old) = self.marker.take() {
            old.clear_listeners();
            map.detach_overlay(old.id());
            self.logger.detail(&format!("removed marker {}", old.id()));
        }

        for signal in listened_signals(OverlayType::Marker) {
            marker.add_listener(*signal);
        }
        map.attach_overlay(&marker);
        self.logger.record(&format!("installed marker {}", marker.id()));

        if let OverlayGeometry::Marker { position } = marker.geometry() {
            self.show_landing(position);
        }
        self.marker = Some(marker);
    }

    fn remove_shape(&mut self, map: &mut dyn MapHost) {
        if let Some(old) = self.shape.take() {
            let mut overlay = old.into_overlay();
            overlay.clear_listeners();
            map.detach_overlay(overlay.id());
            self.logger
                .detail(&format!("removed {} {}", overlay.kind(), overlay.id()));
        }
        self.radius_bound = false;
    }

    /// Applies an edit to the live overlay with `id`.
    pub fn edit(
        &mut self,
        id: OverlayId,
        edit: &OverlayEdit,
        map: &mut dyn MapHost,
        flight: &mut FlightState,
    ) -> PlannerResult<EditOutcome> {
        if let Some(shape) = self.shape.as_mut().filter(|shape| shape.overlay().id() == id) {
            let overlay = shape.overlay_mut();
            let signals = overlay.apply(edit)?;
            map.refresh_overlay(overlay);

            let listened: Vec<EditSignal> = signals
                .iter()
                .copied()
                .filter(|signal| overlay.listens_to(*signal))
                .collect();
            let bound_radius = if self.radius_bound && signals.contains(&EditSignal::RadiusChanged)
            {
                overlay.radius()
            } else {
                None
            };

            if let Some(radius) = bound_radius {
                flight.set(FlightField::Radius, radius);
            }
            for _ in &listened {
                self.recompute(flight);
            }
            return Ok(EditOutcome::Applied {
                signals,
                recomputed: !listened.is_empty(),
            });
        }

        if let Some(marker) = self.marker.as_mut().filter(|marker| marker.id() == id) {
            let signals = marker.apply(edit)?;
            map.refresh_overlay(marker);

            let moved = signals
                .iter()
                .any(|signal| marker.listens_to(*signal) && *signal == EditSignal::PositionChanged);
            let position = match marker.geometry() {
                OverlayGeometry::Marker { position } if moved => Some(*position),
                _ => None,
            };
            if let Some(position) = position {
                self.show_landing(&position);
            }
            return Ok(EditOutcome::Applied {
                signals,
                recomputed: false,
            });
        }

        if id.0 < self.next_id {
            self.logger
                .detail(&format!("ignoring edit for retired overlay {}", id));
            Ok(EditOutcome::Ignored)
        } else {
            Err(PlannerError::UnknownOverlay(id))
        }
    }

    /// Radius typed by the user. Drives the live circle when one is bound.
    pub fn set_radius(
        &mut self,
        radius: f64,
        map: &mut dyn MapHost,
        flight: &mut FlightState,
    ) -> PlannerResult<()> {
        let bound_circle = self
            .shape
            .as_ref()
            .filter(|shape| self.radius_bound && shape.kind() == OverlayType::Circle)
            .map(|shape| shape.overlay().id());

        match bound_circle {
            Some(id) => {
                self.edit(id, &OverlayEdit::SetRadius { radius }, map, flight)?;
            }
            None => flight.set(FlightField::Radius, radius),
        }
        Ok(())
    }

    /// Recomputes perimeter and area, writing only values that changed.
    fn recompute(&self, flight: &mut FlightState) {
        let Some(shape) = self.shape.as_ref() else {
            return;
        };
        self.metrics.record_recomputation();

        let perimeter = adapter::perimeter(shape);
        if perimeter != flight.get(FlightField::Perimeter) {
            flight.set(FlightField::Perimeter, perimeter);
        } else {
            self.metrics.record_suppressed_write();
        }

        let area = adapter::area(shape);
        if area != flight.get(FlightField::Area) {
            flight.set(FlightField::Area, area);
        } else {
            self.metrics.record_suppressed_write();
        }
    }

    fn show_landing(&self, position: &LatLng) {
        if let Ok(mut display) = self.display.lock() {
            display.show_landing(position);
        }
    }
}
