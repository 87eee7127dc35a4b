use crate::geometry::{LatLng, LatLngBounds};
use crate::prelude::{PlannerError, PlannerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Drawing tools offered on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayType {
    Circle,
    Rectangle,
    Polygon,
    Marker,
}

impl OverlayType {
    pub const SHAPES: [OverlayType; 3] = [
        OverlayType::Circle,
        OverlayType::Rectangle,
        OverlayType::Polygon,
    ];

    pub fn is_shape(&self) -> bool {
        !matches!(self, OverlayType::Marker)
    }
}

impl fmt::Display for OverlayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverlayType::Circle => "circle",
            OverlayType::Rectangle => "rectangle",
            OverlayType::Polygon => "polygon",
            OverlayType::Marker => "marker",
        };
        f.write_str(name)
    }
}

/// Geometry of a drawn overlay. Radius in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlayGeometry {
    Circle { center: LatLng, radius: f64 },
    Rectangle { bounds: LatLngBounds },
    Polygon { path: Vec<LatLng> },
    Marker { position: LatLng },
}

impl OverlayGeometry {
    pub fn kind(&self) -> OverlayType {
        match self {
            OverlayGeometry::Circle { .. } => OverlayType::Circle,
            OverlayGeometry::Rectangle { .. } => OverlayType::Rectangle,
            OverlayGeometry::Polygon { .. } => OverlayType::Polygon,
            OverlayGeometry::Marker { .. } => OverlayType::Marker,
        }
    }
}

/// Presentation options applied by the drawing tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayOptions {
    pub draggable: bool,
    pub editable: bool,
    pub stroke_color: Option<String>,
    pub title: Option<String>,
}

impl OverlayOptions {
    pub fn for_type(kind: OverlayType) -> Self {
        match kind {
            OverlayType::Marker => Self {
                draggable: true,
                editable: false,
                stroke_color: None,
                title: Some("Landing location".into()),
            },
            _ => Self {
                draggable: true,
                editable: true,
                stroke_color: Some("green".into()),
                title: None,
            },
        }
    }
}

/// Notifications raised by an overlay when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditSignal {
    CenterChanged,
    RadiusChanged,
    BoundsChanged,
    PathInsertAt,
    PathRemoveAt,
    PathSetAt,
    Drag,
    DragEnd,
    PositionChanged,
}

/// User edit applied to a live overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum OverlayEdit {
    SetCenter { center: LatLng },
    SetRadius { radius: f64 },
    SetBounds { bounds: LatLngBounds },
    InsertVertex { index: usize, position: LatLng },
    RemoveVertex { index: usize },
    SetVertex { index: usize, position: LatLng },
    /// Moves the whole overlay; part of a drag gesture.
    Translate { delta_lat: f64, delta_lng: f64 },
    /// Finishes a drag gesture.
    DragEnd,
    SetPosition { position: LatLng },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    id: OverlayId,
    geometry: OverlayGeometry,
    options: OverlayOptions,
    #[serde(skip)]
    listeners: Vec<EditSignal>,
}

impl Overlay {
    pub fn new(id: OverlayId, geometry: OverlayGeometry) -> Self {
        let options = OverlayOptions::for_type(geometry.kind());
        Self {
            id,
            geometry,
            options,
            listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn kind(&self) -> OverlayType {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &OverlayGeometry {
        &self.geometry
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    pub fn radius(&self) -> Option<f64> {
        match self.geometry {
            OverlayGeometry::Circle { radius, .. } => Some(radius),
            _ => None,
        }
    }

    pub fn add_listener(&mut self, signal: EditSignal) {
        if !self.listeners.contains(&signal) {
            self.listeners.push(signal);
        }
    }

    pub fn listens_to(&self, signal: EditSignal) -> bool {
        self.listeners.contains(&signal)
    }

    pub fn listeners(&self) -> &[EditSignal] {
        &self.listeners
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Applies an edit and returns the signals it raised, in order.
    pub fn apply(&mut self, edit: &OverlayEdit) -> PlannerResult<Vec<EditSignal>> {
        let kind = self.kind();
        let signals = match (&mut self.geometry, edit) {
            (OverlayGeometry::Circle { center, .. }, OverlayEdit::SetCenter { center: to }) => {
                *center = *to;
                vec![EditSignal::CenterChanged]
            }
            (OverlayGeometry::Circle { radius, .. }, OverlayEdit::SetRadius { radius: to }) => {
                *radius = *to;
                vec![EditSignal::RadiusChanged]
            }
            (
                OverlayGeometry::Circle { center, .. },
                OverlayEdit::Translate {
                    delta_lat,
                    delta_lng,
                },
            ) => {
                *center = center.translated(*delta_lat, *delta_lng);
                vec![EditSignal::CenterChanged]
            }
            (OverlayGeometry::Rectangle { bounds }, OverlayEdit::SetBounds { bounds: to }) => {
                *bounds = *to;
                vec![EditSignal::BoundsChanged]
            }
            (
                OverlayGeometry::Rectangle { bounds },
                OverlayEdit::Translate {
                    delta_lat,
                    delta_lng,
                },
            ) => {
                *bounds = bounds.translated(*delta_lat, *delta_lng);
                vec![EditSignal::BoundsChanged]
            }
            (OverlayGeometry::Polygon { path }, OverlayEdit::InsertVertex { index, position }) => {
                if *index > path.len() {
                    return Err(vertex_out_of_range(*index, path.len()));
                }
                path.insert(*index, *position);
                vec![EditSignal::PathInsertAt]
            }
            (OverlayGeometry::Polygon { path }, OverlayEdit::RemoveVertex { index }) => {
                if *index >= path.len() {
                    return Err(vertex_out_of_range(*index, path.len()));
                }
                path.remove(*index);
                vec![EditSignal::PathRemoveAt]
            }
            (OverlayGeometry::Polygon { path }, OverlayEdit::SetVertex { index, position }) => {
                let len = path.len();
                let vertex = path
                    .get_mut(*index)
                    .ok_or_else(|| vertex_out_of_range(*index, len))?;
                *vertex = *position;
                vec![EditSignal::PathSetAt]
            }
            (
                OverlayGeometry::Polygon { path },
                OverlayEdit::Translate {
                    delta_lat,
                    delta_lng,
                },
            ) => {
                for vertex in path.iter_mut() {
                    *vertex = vertex.translated(*delta_lat, *delta_lng);
                }
                vec![EditSignal::Drag]
            }
            (OverlayGeometry::Marker { position }, OverlayEdit::SetPosition { position: to }) => {
                *position = *to;
                vec![EditSignal::PositionChanged]
            }
            (
                OverlayGeometry::Marker { position },
                OverlayEdit::Translate {
                    delta_lat,
                    delta_lng,
                },
            ) => {
                *position = position.translated(*delta_lat, *delta_lng);
                vec![EditSignal::PositionChanged]
            }
            (_, OverlayEdit::DragEnd) => vec![EditSignal::DragEnd],
            (_, other) => {
                return Err(PlannerError::InvalidEdit(format!(
                    "{:?} does not apply to a {}",
                    other, kind
                )))
            }
        };
        Ok(signals)
    }
}

fn vertex_out_of_range(index: usize, len: usize) -> PlannerError {
    PlannerError::InvalidEdit(format!("vertex {} out of range for path of {}", index, len))
}

/// The measurable overlay: a circle, rectangle or polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    overlay: Overlay,
}

impl Shape {
    pub fn new(overlay: Overlay) -> PlannerResult<Self> {
        if overlay.kind().is_shape() {
            Ok(Self { overlay })
        } else {
            Err(PlannerError::InvalidEdit(format!(
                "a {} cannot be measured",
                overlay.kind()
            )))
        }
    }

    pub fn kind(&self) -> OverlayType {
        self.overlay.kind()
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    pub fn into_overlay(self) -> Overlay {
        self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon() -> Overlay {
        Overlay::new(
            OverlayId(1),
            OverlayGeometry::Polygon {
                path: vec![
                    LatLng::new(0.0, 0.0),
                    LatLng::new(0.0, 1.0),
                    LatLng::new(1.0, 1.0),
                ],
            },
        )
    }

    #[test]
    fn polygon_path_edits_raise_path_signals() {
        let mut overlay = polygon();
        let inserted = overlay
            .apply(&OverlayEdit::InsertVertex {
                index: 3,
                position: LatLng::new(1.0, 0.0),
            })
            .unwrap();
        assert_eq!(inserted, vec![EditSignal::PathInsertAt]);

        let set = overlay
            .apply(&OverlayEdit::SetVertex {
                index: 0,
                position: LatLng::new(-0.5, 0.0),
            })
            .unwrap();
        assert_eq!(set, vec![EditSignal::PathSetAt]);

        let removed = overlay.apply(&OverlayEdit::RemoveVertex { index: 1 }).unwrap();
        assert_eq!(removed, vec![EditSignal::PathRemoveAt]);

        match overlay.geometry() {
            OverlayGeometry::Polygon { path } => assert_eq!(
                path,
                &vec![
                    LatLng::new(-0.5, 0.0),
                    LatLng::new(1.0, 1.0),
                    LatLng::new(1.0, 0.0)
                ]
            ),
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn polygon_translate_only_signals_drag() {
        let mut overlay = polygon();
        let signals = overlay
            .apply(&OverlayEdit::Translate {
                delta_lat: 1.0,
                delta_lng: 0.0,
            })
            .unwrap();
        assert_eq!(signals, vec![EditSignal::Drag]);
        assert_eq!(
            overlay.apply(&OverlayEdit::DragEnd).unwrap(),
            vec![EditSignal::DragEnd]
        );
    }

    #[test]
    fn out_of_range_vertex_is_rejected() {
        let mut overlay = polygon();
        let result = overlay.apply(&OverlayEdit::RemoveVertex { index: 3 });
        assert!(matches!(result, Err(PlannerError::InvalidEdit(_))));
    }

    #[test]
    fn mismatched_edit_is_rejected() {
        let mut overlay = polygon();
        let result = overlay.apply(&OverlayEdit::SetRadius { radius: 3.0 });
        assert!(matches!(result, Err(PlannerError::InvalidEdit(_))));
    }

    #[test]
    fn marker_is_not_a_shape() {
        let marker = Overlay::new(
            OverlayId(2),
            OverlayGeometry::Marker {
                position: LatLng::new(0.0, 0.0),
            },
        );
        assert_eq!(marker.options().title.as_deref(), Some("Landing location"));
        assert!(Shape::new(marker).is_err());
    }

    #[test]
    fn listeners_can_be_cleared() {
        let mut overlay = polygon();
        overlay.add_listener(EditSignal::PathSetAt);
        overlay.add_listener(EditSignal::PathSetAt);
        assert_eq!(overlay.listeners().len(), 1);
        overlay.clear_listeners();
        assert!(!overlay.listens_to(EditSignal::PathSetAt));
    }

    #[test]
    fn geometry_serializes_with_type_tag() {
        let geometry: OverlayGeometry =
            serde_json::from_str(r#"{"type":"circle","center":{"lat":1.0,"lng":2.0},"radius":30.0}"#)
                .unwrap();
        assert_eq!(geometry.kind(), OverlayType::Circle);
    }
}
