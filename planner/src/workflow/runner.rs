use crate::generator::footprint::{build_footprint, FootprintConfig};
use crate::generator::template::rectangle_template;
use crate::gui_bridge::model::FlightModel;
use crate::workflow::config::SessionConfig;
use anyhow::{anyhow, Context};
use dronecore::drawing::{OverlayEdit, OverlayGeometry, OverlayId, OverlayType, SharedDisplay};
use dronecore::map_interface::{GazetteerGeocoder, MapHost, MapView, ReadoutBoard};
use dronecore::{PlannerError, PlannerResult, SurveySession};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Text or numeric contents of an input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl InputValue {
    pub fn raw(&self) -> String {
        match self {
            InputValue::Number(value) => value.to_string(),
            InputValue::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditTarget {
    Shape,
    Marker,
    Overlay(u64),
}

/// One scripted user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    SelectTool { tool: Option<OverlayType> },
    Complete { geometry: OverlayGeometry },
    /// Selects the matching tool and completes the drawing.
    Draw { geometry: OverlayGeometry },
    /// Rectangle of the given ground size around the map center.
    Rectangle { width_m: f64, height_m: f64 },
    Footprint(FootprintConfig),
    Edit { target: EditTarget, edit: OverlayEdit },
    Height { value: InputValue },
    Radius { value: InputValue },
    Search { query: String },
}

impl Step {
    pub fn label(&self) -> String {
        match self {
            Step::SelectTool { tool: Some(tool) } => format!("select {}", tool),
            Step::SelectTool { tool: None } => "leave drawing mode".into(),
            Step::Complete { geometry } => format!("complete {}", geometry.kind()),
            Step::Draw { geometry } => format!("draw {}", geometry.kind()),
            Step::Rectangle { width_m, height_m } => {
                format!("rectangle {}x{} m", width_m, height_m)
            }
            Step::Footprint(config) => format!(
                "footprint {}",
                config.description.clone().unwrap_or_else(|| format!("{} sides", config.sides))
            ),
            Step::Edit { target, .. } => format!("edit {:?}", target),
            Step::Height { value } => format!("height {}", value.raw()),
            Step::Radius { value } => format!("radius {}", value.raw()),
            Step::Search { query } => format!("search {:?}", query),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub label: String,
    pub board: ReadoutBoard,
    /// Message shown to the user when the step failed softly.
    pub alert: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub records: Vec<StepRecord>,
    pub model: FlightModel,
}

impl WorkflowResult {
    pub fn alerts(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter_map(|record| record.alert.as_deref())
    }
}

pub type SharedSession = Arc<Mutex<SurveySession<MapView>>>;

/// Drives one survey session from scripted steps.
#[derive(Clone)]
pub struct Runner {
    session: SharedSession,
    board: Arc<Mutex<ReadoutBoard>>,
    geocoder: Arc<GazetteerGeocoder>,
}

pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| anyhow!("session state poisoned"))
}

impl Runner {
    pub fn new(config: &SessionConfig) -> Self {
        let board = Arc::new(Mutex::new(ReadoutBoard::new()));
        let display: SharedDisplay = board.clone();
        let session = SurveySession::with_map_view(&config.options, display);
        Self {
            session: Arc::new(Mutex::new(session)),
            board,
            geocoder: Arc::new(config.geocoder()),
        }
    }

    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    pub fn board(&self) -> Arc<Mutex<ReadoutBoard>> {
        self.board.clone()
    }

    pub fn geocoder(&self) -> Arc<GazetteerGeocoder> {
        self.geocoder.clone()
    }

    pub fn model(&self) -> anyhow::Result<FlightModel> {
        let session = lock(&self.session)?;
        let board = lock(&self.board)?.clone();
        Ok(FlightModel::capture(&session, board))
    }

    pub fn execute(&self, steps: &[Step]) -> anyhow::Result<WorkflowResult> {
        let mut records = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let label = step.label();
            let outcome = {
                let mut session = lock(&self.session)?;
                self.apply(&mut session, step)
                    .with_context(|| format!("step {} ({})", index + 1, label))?
            };
            let alert = match outcome {
                Ok(()) => None,
                Err(error) => {
                    log::warn!("step {} ({}): {}", index + 1, label, error);
                    Some(error.to_string())
                }
            };
            records.push(StepRecord {
                label,
                board: lock(&self.board)?.clone(),
                alert,
            });
        }

        Ok(WorkflowResult {
            records,
            model: self.model()?,
        })
    }

    pub fn run_footprint(&self, config: FootprintConfig) -> anyhow::Result<WorkflowResult> {
        self.execute(&[Step::Footprint(config)])
    }

    /// Applies a step. Geocoding failures come back as the inner error so
    /// the run can continue; anything else aborts the run.
    fn apply(
        &self,
        session: &mut SurveySession<MapView>,
        step: &Step,
    ) -> anyhow::Result<PlannerResult<()>> {
        let result = match step {
            Step::SelectTool { tool } => session.select_tool(*tool),
            Step::Complete { geometry } => session.complete_overlay(geometry.clone()).map(|_| ()),
            Step::Draw { geometry } => session.draw(geometry.clone()).map(|_| ()),
            Step::Rectangle { width_m, height_m } => {
                let geometry = rectangle_template(session.map().center(), *width_m, *height_m);
                session.draw(geometry).map(|_| ())
            }
            Step::Footprint(config) => {
                let geometry = build_footprint(config, session.map().center())?;
                session.draw(geometry).map(|_| ())
            }
            Step::Edit { target, edit } => {
                resolve_target(session, target).and_then(|id| session.edit(id, edit).map(|_| ()))
            }
            Step::Height { value } => {
                session.set_height_input(&value.raw());
                Ok(())
            }
            Step::Radius { value } => session.set_radius_input(&value.raw()),
            Step::Search { query } => session.search(query, self.geocoder.as_ref()).map(|_| ()),
        };

        match result {
            Err(PlannerError::Geocode(status)) => Ok(Err(PlannerError::Geocode(status))),
            other => Ok(Ok(other?)),
        }
    }
}

fn resolve_target(
    session: &SurveySession<MapView>,
    target: &EditTarget,
) -> PlannerResult<OverlayId> {
    match target {
        EditTarget::Shape => session
            .drawing()
            .shape()
            .map(|shape| shape.overlay().id())
            .ok_or_else(|| PlannerError::InvalidEdit("no shape has been drawn".into())),
        EditTarget::Marker => session
            .drawing()
            .marker()
            .map(|marker| marker.id())
            .ok_or_else(|| PlannerError::InvalidEdit("no marker has been placed".into())),
        EditTarget::Overlay(id) => Ok(OverlayId(*id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dronecore::drawing::DrawingState;
    use dronecore::geometry::LatLng;
    use dronecore::map_interface::GazetteerEntry;

    fn config() -> SessionConfig {
        let mut cfg = SessionConfig::from_args(37.792, -122.403, 17, "12");
        cfg.gazetteer.push(GazetteerEntry {
            name: "Ferry Building".into(),
            location: LatLng::new(37.7955, -122.3937),
        });
        cfg
    }

    #[test]
    fn runner_executes_scripted_circle() {
        let runner = Runner::new(&config());
        let result = runner
            .execute(&[
                Step::Draw {
                    geometry: OverlayGeometry::Circle {
                        center: LatLng::new(37.792, -122.403),
                        radius: 10.0,
                    },
                },
                Step::Edit {
                    target: EditTarget::Shape,
                    edit: OverlayEdit::SetRadius { radius: 20.0 },
                },
                Step::Height {
                    value: InputValue::Text("30".into()),
                },
            ])
            .unwrap();

        assert_eq!(result.records.len(), 3);
        assert_eq!(result.records[0].board.radius, "10");
        assert_eq!(result.model.board.radius, "20");
        assert_eq!(result.model.board.perimeter, "126");
        assert_eq!(result.model.board.num_laps, "6");
        assert_eq!(result.model.state, DrawingState::HasShape);
        assert_eq!(result.alerts().count(), 0);
    }

    #[test]
    fn failed_search_becomes_alert_and_run_continues() {
        let runner = Runner::new(&config());
        let result = runner
            .execute(&[
                Step::Search {
                    query: "atlantis".into(),
                },
                Step::Search {
                    query: "ferry".into(),
                },
                Step::Rectangle {
                    width_m: 30.0,
                    height_m: 20.0,
                },
            ])
            .unwrap();

        let alerts: Vec<&str> = result.alerts().collect();
        assert_eq!(alerts, vec!["Geocoding failed: ZERO_RESULTS"]);
        assert_eq!(result.model.center, LatLng::new(37.7955, -122.3937));
        assert_eq!(result.model.overlays.len(), 1);
        assert_eq!(result.model.board.perimeter, "100");
    }

    #[test]
    fn invalid_edit_aborts_run() {
        let runner = Runner::new(&config());
        let error = runner
            .execute(&[Step::Edit {
                target: EditTarget::Shape,
                edit: OverlayEdit::DragEnd,
            }])
            .unwrap_err();
        assert!(error.to_string().contains("step 1"));
    }

    #[test]
    fn footprint_run_reports_polygon() {
        let runner = Runner::new(&config());
        let result = runner.run_footprint(FootprintConfig::default()).unwrap();
        assert_eq!(result.model.overlays.len(), 1);
        assert!(result.model.flight.perimeter > 0.0);
        assert!(result.model.flight.area > 0.0);
    }
}
