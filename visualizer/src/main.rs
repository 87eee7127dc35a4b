use canvas::MapCanvas;
use dronecore::drawing::{
    Completion, EditOutcome, OverlayEdit, OverlayGeometry, OverlayId, OverlayType,
    SharedDisplay,
};
use dronecore::geometry::{LatLng, LatLngBounds};
use dronecore::map_interface::{GeocodeOutcome, MapHost, MapView, ReadoutBoard};
use dronecore::{PlannerError, SessionOptions, SurveySession};
use iced::{
    widget::{button, column, container, row, scrollable, text, text_input, Canvas, Column, Container},
    Alignment, Color, Element, Length, Task, Theme,
};
use std::sync::{Arc, Mutex};

mod canvas;
mod geocoding;

const MIN_ZOOM: u8 = 3;
const MAX_ZOOM: u8 = 21;

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Drone Survey Planner".into()
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

struct Visualizer {
    session: SurveySession<MapView>,
    board: Arc<Mutex<ReadoutBoard>>,
    height_input: String,
    radius_input: String,
    search_input: String,
    /// Vertices of the polygon being drawn.
    pending: Vec<LatLng>,
    /// Modal message; blocks map input until dismissed.
    alert: Option<String>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    ToolSelected(Option<OverlayType>),
    CircleDrawn { center: LatLng, radius: f64 },
    RectangleDrawn(LatLng, LatLng),
    VertexAdded(LatLng),
    FinishPolygon,
    MarkerPlaced(LatLng),
    Edit(OverlayId, OverlayEdit),
    /// Whole-overlay drag by a lat/lng delta.
    Dragged(OverlayId, f64, f64),
    HeightChanged(String),
    HeightSubmitted,
    RadiusChanged(String),
    RadiusSubmitted,
    SearchChanged(String),
    SearchSubmitted,
    Geocoded(String, GeocodeOutcome),
    DismissAlert,
    ZoomIn,
    ZoomOut,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let options = SessionOptions::default();
        let board = Arc::new(Mutex::new(ReadoutBoard::new()));
        let display: SharedDisplay = board.clone();
        let session = SurveySession::with_map_view(&options, display);

        let mut visualizer = Visualizer {
            session,
            board,
            height_input: options.initial_height.clone(),
            radius_input: String::new(),
            search_input: String::new(),
            pending: Vec::new(),
            alert: None,
            status: "Pick a tool and outline the building".into(),
            history: Vec::new(),
        };
        visualizer.sync_radius_input();
        (visualizer, Task::none())
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        let blocked = !matches!(message, Message::DismissAlert | Message::Geocoded(..));
        if state.alert.is_some() && blocked {
            return Task::none();
        }

        match message {
            Message::ToolSelected(tool) => {
                state.pending.clear();
                match state.session.select_tool(tool) {
                    Ok(()) => {
                        state.status = match tool {
                            Some(kind) => format!("Drawing a {kind}"),
                            None => "Editing".into(),
                        };
                    }
                    Err(err) => state.fail(err),
                }
            }
            Message::CircleDrawn { center, radius } => {
                state.complete(OverlayGeometry::Circle { center, radius });
            }
            Message::RectangleDrawn(a, b) => {
                state.complete(OverlayGeometry::Rectangle {
                    bounds: LatLngBounds::from_corners(a, b),
                });
            }
            Message::VertexAdded(position) => {
                state.pending.push(position);
                state.status = format!("Polygon: {} vertices", state.pending.len());
            }
            Message::FinishPolygon => {
                if state.pending.len() < 3 {
                    state.status = "A polygon needs at least three vertices".into();
                } else {
                    let path = std::mem::take(&mut state.pending);
                    state.complete(OverlayGeometry::Polygon { path });
                }
            }
            Message::MarkerPlaced(position) => {
                state.complete(OverlayGeometry::Marker { position });
            }
            Message::Edit(id, edit) => state.apply_edit(id, &[edit]),
            Message::Dragged(id, delta_lat, delta_lng) => state.apply_edit(
                id,
                &[
                    OverlayEdit::Translate {
                        delta_lat,
                        delta_lng,
                    },
                    OverlayEdit::DragEnd,
                ],
            ),
            Message::HeightChanged(value) => state.height_input = value,
            Message::HeightSubmitted => {
                state.session.set_height_input(&state.height_input);
                state.push_history(format!("Height set to {}", state.height_input));
            }
            Message::RadiusChanged(value) => state.radius_input = value,
            Message::RadiusSubmitted => {
                match state.session.set_radius_input(&state.radius_input) {
                    Ok(()) => state.push_history(format!("Radius set to {}", state.radius_input)),
                    Err(err) => state.fail(err),
                }
                state.sync_radius_input();
            }
            Message::SearchChanged(value) => state.search_input = value,
            Message::SearchSubmitted => {
                let query = state.search_input.clone();
                state.status = format!("Searching for {query}...");
                return Task::perform(geocoding::geocode(query.clone()), move |outcome| {
                    Message::Geocoded(query.clone(), outcome)
                });
            }
            Message::Geocoded(query, outcome) => match state.session.apply_geocode(outcome) {
                Ok(center) => {
                    state.status = format!("Centered on {query}");
                    state.push_history(format!(
                        "Found {query} at {:.4},{:.4}",
                        center.lat, center.lng
                    ));
                }
                Err(err) => {
                    state.push_history(format!("Search for {query} failed"));
                    state.alert = Some(err.to_string());
                }
            },
            Message::DismissAlert => state.alert = None,
            Message::ZoomIn => state.zoom_by(1),
            Message::ZoomOut => state.zoom_by(-1),
        }
        Task::none()
    }

    fn complete(&mut self, geometry: OverlayGeometry) {
        match self.session.complete_overlay(geometry) {
            Ok(Completion { id, kind }) => {
                self.status = format!("{kind} {id} placed");
                self.push_history(format!("Drew {kind} {id}"));
                self.sync_radius_input();
            }
            Err(err) => self.fail(err),
        }
    }

    fn apply_edit(&mut self, id: OverlayId, edits: &[OverlayEdit]) {
        for edit in edits {
            match self.session.edit(id, edit) {
                Ok(EditOutcome::Applied { recomputed, .. }) => {
                    if recomputed {
                        self.push_history(format!("Edited {id}"));
                    }
                }
                Ok(EditOutcome::Ignored) => {}
                Err(err) => {
                    self.fail(err);
                    return;
                }
            }
        }
        self.sync_radius_input();
    }

    fn zoom_by(&mut self, step: i8) {
        let map = self.session.map_mut();
        let zoom = (map.zoom() as i16 + step as i16).clamp(MIN_ZOOM as i16, MAX_ZOOM as i16);
        map.set_zoom(zoom as u8);
    }

    fn fail(&mut self, err: PlannerError) {
        self.status = err.to_string();
        self.push_history(format!("Rejected: {err}"));
    }

    /// The radius field shows the bound circle's radius, like the readouts.
    fn sync_radius_input(&mut self) {
        if let Ok(board) = self.board.lock() {
            self.radius_input = board.radius.clone();
        }
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let board = state
            .board
            .lock()
            .map(|board| board.clone())
            .unwrap_or_default();
        let map = state.session.map();
        let tool = map.drawing_mode();

        let tools = state.session.drawing().tools().iter().fold(
            row![tool_button("Hand", None, tool)].spacing(6),
            |row, kind| row.push(tool_button(tool_label(*kind), Some(*kind), tool)),
        );

        let mut controls = column![
            text("Survey").size(26),
            row![
                text_input("Address", &state.search_input)
                    .on_input(Message::SearchChanged)
                    .on_submit(Message::SearchSubmitted)
                    .padding(6),
                button("Search").on_press(Message::SearchSubmitted).padding(6),
            ]
            .spacing(6),
            tools,
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(340.0));

        if tool == Some(OverlayType::Polygon) {
            controls = controls.push(
                button("Finish polygon")
                    .on_press(Message::FinishPolygon)
                    .padding(6),
            );
        }

        controls = controls.push(labelled_input(
            "Flight height (m)",
            &state.height_input,
            Message::HeightChanged,
            Message::HeightSubmitted,
        ));
        if board.radius_input_visible() {
            controls = controls.push(labelled_input(
                "Radius (m)",
                &state.radius_input,
                Message::RadiusChanged,
                Message::RadiusSubmitted,
            ));
        }

        let shape = board
            .data_shape
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "none".into());
        controls = controls.push(
            column![
                text("Flight").size(18),
                readout("Shape", &shape),
                readout("Perimeter (m)", &board.perimeter),
                readout("Area (m²)", &board.area),
                readout("Laps", &board.num_laps),
                readout("Time per lap (s)", &board.time_per_lap),
                readout("Total time (s)", &board.time_total),
                readout("Drone speed (m/s)", &board.drone_speed),
                readout("Imagery height (m)", &board.imagery_height),
                readout("Landing location", &board.landing_location),
            ]
            .spacing(4),
        );
        controls = controls.push(text(&state.status).size(14));

        let map_canvas = Canvas::new(MapCanvas {
            center: map.center(),
            zoom: map.zoom(),
            tool,
            overlays: map.overlays().to_vec(),
            pending: state.pending.clone(),
            locked: state.alert.is_some(),
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let mut map_column = Column::new().spacing(10).padding(16).width(Length::Fill);
        if let Some(alert) = &state.alert {
            map_column = map_column.push(
                container(
                    row![
                        text(alert.clone()).size(16).color(Color::from_rgb(1.0, 0.85, 0.8)),
                        button("Dismiss").on_press(Message::DismissAlert).padding(6),
                    ]
                    .spacing(12)
                    .align_y(Alignment::Center),
                )
                .padding(10)
                .style(container::rounded_box),
            );
        }
        map_column = map_column
            .push(
                row![
                    text(format!(
                        "Center {:.4},{:.4}  zoom {}",
                        map.center().lat,
                        map.center().lng,
                        map.zoom()
                    ))
                    .size(14),
                    button("+").on_press(Message::ZoomIn).padding(4),
                    button("-").on_press(Message::ZoomOut).padding(4),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            )
            .push(map_canvas)
            .push(text("Activity log").size(16))
            .push(Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6));

        let layout = row![controls, map_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn tool_label(kind: OverlayType) -> &'static str {
    match kind {
        OverlayType::Circle => "Circle",
        OverlayType::Rectangle => "Rectangle",
        OverlayType::Polygon => "Polygon",
        OverlayType::Marker => "Marker",
    }
}

fn tool_button(
    label: &'static str,
    kind: Option<OverlayType>,
    active: Option<OverlayType>,
) -> Element<'static, Message> {
    let style = if kind == active {
        button::primary
    } else {
        button::secondary
    };
    button(text(label).size(13))
        .on_press(Message::ToolSelected(kind))
        .style(style)
        .padding(6)
        .into()
}

fn labelled_input<'a>(
    label: &'static str,
    value: &'a str,
    on_input: fn(String) -> Message,
    on_submit: Message,
) -> Element<'a, Message> {
    column![
        text(label).size(14),
        text_input(label, value)
            .on_input(on_input)
            .on_submit(on_submit)
            .padding(6),
    ]
    .spacing(4)
    .into()
}

fn readout(label: &'static str, value: &str) -> Element<'static, Message> {
    row![
        text(label).size(13).width(Length::Fixed(150.0)),
        text(value.to_string()).size(13),
    ]
    .spacing(8)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dronecore::drawing::DrawingState;
    use dronecore::map_interface::GeocodeStatus;

    fn visualizer() -> Visualizer {
        Visualizer::boot().0
    }

    #[test]
    fn drawing_a_circle_fills_readouts_and_radius_input() {
        let mut state = visualizer();
        let _ = Visualizer::update(&mut state, Message::ToolSelected(Some(OverlayType::Circle)));
        let _ = Visualizer::update(
            &mut state,
            Message::CircleDrawn {
                center: LatLng::new(37.792, -122.403),
                radius: 10.0,
            },
        );

        assert_eq!(state.radius_input, "10");
        let board = state.board.lock().expect("board lock").clone();
        assert_eq!(board.perimeter, "63");
        assert!(board.radius_input_visible());
    }

    #[test]
    fn polygon_needs_three_vertices() {
        let mut state = visualizer();
        let _ = Visualizer::update(&mut state, Message::ToolSelected(Some(OverlayType::Polygon)));
        let _ = Visualizer::update(&mut state, Message::VertexAdded(LatLng::new(37.792, -122.403)));
        let _ = Visualizer::update(&mut state, Message::FinishPolygon);

        assert_eq!(state.pending.len(), 1);
        assert!(state.session.drawing().shape().is_none());
    }

    #[test]
    fn failed_search_raises_alert_that_blocks_drawing() {
        let mut state = visualizer();
        let _ = Visualizer::update(
            &mut state,
            Message::Geocoded(
                "nowhere".into(),
                Err(GeocodeStatus::ZeroResults),
            ),
        );
        assert_eq!(
            state.alert.as_deref(),
            Some("Geocoding failed: ZERO_RESULTS")
        );

        let _ = Visualizer::update(&mut state, Message::ToolSelected(Some(OverlayType::Circle)));
        assert_eq!(state.session.state(), DrawingState::Idle);

        let _ = Visualizer::update(&mut state, Message::DismissAlert);
        let _ = Visualizer::update(&mut state, Message::ToolSelected(Some(OverlayType::Circle)));
        assert_eq!(state.session.state(), DrawingState::Drawing(OverlayType::Circle));
    }
}
