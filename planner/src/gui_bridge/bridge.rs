use crate::workflow::runner::{lock, InputValue, Runner};
use dronecore::drawing::{OverlayEdit, OverlayGeometry, OverlayId, OverlayType};
use dronecore::map_interface::MapView;
use dronecore::{PlannerResult, SurveySession};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{net::SocketAddr, thread};
use tokio::runtime::Builder;
use warp::{http::StatusCode, reply, Filter};

fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug, Deserialize)]
struct ToolRequest {
    tool: Option<OverlayType>,
}

#[derive(Debug, Deserialize)]
struct EditRequest {
    id: u64,
    edit: OverlayEdit,
}

#[derive(Debug, Deserialize)]
struct InputRequest {
    value: InputValue,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
}

fn respond(result: anyhow::Result<Value>) -> reply::WithStatus<reply::Json> {
    match result {
        Ok(body) => reply::with_status(reply::json(&body), StatusCode::OK),
        Err(err) => {
            log::warn!("bridge request failed: {:#}", err);
            reply::with_status(
                reply::json(&json!({ "status": "error", "error": format!("{:#}", err) })),
                StatusCode::BAD_REQUEST,
            )
        }
    }
}

/// Runs one interaction against the shared session and returns the refreshed model.
fn interact<F>(runner: &Runner, action: F) -> anyhow::Result<Value>
where
    F: FnOnce(&mut SurveySession<MapView>) -> PlannerResult<Value>,
{
    let shared = runner.session();
    let detail = {
        let mut session = lock(&shared)?;
        action(&mut session)?
    };
    let model = serde_json::to_value(runner.model()?)?;
    Ok(json!({ "status": "ok", "detail": detail, "model": model }))
}

/// HTTP routes exposing a live session.
pub fn routes(
    runner: Runner,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let runner_filter = warp::any().map(move || runner.clone());

    let flight_route = warp::path("flight")
        .and(warp::path::end())
        .and(warp::get())
        .and(runner_filter.clone())
        .map(|runner: Runner| {
            respond(
                runner
                    .model()
                    .and_then(|model| Ok(serde_json::to_value(model)?)),
            )
        });

    let tool_route = warp::path("tool")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(runner_filter.clone())
        .map(|request: ToolRequest, runner: Runner| {
            respond(interact(&runner, |session| {
                session.select_tool(request.tool).map(|_| Value::Null)
            }))
        });

    let overlay_route = warp::path("overlay")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(runner_filter.clone())
        .map(|geometry: OverlayGeometry, runner: Runner| {
            respond(interact(&runner, |session| {
                session
                    .complete_overlay(geometry)
                    .map(|completion| json!(completion))
            }))
        });

    let edit_route = warp::path("edit")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(runner_filter.clone())
        .map(|request: EditRequest, runner: Runner| {
            respond(interact(&runner, |session| {
                session
                    .edit(OverlayId(request.id), &request.edit)
                    .map(|outcome| json!(outcome))
            }))
        });

    let height_route = warp::path("height")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(runner_filter.clone())
        .map(|request: InputRequest, runner: Runner| {
            respond(interact(&runner, |session| {
                session.set_height_input(&request.value.raw());
                Ok(Value::Null)
            }))
        });

    let radius_route = warp::path("radius")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(runner_filter.clone())
        .map(|request: InputRequest, runner: Runner| {
            respond(interact(&runner, |session| {
                session
                    .set_radius_input(&request.value.raw())
                    .map(|_| Value::Null)
            }))
        });

    let search_route = warp::path("search")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(runner_filter)
        .map(|request: SearchRequest, runner: Runner| {
            let geocoder = runner.geocoder();
            respond(interact(&runner, |session| {
                session
                    .search(&request.query, geocoder.as_ref())
                    .map(|center| json!(center))
            }))
        });

    flight_route
        .or(tool_route)
        .or(overlay_route)
        .or(edit_route)
        .or(height_route)
        .or(radius_route)
        .or(search_route)
}

/// Bridge that hosts the session HTTP endpoint on a background thread.
pub struct GuiBridge {
    runner: Runner,
}

impl GuiBridge {
    pub fn new(runner: Runner) -> Self {
        let filter = routes(runner.clone());
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    log::error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(filter).run(gui_bind_address()).await;
            });
        });

        Self { runner }
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    pub fn publish_model(&self) -> anyhow::Result<()> {
        let model = self.runner.model()?;
        println!(
            "[GUI] {} overlay(s), perimeter {} m, area {} m2, {} lap(s), total {} s",
            model.overlays.len(),
            model.board.perimeter,
            model.board.area,
            model.board.num_laps,
            model.board.time_total
        );
        Ok(())
    }
}
