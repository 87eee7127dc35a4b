//! Core model for the drone building survey planner.
//!
//! A user outlines a building with one circle, rectangle or polygon and
//! enters a flight height; the session derives perimeter, area, imaging
//! laps and flight time, and keeps them current as the shape is edited.

pub mod drawing;
pub mod flight;
pub mod geometry;
pub mod map_interface;
pub mod prelude;
pub mod search;
pub mod session;
pub mod telemetry;

pub use prelude::{PlannerError, PlannerResult, SessionOptions};
pub use session::SurveySession;
