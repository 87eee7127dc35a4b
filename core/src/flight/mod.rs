pub mod estimator;
pub mod state;

pub use estimator::{estimate, FlightConstants, FlightTimeEstimate};
pub use state::{Flight, FlightField, FlightListener, FlightState, ListenerId};
