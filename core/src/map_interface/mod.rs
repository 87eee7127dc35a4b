pub mod display;
pub mod geocoder;
pub mod map;

pub use display::{FlightDisplay, FlightReadout, ReadoutBoard};
pub use geocoder::{GazetteerEntry, GazetteerGeocoder, GeocodeOutcome, GeocodeStatus, Geocoder};
pub use map::{MapHost, MapView};
