use dronecore::geometry::LatLng;
use dronecore::map_interface::{GeocodeOutcome, GeocodeStatus};
use reqwest::StatusCode;
use serde::Deserialize;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "drone-survey-visualizer/0.1";

#[derive(Debug, Clone, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Looks `address` up on Nominatim, best match first.
pub async fn geocode(address: String) -> GeocodeOutcome {
    if address.trim().is_empty() {
        return Err(GeocodeStatus::InvalidRequest);
    }

    let client = reqwest::Client::new();
    let response = client
        .get(NOMINATIM_URL)
        .query(&[("format", "json"), ("limit", "5"), ("q", address.as_str())])
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .map_err(|_| GeocodeStatus::Error)?;

    if !response.status().is_success() {
        return Err(status_for(response.status()));
    }

    let places = response
        .json::<Vec<Place>>()
        .await
        .map_err(|_| GeocodeStatus::UnknownError)?;
    locations(&places)
}

fn status_for(code: StatusCode) -> GeocodeStatus {
    match code {
        StatusCode::TOO_MANY_REQUESTS => GeocodeStatus::OverQueryLimit,
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => GeocodeStatus::RequestDenied,
        StatusCode::BAD_REQUEST => GeocodeStatus::InvalidRequest,
        _ => GeocodeStatus::UnknownError,
    }
}

fn locations(places: &[Place]) -> GeocodeOutcome {
    let found: Vec<LatLng> = places
        .iter()
        .filter_map(|place| {
            let lat = place.lat.parse::<f64>().ok()?;
            let lng = place.lon.parse::<f64>().ok()?;
            Some(LatLng::new(lat, lng))
        })
        .collect();
    if found.is_empty() {
        Err(GeocodeStatus::ZeroResults)
    } else {
        Ok(found)
    }
}
