use crate::geometry::LatLng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure codes reported by a geocoding provider. Success is carried by the
/// `Ok` arm of [`GeocodeOutcome`], so there is no `OK` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocodeStatus {
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    UnknownError,
    Error,
}

impl fmt::Display for GeocodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            GeocodeStatus::ZeroResults => "ZERO_RESULTS",
            GeocodeStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            GeocodeStatus::RequestDenied => "REQUEST_DENIED",
            GeocodeStatus::InvalidRequest => "INVALID_REQUEST",
            GeocodeStatus::UnknownError => "UNKNOWN_ERROR",
            GeocodeStatus::Error => "ERROR",
        };
        f.write_str(code)
    }
}

/// Result of a lookup: candidate locations, best match first.
pub type GeocodeOutcome = Result<Vec<LatLng>, GeocodeStatus>;

/// Address lookup service.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> GeocodeOutcome;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteerEntry {
    pub name: String,
    pub location: LatLng,
}

/// Offline geocoder backed by a fixed list of named places.
///
/// Matching is a case-insensitive substring search over entry names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GazetteerGeocoder {
    entries: Vec<GazetteerEntry>,
}

impl GazetteerGeocoder {
    pub fn new(entries: Vec<GazetteerEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }
}

impl Geocoder for GazetteerGeocoder {
    fn geocode(&self, address: &str) -> GeocodeOutcome {
        let needle = address.trim().to_lowercase();
        if needle.is_empty() {
            return Err(GeocodeStatus::InvalidRequest);
        }
        let matches: Vec<LatLng> = self
            .entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .map(|entry| entry.location)
            .collect();
        if matches.is_empty() {
            Err(GeocodeStatus::ZeroResults)
        } else {
            Ok(matches)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gazetteer() -> GazetteerGeocoder {
        GazetteerGeocoder::new(vec![
            GazetteerEntry {
                name: "Transamerica Pyramid".into(),
                location: LatLng::new(37.7952, -122.4028),
            },
            GazetteerEntry {
                name: "Ferry Building".into(),
                location: LatLng::new(37.7955, -122.3937),
            },
        ])
    }

    #[test]
    fn matches_case_insensitively() {
        let results = gazetteer().geocode("  ferry ").unwrap();
        assert_eq!(results, vec![LatLng::new(37.7955, -122.3937)]);
    }

    #[test]
    fn unknown_and_empty_queries_fail() {
        assert_eq!(
            gazetteer().geocode("Coit Tower"),
            Err(GeocodeStatus::ZeroResults)
        );
        assert_eq!(gazetteer().geocode("   "), Err(GeocodeStatus::InvalidRequest));
    }

    #[test]
    fn status_renders_provider_code() {
        assert_eq!(GeocodeStatus::OverQueryLimit.to_string(), "OVER_QUERY_LIMIT");
        let json = serde_json::to_string(&GeocodeStatus::ZeroResults).unwrap();
        assert_eq!(json, "\"ZERO_RESULTS\"");
    }

    #[test]
    fn ok_is_not_a_failure_status() {
        assert!(serde_json::from_str::<GeocodeStatus>("\"OK\"").is_err());
        let status: GeocodeStatus = serde_json::from_str("\"REQUEST_DENIED\"").unwrap();
        assert_eq!(status, GeocodeStatus::RequestDenied);
    }
}
