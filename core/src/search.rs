use crate::geometry::LatLng;
use crate::map_interface::{GeocodeOutcome, GeocodeStatus, Geocoder, MapHost};
use crate::prelude::{PlannerError, PlannerResult};
use crate::telemetry::{LogManager, MetricsRecorder};
use std::sync::Arc;

/// Address search that recenters the map on the best match.
pub struct SearchController {
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl SearchController {
    pub fn new(metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            metrics,
            logger: LogManager::new("search"),
        }
    }

    pub fn search(
        &self,
        query: &str,
        geocoder: &dyn Geocoder,
        map: &mut dyn MapHost,
    ) -> PlannerResult<LatLng> {
        self.logger.detail(&format!("geocoding {:?}", query));
        self.apply(geocoder.geocode(query), map)
    }

    /// Applies a lookup that completed elsewhere, e.g. on an async task.
    pub fn apply(&self, outcome: GeocodeOutcome, map: &mut dyn MapHost) -> PlannerResult<LatLng> {
        let status = match outcome {
            Ok(results) => match results.first() {
                Some(first) => {
                    map.set_center(*first);
                    self.logger
                        .record(&format!("recentered on {},{}", first.lat, first.lng));
                    return Ok(*first);
                }
                None => GeocodeStatus::ZeroResults,
            },
            Err(status) => status,
        };

        self.metrics.record_geocode_failure();
        let error = PlannerError::Geocode(status);
        self.logger.warn(&error.to_string());
        Err(error)
    }
}
