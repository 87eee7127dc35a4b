use anyhow::ensure;
use dronecore::drawing::OverlayGeometry;
use dronecore::geometry::{compute_offset, LatLng};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for a synthetic building outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintConfig {
    /// Defaults to the current map center.
    pub center: Option<LatLng>,
    pub sides: usize,
    pub radius_m: f64,
    /// Maximum random deviation of each vertex from `radius_m`.
    pub jitter_m: f64,
    pub seed: u64,
    pub description: Option<String>,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            center: None,
            sides: 6,
            radius_m: 40.0,
            jitter_m: 5.0,
            seed: 0,
            description: None,
        }
    }
}

impl FootprintConfig {
    fn normalized_sides(&self) -> usize {
        self.sides.max(3)
    }
}

/// Builds a polygon whose vertices sit at evenly spaced headings around the center.
pub fn build_footprint(config: &FootprintConfig, map_center: LatLng) -> anyhow::Result<OverlayGeometry> {
    ensure!(
        config.radius_m.is_finite() && config.radius_m > 0.0,
        "footprint radius must be positive, got {}",
        config.radius_m
    );
    ensure!(
        config.jitter_m.is_finite() && config.jitter_m >= 0.0 && config.jitter_m < config.radius_m,
        "footprint jitter must be in [0, radius), got {}",
        config.jitter_m
    );

    let center = config.center.unwrap_or(map_center);
    let sides = config.normalized_sides();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let path = (0..sides)
        .map(|index| {
            let heading = 360.0 * index as f64 / sides as f64;
            let jitter = if config.jitter_m > 0.0 {
                rng.gen_range(-config.jitter_m..config.jitter_m)
            } else {
                0.0
            };
            compute_offset(&center, config.radius_m + jitter, heading)
        })
        .collect();

    Ok(OverlayGeometry::Polygon { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dronecore::geometry::compute_distance_between;

    #[test]
    fn footprint_has_requested_vertex_count() {
        let config = FootprintConfig {
            sides: 8,
            ..Default::default()
        };
        match build_footprint(&config, LatLng::new(37.792, -122.403)).unwrap() {
            OverlayGeometry::Polygon { path } => assert_eq!(path.len(), 8),
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn footprint_without_jitter_is_regular() {
        let center = LatLng::new(37.792, -122.403);
        let config = FootprintConfig {
            sides: 2,
            jitter_m: 0.0,
            radius_m: 25.0,
            ..Default::default()
        };
        match build_footprint(&config, center).unwrap() {
            OverlayGeometry::Polygon { path } => {
                assert_eq!(path.len(), 3);
                for vertex in path {
                    assert!((compute_distance_between(&center, &vertex) - 25.0).abs() < 1e-6);
                }
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn same_seed_repeats_outline() {
        let config = FootprintConfig {
            seed: 13,
            ..Default::default()
        };
        let center = LatLng::new(0.0, 0.0);
        assert_eq!(
            build_footprint(&config, center).unwrap(),
            build_footprint(&config, center).unwrap()
        );
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let config = FootprintConfig {
            radius_m: -1.0,
            ..Default::default()
        };
        assert!(build_footprint(&config, LatLng::new(0.0, 0.0)).is_err());
    }
}
