use crate::workflow::runner::Step;
use anyhow::Context;
use dronecore::geometry::LatLng;
use dronecore::map_interface::{GazetteerEntry, GazetteerGeocoder};
use dronecore::SessionOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Session file: startup options, offline gazetteer and scripted steps.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub options: SessionOptions,
    pub gazetteer: Vec<GazetteerEntry>,
    pub steps: Vec<Step>,
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session config {}", path_ref.display()))?;
        let config: SessionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(lat: f64, lng: f64, zoom: u8, height: &str) -> Self {
        Self {
            options: SessionOptions {
                center: LatLng::new(lat, lng),
                zoom,
                initial_height: height.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn geocoder(&self) -> GazetteerGeocoder {
        GazetteerGeocoder::new(self.gazetteer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dronecore::drawing::OverlayType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_sets_options() {
        let cfg = SessionConfig::from_args(40.0, -74.0, 18, "15");
        assert_eq!(cfg.options.center, LatLng::new(40.0, -74.0));
        assert_eq!(cfg.options.zoom, 18);
        assert_eq!(cfg.options.initial_height, "15");
        assert!(cfg.options.marker_support);
        assert!(cfg.steps.is_empty());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            br#"
options:
  center: { lat: 37.792, lng: -122.403 }
  initial_height: "12"
  marker_support: false
  constants:
    drone_speed: 5.0
gazetteer:
  - name: Ferry Building
    location: { lat: 37.7955, lng: -122.3937 }
steps:
  - action: search
    query: ferry
  - action: draw
    geometry:
      type: circle
      center: { lat: 37.7955, lng: -122.3937 }
      radius: 30.0
  - action: select_tool
    tool: polygon
  - action: edit
    target: shape
    edit:
      edit: set_radius
      radius: 35.0
"#,
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = SessionConfig::load(&path).unwrap();

        assert_eq!(cfg.options.zoom, 17);
        assert!(!cfg.options.marker_support);
        assert_eq!(cfg.options.constants.drone_speed, 5.0);
        assert_eq!(cfg.options.constants.imagery_height, 5.0);
        assert_eq!(cfg.gazetteer.len(), 1);
        assert_eq!(cfg.steps.len(), 4);
        assert!(matches!(
            cfg.steps[2],
            Step::SelectTool {
                tool: Some(OverlayType::Polygon)
            }
        ));
    }

    #[test]
    fn config_load_reports_missing_file() {
        let error = SessionConfig::load("/nonexistent/session.yaml").unwrap_err();
        assert!(error.to_string().contains("reading session config"));
    }
}
