use serde::{Deserialize, Serialize};

/// Fixed flight parameters used by the lap model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConstants {
    /// Linear drone speed in meters per second.
    pub drone_speed: f64,
    /// Vertical spacing between imaging laps in meters.
    pub imagery_height: f64,
}

impl FlightConstants {
    /// 15 mph expressed in meters per second.
    pub const DRONE_SPEED: f64 = 6.7056;
    pub const IMAGERY_HEIGHT: f64 = 5.0;
}

impl Default for FlightConstants {
    fn default() -> Self {
        Self {
            drone_speed: Self::DRONE_SPEED,
            imagery_height: Self::IMAGERY_HEIGHT,
        }
    }
}

/// Lap count and timings derived from a perimeter and a target height.
///
/// Values stay floating point so NaN inputs flow through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightTimeEstimate {
    pub num_laps: f64,
    /// Seconds.
    pub time_per_lap: f64,
    /// Seconds.
    pub time_total: f64,
}

/// Each lap is one circuit of the perimeter plus a climb of one imagery height.
pub fn estimate(perimeter: f64, height: f64, constants: &FlightConstants) -> FlightTimeEstimate {
    let num_laps = (height / constants.imagery_height).ceil();
    let time_per_lap = (perimeter + constants.imagery_height) / constants.drone_speed;
    FlightTimeEstimate {
        num_laps,
        time_per_lap,
        time_total: time_per_lap * num_laps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn laps_round_up_to_cover_height() {
        let result = estimate(0.0, 12.0, &FlightConstants::default());
        assert_eq!(result.num_laps, 3.0);
        let exact = estimate(0.0, 10.0, &FlightConstants::default());
        assert_eq!(exact.num_laps, 2.0);
    }

    #[test]
    fn timings_for_hundred_meter_perimeter() {
        let result = estimate(100.0, 12.0, &FlightConstants::default());
        assert!((result.time_per_lap - 15.658554).abs() < 1e-5);
        assert!((result.time_total - 46.975662).abs() < 1e-5);
    }

    #[test]
    fn zero_height_needs_no_laps() {
        let result = estimate(250.0, 0.0, &FlightConstants::default());
        assert_eq!(result.num_laps, 0.0);
        assert_eq!(result.time_total, 0.0);
    }

    #[test]
    fn nan_height_propagates() {
        let result = estimate(100.0, f64::NAN, &FlightConstants::default());
        assert!(result.num_laps.is_nan());
        assert!(result.time_total.is_nan());
        assert!(result.time_per_lap.is_finite());
    }
}
