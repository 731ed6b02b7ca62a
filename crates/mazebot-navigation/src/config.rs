//! Tunable constants for sensing, course correction, and the simulation loop.
//!
//! All ranges are in meters and all angles in degrees. Values are fixed for
//! the lifetime of a run.

use crate::error::NavigationError;

/// Proximity sensor and junction scan parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorConfig {
    /// Range of the front and back sensors (m).
    pub front_range: f64,
    /// Range of the side sensors (m).
    pub side_range: f64,
    /// Range of the radial junction scan (m).
    pub scan_range: f64,
    /// Full angle of acceptance of the front and back sensors (deg).
    pub front_angle: f64,
    /// Full angle of acceptance of the side sensors (deg).
    pub side_angle: f64,
    /// Number of angular bins in a junction scan.
    pub scan_resolution: usize,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            front_range: 0.2,
            side_range: 0.4,
            scan_range: 0.5,
            front_angle: 45.0,
            side_angle: 20.0,
            scan_resolution: 64,
        }
    }
}

/// Gains and jitter thresholds of the course-correction controller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CorrectorConfig {
    /// Proportional gain (deg per pixel of imbalance).
    pub p: f64,
    /// Integral gain.
    pub i: f64,
    /// Derivative gain.
    pub d: f64,
    /// Largest tick-to-tick change in corridor width, in pixels, that still counts as signal.
    pub jitter_width: f64,
    /// Largest tick-to-tick asymmetry between left and right distance changes, in pixels.
    pub jitter_asymmetry: f64,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            p: 0.3,
            i: 0.0001,
            d: 0.3,
            jitter_width: 1.5,
            jitter_asymmetry: 1.5,
        }
    }
}

/// Complete configuration of a simulation run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Sensor ranges and acceptance angles.
    pub sensors: SensorConfig,
    /// Course-correction controller settings.
    pub corrector: CorrectorConfig,
    /// Meters per pixel.
    pub pixel_resolution: f64,
    /// Half-width tolerance used when rasterizing walls (m).
    pub wall_half_width: f64,
    /// Distance travelled per tick (m).
    pub speed: f64,
    /// Ticks allowed before the run is declared timed out.
    pub max_iterations: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sensors: SensorConfig::default(),
            corrector: CorrectorConfig::default(),
            pixel_resolution: 0.01,
            wall_half_width: 0.01,
            speed: 0.01,
            max_iterations: 10_000,
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl SimConfig {
    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidResolution` for a bad pixel resolution and
    /// `NavigationError::InvalidConfig` naming the first other offending field.
    pub fn validate(&self) -> Result<(), NavigationError> {
        if !positive(self.pixel_resolution) {
            return Err(NavigationError::InvalidResolution("pixel_resolution must be positive"));
        }
        let s = &self.sensors;
        if !positive(s.front_range) || !positive(s.side_range) || !positive(s.scan_range) {
            return Err(NavigationError::InvalidConfig("sensor ranges must be positive"));
        }
        if !positive(s.front_angle) || !positive(s.side_angle) {
            return Err(NavigationError::InvalidConfig("sensor angles must be positive"));
        }
        if s.scan_resolution == 0 {
            return Err(NavigationError::InvalidConfig("scan_resolution must be non-zero"));
        }
        let c = &self.corrector;
        if ![c.p, c.i, c.d].iter().all(|g| g.is_finite()) {
            return Err(NavigationError::InvalidConfig("controller gains must be finite"));
        }
        if !positive(c.jitter_width) || !positive(c.jitter_asymmetry) {
            return Err(NavigationError::InvalidConfig("jitter thresholds must be positive"));
        }
        if !self.wall_half_width.is_finite() || self.wall_half_width < 0.0 {
            return Err(NavigationError::InvalidConfig("wall_half_width must be non-negative"));
        }
        if !positive(self.speed) {
            return Err(NavigationError::InvalidConfig("speed must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(NavigationError::InvalidConfig("max_iterations must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_iterations, 10_000);
        assert_eq!(config.sensors.scan_resolution, 64);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = SimConfig::default();
        config.pixel_resolution = 0.0;
        assert!(matches!(config.validate(), Err(NavigationError::InvalidResolution(_))));

        let mut config = SimConfig::default();
        config.sensors.scan_resolution = 0;
        assert!(matches!(config.validate(), Err(NavigationError::InvalidConfig(_))));

        let mut config = SimConfig::default();
        config.corrector.d = f64::NAN;
        assert!(matches!(config.validate(), Err(NavigationError::InvalidConfig(_))));

        let mut config = SimConfig::default();
        config.speed = -0.01;
        assert!(matches!(config.validate(), Err(NavigationError::InvalidConfig(_))));

        let mut config = SimConfig::default();
        config.max_iterations = 0;
        assert!(matches!(config.validate(), Err(NavigationError::InvalidConfig(_))));
    }
}
