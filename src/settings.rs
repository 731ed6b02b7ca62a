use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File, FileFormat};
use mazebot_navigation::SimConfig;
use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Which maze to load and when the demo policy counts the goal as reached.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub path: PathBuf,
    /// Distance to the end point, in meters, at which navigation ends.
    pub goal_tolerance: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("scenarios/maze_3.toml"),
            goal_tolerance: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Capacity of the telemetry topic.
    pub capacity: usize,
    /// Log one tick out of this many.
    pub log_every: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            log_every: 100,
        }
    }
}

/// Settings for one run of the driver.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimConfig,
    pub scenario: ScenarioConfig,
    pub telemetry: TelemetryConfig,
}

/// Loads the driver configuration from `path`, then applies `MAZEBOT_*`
/// environment overrides (`MAZEBOT_SIMULATION__SPEED=0.02`).
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix("MAZEBOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|c| c.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_shipped_defaults_parse() {
        let config = parse(include_str!("../config/default.toml"));
        assert_eq!(config.simulation, SimConfig::default());
        assert!(config.simulation.validate().is_ok());
        assert_eq!(config.scenario.path, PathBuf::from("scenarios/maze_3.toml"));
        assert_eq!(config.telemetry.log_every, 100);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse(
            r#"
            [simulation]
            speed = 0.02

            [simulation.corrector]
            p = 0.5
            "#,
        );
        assert_eq!(config.simulation.speed, 0.02);
        assert_eq!(config.simulation.corrector.p, 0.5);
        assert_eq!(config.simulation.corrector.d, 0.3);
        assert_eq!(config.simulation.max_iterations, 10_000);
        assert_eq!(config.telemetry.capacity, 1024);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config("config/does-not-exist.toml").is_err());
    }
}
