//! Perception and control for a point robot exploring a rasterized maze.
//!
//! Wall segments are rasterized into a [`WallField`]. Each simulation tick reads
//! four proximity sensors ([`SensorModel`]), optionally scans for open links at a
//! junction ([`JunctionScanner`]), keeps the robot centred in corridors
//! ([`CourseCorrector`]), and moves it one fixed step. Route choice is left to a
//! caller-supplied [`NavigationPolicy`].

pub mod config;
pub mod corrector;
pub mod error;
pub mod junction;
pub mod map;
pub mod policy;
pub mod sensor;
pub mod simulation;

pub use config::{CorrectorConfig, SensorConfig, SimConfig};
pub use corrector::{Correction, CorrectorState, CourseCorrector, SideWalls};
pub use error::NavigationError;
pub use junction::{JunctionScanner, LinkAngleSet, link_angles};
pub use map::{CellKind, GridPoint, PixelPoint, WallField, WallSegment, WorldPoint};
pub use policy::{JunctionCommand, NavCommand, NavigationPolicy, TravelDirection};
pub use sensor::{SensorModel, SensorReading};
pub use simulation::{JunctionRecord, Outcome, SimState, Simulation, SimulationReport, TelemetrySink, TickRecord};

pub use mazebot_kinematics::{MotionIntegrator, Pose};
