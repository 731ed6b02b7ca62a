//! Jitter-filtered PID controller that keeps the robot centred in a corridor.
//!
//! The controller only acts while walls are seen on both sides. Distances are
//! in pixels, the output is a heading change in degrees.

use mazebot_kinematics::{Pose, normalize_degrees, within_sector};
use tracing::trace;

use crate::config::{CorrectorConfig, SensorConfig};
use crate::map::{WallField, WorldPoint};

/// Controller memory carried from one tick to the next.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrectorState {
    /// Whether the previous tick was inside a corridor.
    pub active: bool,
    /// Running sum of balances for the integral term.
    pub integral_sum: f64,
    /// Balance seen on the previous tick.
    pub prev_balance: f64,
    /// Left wall distance seen on the previous tick.
    pub prev_left_dist: f64,
    /// Right wall distance seen on the previous tick.
    pub prev_right_dist: f64,
    /// Corridor width seen on the previous tick.
    pub prev_width: f64,
}

/// Distance in pixels to the nearest wall on each side.
///
/// A side with no wall in range reads `f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideWalls {
    /// Nearest wall in the left sector.
    pub left: f64,
    /// Nearest wall in the right sector.
    pub right: f64,
}

impl SideWalls {
    /// Both sides open.
    pub const NONE: SideWalls = SideWalls {
        left: f64::INFINITY,
        right: f64::INFINITY,
    };

    /// Whether walls were found on both sides.
    pub fn in_corridor(&self) -> bool {
        self.left.is_finite() && self.right.is_finite()
    }
}

/// Result of one controller update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    /// Heading after the correction, in `[0, 360)`.
    pub heading: f64,
    /// The heading change applied this tick, if the controller acted.
    pub delta: Option<f64>,
}

/// Course-correction controller.
#[derive(Debug, Clone)]
pub struct CourseCorrector {
    config: CorrectorConfig,
    side_range: f64,
    side_half_angle: f64,
}

impl CourseCorrector {
    /// Creates a controller for a field with the given pixel resolution.
    pub fn new(sensors: &SensorConfig, config: &CorrectorConfig, resolution: f64) -> Self {
        Self {
            config: config.clone(),
            side_range: sensors.side_range / resolution,
            side_half_angle: sensors.side_angle / 2.0,
        }
    }

    /// Finds the nearest wall cell in each side sector.
    ///
    /// Left and right follow the travel direction, so they swap in reverse mode.
    pub fn side_walls(&self, pose: &Pose, field: &WallField) -> SideWalls {
        let origin = field.world_to_pixel(WorldPoint::new(pose.x, pose.y));
        let reference = pose.travel_direction();
        let mut walls = SideWalls::NONE;

        for cell in field.walls_near(origin, self.side_range) {
            let dist = origin.distance_to(cell);
            if dist > self.side_range {
                continue;
            }
            let relative = normalize_degrees(origin.bearing_to(cell) - reference);
            if within_sector(relative, 90.0, self.side_half_angle) {
                if dist < walls.right {
                    walls.right = dist;
                }
            } else if within_sector(relative, 270.0, self.side_half_angle) && dist < walls.left {
                walls.left = dist;
            }
        }
        walls
    }

    /// Runs the controller on measured side distances.
    ///
    /// Returns the heading change to apply (if any) and the state for the next tick.
    /// The change is skipped on the first corridor tick and whenever the width or
    /// the left/right asymmetry jumped by more than the jitter thresholds; the
    /// state is refreshed either way. Leaving the corridor clears the state.
    pub fn update(&self, walls: SideWalls, state: &CorrectorState) -> (Option<f64>, CorrectorState) {
        if !walls.in_corridor() {
            return (
                None,
                CorrectorState {
                    active: false,
                    integral_sum: 0.0,
                    ..state.clone()
                },
            );
        }

        let balance = walls.left - walls.right;
        let width = walls.left + walls.right;
        let mut next = CorrectorState {
            active: true,
            integral_sum: state.integral_sum,
            prev_balance: balance,
            prev_left_dist: walls.left,
            prev_right_dist: walls.right,
            prev_width: width,
        };

        if !state.active {
            return (None, next);
        }

        let width_jump = (width - state.prev_width).abs();
        let left_change = (walls.left - state.prev_left_dist).abs();
        let right_change = (walls.right - state.prev_right_dist).abs();
        let asymmetry = (left_change - right_change).abs();
        if width_jump >= self.config.jitter_width || asymmetry >= self.config.jitter_asymmetry {
            trace!(width_jump, asymmetry, "corrector jitter gate closed");
            return (None, next);
        }

        next.integral_sum += balance;
        let derivative = balance - state.prev_balance;
        let delta = -(self.config.p * balance + self.config.i * next.integral_sum + self.config.d * derivative);
        (Some(delta), next)
    }

    /// Senses the side walls around `pose` and returns the corrected heading
    /// together with the state for the next tick.
    pub fn correct(&self, pose: &Pose, field: &WallField, state: &CorrectorState) -> (Correction, CorrectorState) {
        let walls = self.side_walls(pose, field);
        let (delta, next) = self.update(walls, state);
        let heading = match delta {
            Some(d) => normalize_degrees(pose.heading + d),
            None => pose.heading,
        };
        (Correction { heading, delta }, next)
    }
}
