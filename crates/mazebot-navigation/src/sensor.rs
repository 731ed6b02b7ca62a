//! Directional proximity sensing against the wall field.

use core::fmt;

use mazebot_kinematics::{Pose, normalize_degrees, within_sector};

use crate::config::SensorConfig;
use crate::map::{WallField, WorldPoint};

/// Which of the four proximity sensors see a wall this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    /// A wall ahead, within front range.
    pub front: bool,
    /// A wall to the right, within side range.
    pub right: bool,
    /// A wall behind, within front range.
    pub back: bool,
    /// A wall to the left, within side range.
    pub left: bool,
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "[{}{}{}{}]",
            flag(self.front, 'F'),
            flag(self.right, 'R'),
            flag(self.back, 'B'),
            flag(self.left, 'L')
        )
    }
}

/// Models four proximity sensors fixed to the robot's heading.
///
/// The robot is a point, so each wall cell feeds at most one sensor, checked
/// in front, right, back, left order.
#[derive(Debug, Clone)]
pub struct SensorModel {
    front_range: f64,
    side_range: f64,
    front_half_angle: f64,
    side_half_angle: f64,
}

impl SensorModel {
    /// Creates a sensor model for a field with the given pixel resolution.
    pub fn new(config: &SensorConfig, resolution: f64) -> Self {
        Self {
            front_range: config.front_range / resolution,
            side_range: config.side_range / resolution,
            front_half_angle: config.front_angle / 2.0,
            side_half_angle: config.side_angle / 2.0,
        }
    }

    /// Reads all four sensors for the robot at `pose`.
    ///
    /// Sensors follow the heading, not the travel direction.
    pub fn sense(&self, pose: &Pose, field: &WallField) -> SensorReading {
        let origin = field.world_to_pixel(WorldPoint::new(pose.x, pose.y));
        let mut reading = SensorReading::default();

        for cell in field.walls_near(origin, self.front_range.max(self.side_range)) {
            let dist = origin.distance_to(cell);
            let relative = normalize_degrees(origin.bearing_to(cell) - pose.heading);

            if dist <= self.front_range && within_sector(relative, 0.0, self.front_half_angle) {
                reading.front = true;
            } else if dist <= self.side_range && within_sector(relative, 90.0, self.side_half_angle) {
                reading.right = true;
            } else if dist <= self.front_range && within_sector(relative, 180.0, self.front_half_angle) {
                reading.back = true;
            } else if dist <= self.side_range && within_sector(relative, 270.0, self.side_half_angle) {
                reading.left = true;
            }
        }
        reading
    }
}
