#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for the pose and motion of a point robot in a maze."]
#![doc = ""]
#![doc = "Headings are compass-style: degrees, 0° points up the map (\"north\"),"]
#![doc = "angles increase clockwise, and the vertical axis grows downwards."]

use core::fmt;
use libm::{atan2, cos, fabs, fmod, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// Normalize a compass angle to be within `[0, 360)` degrees.
///
/// # Arguments
///
/// * `angle`: The angle in degrees to normalize.
///
/// # Returns
///
/// The normalized angle in degrees.
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = fmod(angle, 360.0);
    let a = if a < 0.0 { a + 360.0 } else { a };
    // A tiny negative input rounds up to exactly 360 after the shift.
    if a >= 360.0 { 0.0 } else { a }
}

/// Signed shortest rotation, in degrees, that turns `from` onto `to`.
///
/// The result lies in `(-180, 180]`; positive values turn clockwise.
pub fn angle_difference(from: f64, to: f64) -> f64 {
    let d = normalize_degrees(to - from);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Converts a compass direction into a standard mathematical angle in radians
/// (counter-clockwise from the positive x-axis).
pub fn compass_to_math_radians(direction: f64) -> f64 {
    normalize_degrees(90.0 - direction).to_radians()
}

/// Compass bearing of the vector `(dx, dy)` expressed in a pixel-down frame
/// (x grows right, y grows down).
///
/// A vector pointing up the map has bearing 0°, one pointing right has 90°.
/// The zero vector has bearing 90°.
pub fn compass_bearing(dx: f64, dy: f64) -> f64 {
    let math = normalize_degrees(atan2(-dy, dx).to_degrees());
    normalize_degrees(90.0 - math)
}

/// Whether `angle` lies within `half_width` degrees of `centre`, boundaries included.
///
/// `angle` and `centre` are expected in `[0, 360)`; sectors straddling 0° are
/// split into two ranges instead of being shifted, so boundary values compare
/// exactly.
pub fn within_sector(angle: f64, centre: f64, half_width: f64) -> bool {
    if fabs(half_width) >= 180.0 {
        return true;
    }
    let lo = centre - half_width;
    let hi = centre + half_width;
    if lo < 0.0 {
        angle <= hi || angle >= lo + 360.0
    } else if hi >= 360.0 {
        angle >= lo || angle <= hi - 360.0
    } else {
        angle >= lo && angle <= hi
    }
}

/// Pose of the robot: metric position, compass heading, and travel mode.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World-frame x position (m).
    pub x: f64,
    /// World-frame y position (m), growing downwards.
    pub y: f64,
    /// Heading of the sensor head (deg), normalized to `[0, 360)`.
    pub heading: f64,
    /// When set, the robot drives backwards relative to its heading.
    pub reverse: bool,
}

impl Pose {
    /// Construct a new forward-driving pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position in meters.
    /// * `y`: World-frame y position in meters.
    /// * `heading`: Compass heading in degrees; normalized on construction.
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Pose {
            x,
            y,
            heading: normalize_degrees(heading),
            reverse: false,
        }
    }

    /// Direction the robot actually travels in: the heading, or its opposite in reverse.
    pub fn travel_direction(&self) -> f64 {
        if self.reverse {
            normalize_degrees(self.heading + 180.0)
        } else {
            self.heading
        }
    }

    /// Returns this pose turned by `degrees` (clockwise positive).
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidRotation)` if `degrees` is not finite.
    pub fn rotated(self, degrees: f64) -> Result<Pose, KinematicsError> {
        if !degrees.is_finite() {
            return Err(KinematicsError::InvalidRotation("must be finite"));
        }
        Ok(Pose {
            heading: normalize_degrees(self.heading + degrees),
            ..self
        })
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x: {:.3}, y: {:.3}, heading: {:.1}°{})",
            self.x,
            self.y,
            self.heading,
            if self.reverse { ", reverse" } else { "" }
        )
    }
}

/// Fixed-step motion model.
///
/// Every call to [`MotionIntegrator::advance`] moves the robot a constant
/// distance along its travel direction. Heading is left untouched.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionIntegrator {
    /// Distance travelled per step (m).
    speed: f64,
}

impl MotionIntegrator {
    /// Construct a new integrator.
    ///
    /// # Arguments
    ///
    /// * `speed`: Distance travelled per step in meters.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidSpeed)` if `speed` is not positive and finite.
    pub fn new(speed: f64) -> Result<Self, KinematicsError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(KinematicsError::InvalidSpeed("must be positive and finite"));
        }
        Ok(MotionIntegrator { speed })
    }

    /// Returns the step size.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Advances the pose by one step along its travel direction.
    ///
    /// The vertical component is subtracted because y grows downwards.
    pub fn advance(&self, pose: Pose) -> Pose {
        let theta = compass_to_math_radians(pose.travel_direction());
        Pose {
            x: pose.x + self.speed * cos(theta),
            y: pose.y - self.speed * sin(theta),
            ..pose
        }
    }
}

impl fmt::Display for MotionIntegrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MotionIntegrator (step: {:.3} m)", self.speed)
    }
}
