//! This module defines the error types used by the `mazebot-navigation` crate.

#![warn(missing_docs)]

use mazebot_kinematics::KinematicsError;

/// Error type for navigation operations.
///
/// This enum encapsulates all possible errors that can occur while building the
/// wall field, validating configuration, or running the simulation loop.
#[derive(Debug, PartialEq)]
pub enum NavigationError {
    /// Error for invalid map resolution.
    /// This variant is returned when a pixel resolution is provided that is not positive.
    InvalidResolution(&'static str),
    /// Error for invalid map dimensions.
    /// This variant is returned when map width or height is zero or too large.
    InvalidDimensions(&'static str),
    /// Error for out-of-bounds access.
    /// This variant is returned when attempting to access cells outside the grid.
    OutOfBounds(&'static str),
    /// Error for placing a start or end marker on a cell that is already taken.
    CellOccupied(&'static str),
    /// Error for an invalid configuration value.
    InvalidConfig(&'static str),
    /// The navigation policy returned a command the loop cannot execute.
    /// Carries a description of the offending command.
    InvalidCommand(String),
    /// Error raised by the motion model.
    Kinematics(KinematicsError),
}

impl core::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NavigationError::InvalidResolution(msg) => write!(f, "Invalid map resolution: {}", msg),
            NavigationError::InvalidDimensions(msg) => write!(f, "Invalid map dimensions: {}", msg),
            NavigationError::OutOfBounds(msg) => write!(f, "Map access out of bounds: {}", msg),
            NavigationError::CellOccupied(msg) => write!(f, "Cell already occupied: {}", msg),
            NavigationError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            NavigationError::InvalidCommand(cmd) => {
                write!(f, "Invalid navigation command: {}", cmd)
            }
            NavigationError::Kinematics(e) => write!(f, "Kinematics error: {}", e),
        }
    }
}

impl core::error::Error for NavigationError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            NavigationError::Kinematics(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KinematicsError> for NavigationError {
    fn from(e: KinematicsError) -> Self {
        NavigationError::Kinematics(e)
    }
}
