#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines the errors that can occur while constructing motion
//! models or applying commands to a pose.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for an invalid step size.
    /// This variant is returned when the fixed step is not a positive, finite distance.
    InvalidSpeed(&'static str),
    /// Error for an invalid rotation.
    /// This variant is returned when a rotation command is NaN or infinite.
    InvalidRotation(&'static str),
}

impl core::fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidSpeed(msg) => write!(f, "Invalid step size: {}", msg),
            KinematicsError::InvalidRotation(msg) => write!(f, "Invalid rotation: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
