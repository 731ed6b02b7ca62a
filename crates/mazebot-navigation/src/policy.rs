//! Commands exchanged with the navigation strategy, and the strategy contract itself.

use core::fmt;

use crate::junction::LinkAngleSet;
use crate::map::WorldPoint;
use crate::sensor::SensorReading;

/// Decision taken on an ordinary tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavCommand {
    /// Keep driving along the current heading.
    Continue,
    /// Stop and evaluate a junction scan this tick.
    Junction,
}

/// Which way the robot drives relative to its heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TravelDirection {
    /// Drive along the heading.
    #[default]
    Forward,
    /// Drive opposite to the heading, sensors still facing the heading.
    Reverse,
}

impl TravelDirection {
    pub fn is_reverse(self) -> bool {
        self == TravelDirection::Reverse
    }
}

/// Decision taken at a junction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JunctionCommand {
    /// Navigation is complete.
    End,
    /// Turn by `degrees` (clockwise positive) and drive in `direction`.
    Rotate {
        degrees: f64,
        direction: TravelDirection,
    },
}

impl fmt::Display for JunctionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JunctionCommand::End => write!(f, "end"),
            JunctionCommand::Rotate { degrees, direction } => {
                let dir = match direction {
                    TravelDirection::Forward => "forward",
                    TravelDirection::Reverse => "reverse",
                };
                write!(f, "rotate {:.2}° {}", degrees, dir)
            }
        }
    }
}

/// Maze-solving strategy driven by the simulation loop.
///
/// The loop calls [`NavigationPolicy::default_navigate`] on every travelling
/// tick and [`NavigationPolicy::junction_navigate`] whenever a junction is
/// evaluated. Positions are metric; headings are compass degrees.
pub trait NavigationPolicy {
    /// Decides whether to keep going or to stop at a junction.
    fn default_navigate(&mut self, position: WorldPoint, heading: f64, reading: &SensorReading) -> NavCommand;

    /// Picks the next direction from the open links, or ends navigation.
    fn junction_navigate(&mut self, position: WorldPoint, heading: f64, links: &LinkAngleSet) -> JunctionCommand;
}
