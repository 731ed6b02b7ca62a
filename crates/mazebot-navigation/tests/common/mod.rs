//! Shared fixtures for the navigation integration tests.

#![allow(dead_code)]

use mazebot_kinematics::angle_difference;
use mazebot_navigation::{
    JunctionCommand, LinkAngleSet, NavCommand, NavigationPolicy, SensorReading, TravelDirection, WallField,
    WallSegment, WorldPoint,
};

pub const RESOLUTION: f64 = 0.01;
pub const HALF_WIDTH: f64 = 0.01;

/// Rasterizes an arena of the given extent with its boundary and extra walls.
pub fn arena(x_lim: f64, y_lim: f64, walls: &[WallSegment]) -> WallField {
    let mut segments = WallSegment::boundary(x_lim, y_lim).to_vec();
    segments.extend_from_slice(walls);
    WallField::build(x_lim, y_lim, RESOLUTION, &segments, HALF_WIDTH).unwrap()
}

/// Follows corridors until blocked, then takes the link pointing farthest
/// from the way it came. Ends once within `tolerance` of `goal`.
pub struct CorridorFollower {
    pub goal: WorldPoint,
    pub tolerance: f64,
}

impl CorridorFollower {
    pub fn new(goal: WorldPoint) -> Self {
        Self { goal, tolerance: 0.01 }
    }

    fn arrived(&self, position: WorldPoint) -> bool {
        position.distance(self.goal) <= self.tolerance
    }
}

impl NavigationPolicy for CorridorFollower {
    fn default_navigate(&mut self, position: WorldPoint, _heading: f64, reading: &SensorReading) -> NavCommand {
        if self.arrived(position) || reading.front {
            NavCommand::Junction
        } else {
            NavCommand::Continue
        }
    }

    fn junction_navigate(&mut self, position: WorldPoint, heading: f64, links: &LinkAngleSet) -> JunctionCommand {
        if self.arrived(position) {
            return JunctionCommand::End;
        }
        let back = heading + 180.0;
        // First link wins ties.
        let mut best: Option<(f64, f64)> = None;
        for &link in links.angles() {
            let away = angle_difference(back, link).abs();
            if best.is_none_or(|(_, b)| away > b) {
                best = Some((link, away));
            }
        }
        let degrees = match best {
            Some((link, _)) => angle_difference(heading, link),
            None => 180.0,
        };
        JunctionCommand::Rotate {
            degrees,
            direction: TravelDirection::Forward,
        }
    }
}

/// Never ends and never turns.
pub struct Wanderer;

impl NavigationPolicy for Wanderer {
    fn default_navigate(&mut self, _: WorldPoint, _: f64, _: &SensorReading) -> NavCommand {
        NavCommand::Continue
    }

    fn junction_navigate(&mut self, _: WorldPoint, _: f64, _: &LinkAngleSet) -> JunctionCommand {
        JunctionCommand::Rotate {
            degrees: 0.0,
            direction: TravelDirection::Forward,
        }
    }
}
