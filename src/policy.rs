use mazebot_kinematics::{angle_difference, compass_bearing, normalize_degrees};
use mazebot_navigation::{
    JunctionCommand, LinkAngleSet, NavCommand, NavigationPolicy, SensorReading, TravelDirection, WorldPoint,
};

/// Links closer than this to straight back count as the way we came.
const BACKTRACK_CONE: f64 = 45.0;

/// Demo strategy: at every junction take the open link pointing most directly
/// at the goal, avoiding the corridor we came from while any other link exists.
///
/// A junction is evaluated when the front is blocked or a side wall that was
/// there on the previous tick disappears.
#[derive(Debug, Clone)]
pub struct GreedyPolicy {
    goal: WorldPoint,
    tolerance: f64,
    last_reading: Option<SensorReading>,
}

impl GreedyPolicy {
    pub fn new(goal: WorldPoint, tolerance: f64) -> Self {
        Self {
            goal,
            tolerance,
            last_reading: None,
        }
    }

    fn arrived(&self, position: WorldPoint) -> bool {
        position.distance(self.goal) <= self.tolerance
    }

    fn goal_bearing(&self, position: WorldPoint) -> f64 {
        compass_bearing(self.goal.x - position.x, self.goal.y - position.y)
    }
}

impl NavigationPolicy for GreedyPolicy {
    fn default_navigate(&mut self, position: WorldPoint, _heading: f64, reading: &SensorReading) -> NavCommand {
        let side_opened = self
            .last_reading
            .is_some_and(|last| (last.left && !reading.left) || (last.right && !reading.right));
        self.last_reading = Some(*reading);

        if self.arrived(position) || reading.front || side_opened {
            NavCommand::Junction
        } else {
            NavCommand::Continue
        }
    }

    fn junction_navigate(&mut self, position: WorldPoint, heading: f64, links: &LinkAngleSet) -> JunctionCommand {
        self.last_reading = None;
        if self.arrived(position) {
            return JunctionCommand::End;
        }

        let goal = self.goal_bearing(position);
        let target = match links {
            LinkAngleSet::FullyOpen => goal,
            LinkAngleSet::Links(angles) if angles.is_empty() => normalize_degrees(heading + 180.0),
            LinkAngleSet::Links(angles) => {
                let back = heading + 180.0;
                let forward: Vec<f64> = angles
                    .iter()
                    .copied()
                    .filter(|a| angle_difference(back, *a).abs() > BACKTRACK_CONE)
                    .collect();
                let candidates = if forward.is_empty() { angles.as_slice() } else { &forward };
                // First link wins ties.
                candidates
                    .iter()
                    .copied()
                    .fold(None, |best: Option<f64>, a| match best {
                        Some(b) if angle_difference(goal, b).abs() <= angle_difference(goal, a).abs() => Some(b),
                        _ => Some(a),
                    })
                    .unwrap_or(goal)
            }
        };

        JunctionCommand::Rotate {
            degrees: angle_difference(heading, target),
            direction: TravelDirection::Forward,
        }
    }
}
