mod common;

use common::{CorridorFollower, Wanderer, arena};
use mazebot_kinematics::{MotionIntegrator, Pose, angle_difference};
use mazebot_navigation::{
    CorrectorConfig, CorrectorState, CourseCorrector, JunctionCommand, LinkAngleSet, NavCommand, NavigationError,
    NavigationPolicy, Outcome, PixelPoint, SensorConfig, SensorReading, SimConfig, Simulation, TravelDirection,
    WallSegment, WorldPoint,
};

fn chebyshev(a: PixelPoint, b: PixelPoint) -> i64 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

#[test]
fn test_l_corridor_reaches_goal() {
    let field = arena(
        1.5,
        1.0,
        &[WallSegment::new(0.5, 0.0, 0.5, 0.5), WallSegment::new(0.5, 0.5, 1.5, 0.5)],
    );
    let goal = WorldPoint::new(1.25, 0.75);
    let goal_px = field.world_to_pixel(goal);

    let sim = Simulation::new(field, SimConfig::default(), Pose::new(0.25, 0.25, 180.0)).unwrap();
    let report = sim.run(&mut CorridorFollower::new(goal), &mut ()).unwrap();

    assert_eq!(report.outcome, Outcome::Terminated);
    assert!(report.iterations < 1_000);
    let last = *report.path.last().unwrap();
    assert!(chebyshev(last, goal_px) <= 1, "stopped at {:?}", last);

    // One forced junction at the start, one at the corner, one at the goal.
    assert!(report.junctions.len() >= 3);
    assert_eq!(report.junctions[0].iteration, 1);
    assert!(matches!(report.junctions.last().unwrap().command, JunctionCommand::End));

    // After the corner the robot only ever gets closer to the goal.
    let corner = report.junctions[1].iteration as usize;
    let distances: Vec<f64> = report.path[corner - 1..]
        .iter()
        .map(|p| WorldPoint::new(p.x as f64 * 0.01, p.y as f64 * 0.01).distance(goal))
        .collect();
    for pair in distances.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-12, "moved away from goal: {:?}", pair);
    }
}

#[test]
fn test_u_corridor_reaches_goal() {
    let field = arena(
        1.5,
        1.0,
        &[
            WallSegment::new(0.5, 0.0, 0.5, 0.5),
            WallSegment::new(0.5, 0.5, 1.0, 0.5),
            WallSegment::new(1.0, 0.5, 1.0, 0.0),
        ],
    );
    let goal = WorldPoint::new(1.25, 0.25);
    let goal_px = field.world_to_pixel(goal);

    let sim = Simulation::new(field, SimConfig::default(), Pose::new(0.25, 0.25, 180.0)).unwrap();
    let report = sim.run(&mut CorridorFollower::new(goal), &mut ()).unwrap();

    assert_eq!(report.outcome, Outcome::Terminated);
    assert!(report.iterations < 1_000);
    let last = *report.path.last().unwrap();
    assert!(chebyshev(last, goal_px) <= 1, "stopped at {:?}", last);

    // Once the final turn points down the last leg, the distance never grows.
    assert!(report.junctions.len() >= 2);
    assert!(matches!(report.junctions.last().unwrap().command, JunctionCommand::End));
    let final_turn = &report.junctions[report.junctions.len() - 2];
    assert!(matches!(final_turn.command, JunctionCommand::Rotate { .. }));
    let distances: Vec<f64> = report.path[final_turn.iteration as usize - 1..]
        .iter()
        .map(|p| WorldPoint::new(p.x as f64 * 0.01, p.y as f64 * 0.01).distance(goal))
        .collect();
    for pair in distances.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-12, "moved away from goal: {:?}", pair);
    }
}

#[test]
fn test_policy_that_never_ends_times_out() {
    let field = arena(1.5, 1.0, &[]);
    let sim = Simulation::new(field, SimConfig::default(), Pose::new(0.25, 0.25, 180.0)).unwrap();
    let report = sim.run(&mut Wanderer, &mut ()).unwrap();

    assert_eq!(report.outcome, Outcome::TimedOut);
    assert_eq!(report.iterations, 10_001);
    assert_eq!(report.path.len(), 10_000);
}

#[test]
fn test_non_finite_rotation_aborts() {
    struct Broken;

    impl NavigationPolicy for Broken {
        fn default_navigate(&mut self, _: WorldPoint, _: f64, _: &SensorReading) -> NavCommand {
            NavCommand::Continue
        }

        fn junction_navigate(&mut self, _: WorldPoint, _: f64, _: &LinkAngleSet) -> JunctionCommand {
            JunctionCommand::Rotate {
                degrees: f64::NAN,
                direction: TravelDirection::Forward,
            }
        }
    }

    let field = arena(1.5, 1.0, &[]);
    let sim = Simulation::new(field, SimConfig::default(), Pose::new(0.25, 0.25, 180.0)).unwrap();
    match sim.run(&mut Broken, &mut ()) {
        Err(NavigationError::InvalidCommand(cmd)) => assert!(cmd.contains("NaN"), "{}", cmd),
        other => panic!("expected InvalidCommand, got {:?}", other.map(|r| r.outcome)),
    }
}

#[test]
fn test_corrector_centres_robot_in_corridor() {
    let field = arena(0.5, 3.0, &[]);
    let sensors = SensorConfig::default();
    let corrector = CourseCorrector::new(&sensors, &CorrectorConfig::default(), field.resolution());
    let motion = MotionIntegrator::new(0.01).unwrap();

    let mut pose = Pose::new(0.18, 0.3, 180.0);
    let mut state = CorrectorState::default();
    let mut balances = Vec::new();
    let mut max_turn: f64 = 0.0;

    for _ in 0..240 {
        let walls = corrector.side_walls(&pose, &field);
        balances.push(walls.left - walls.right);
        let (correction, next) = corrector.correct(&pose, &field, &state);
        max_turn = max_turn.max(angle_difference(pose.heading, correction.heading).abs());
        state = next;
        pose.heading = correction.heading;
        pose = motion.advance(pose);
    }

    assert!(balances[0].abs() > 10.0);
    let settled = balances[220..].iter().fold(0.0_f64, |m, b| m.max(b.abs()));
    assert!(settled <= 6.0, "balance still {} after 220 ticks", settled);
    assert!(max_turn <= 6.0, "turned {} degrees in one tick", max_turn);
}
