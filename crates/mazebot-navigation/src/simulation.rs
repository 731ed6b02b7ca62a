//! The tick loop tying sensing, junction handling, course correction and motion together.
//!
//! A [`Simulation`] owns every piece of per-run state. Each call to
//! [`Simulation::step`] performs one full tick; [`Simulation::run`] ticks until
//! the policy ends navigation or the iteration cap is exceeded.

use mazebot_kinematics::{MotionIntegrator, Pose};

use crate::config::SimConfig;
use crate::corrector::{CorrectorState, CourseCorrector};
use crate::error::NavigationError;
use crate::junction::{JunctionScanner, LinkAngleSet};
use crate::map::{PixelPoint, WallField, WorldPoint};
use crate::policy::{JunctionCommand, NavCommand, NavigationPolicy};
use crate::sensor::{SensorModel, SensorReading};

/// Phase of the tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimState {
    /// Moving along a corridor under the default policy.
    Traveling,
    /// The current tick scans for links and asks the junction policy.
    AtJunction,
    /// The junction policy ended navigation.
    Terminated,
    /// The iteration cap was exceeded.
    TimedOut,
}

impl SimState {
    /// Whether the loop has stopped for good.
    pub fn is_finished(self) -> bool {
        matches!(self, SimState::Terminated | SimState::TimedOut)
    }
}

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// The policy signalled the end of navigation.
    Terminated,
    /// The iteration cap was exceeded.
    TimedOut,
}

/// Telemetry emitted after every tick that moved the robot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickRecord {
    /// Iteration counter value for this tick, starting at 1.
    pub iteration: u64,
    /// Pixel position after the move.
    pub pixel: PixelPoint,
    /// Pose after the move.
    pub pose: Pose,
    /// Sensor reading that fed the policy. `None` on the first tick, which
    /// goes straight to a junction evaluation.
    pub reading: Option<SensorReading>,
    /// Whether the course corrector changed the heading.
    pub corrected: bool,
}

/// Telemetry emitted for every junction evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JunctionRecord {
    /// Tick on which the junction was evaluated.
    pub iteration: u64,
    /// Robot position when the scan ran.
    pub position: WorldPoint,
    /// Heading before the command was applied.
    pub heading: f64,
    /// Open directions reported by the scan.
    pub links: LinkAngleSet,
    /// What the junction policy decided.
    pub command: JunctionCommand,
}

/// Receiver of per-tick telemetry. The loop never reads anything back.
///
/// `()` is a sink that drops everything.
pub trait TelemetrySink {
    fn on_tick(&mut self, _record: &TickRecord) {}

    fn on_junction(&mut self, _record: &JunctionRecord) {}
}

impl TelemetrySink for () {}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationReport {
    /// How the run stopped.
    pub outcome: Outcome,
    /// Value of the iteration counter when the loop stopped.
    pub iterations: u64,
    /// Pose when the loop stopped.
    pub final_pose: Pose,
    /// Pixel position after each completed tick.
    pub path: Vec<PixelPoint>,
    /// Every junction evaluation, in order.
    pub junctions: Vec<JunctionRecord>,
}

/// Simulation context for one run.
#[derive(Debug)]
pub struct Simulation {
    field: WallField,
    config: SimConfig,
    sensors: SensorModel,
    scanner: JunctionScanner,
    corrector: CourseCorrector,
    motion: MotionIntegrator,
    pose: Pose,
    corrector_state: CorrectorState,
    iterations: u64,
    path: Vec<PixelPoint>,
    junctions: Vec<JunctionRecord>,
    state: SimState,
}

impl Simulation {
    /// Creates a simulation on a rasterized field.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidConfig` if `config` fails validation, if
    /// the field was built with a different pixel resolution, or if the start
    /// pose is not finite.
    pub fn new(field: WallField, config: SimConfig, start: Pose) -> Result<Self, NavigationError> {
        config.validate()?;
        if (field.resolution() - config.pixel_resolution).abs() > f64::EPSILON {
            return Err(NavigationError::InvalidConfig(
                "field resolution differs from pixel_resolution",
            ));
        }
        if !(start.x.is_finite() && start.y.is_finite() && start.heading.is_finite()) {
            return Err(NavigationError::InvalidConfig("start pose must be finite"));
        }

        let resolution = field.resolution();
        let motion = MotionIntegrator::new(config.speed)?;
        let max_iterations = config.max_iterations;

        Ok(Self {
            sensors: SensorModel::new(&config.sensors, resolution),
            scanner: JunctionScanner::new(&config.sensors, resolution),
            corrector: CourseCorrector::new(&config.sensors, &config.corrector, resolution),
            motion,
            field,
            config,
            pose: start,
            corrector_state: CorrectorState::default(),
            iterations: 0,
            path: Vec::with_capacity(max_iterations.min(16_384) as usize),
            junctions: Vec::new(),
            state: SimState::Traveling,
        })
    }

    pub fn field(&self) -> &WallField {
        &self.field
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn path(&self) -> &[PixelPoint] {
        &self.path
    }

    pub fn corrector_state(&self) -> &CorrectorState {
        &self.corrector_state
    }

    /// Runs one tick and returns the state the loop is left in.
    ///
    /// Once the run has finished this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidCommand` if the policy asks for a
    /// rotation that is not a finite number of degrees. The simulation is left
    /// as it was before the command and should not be stepped further.
    pub fn step<P, S>(&mut self, policy: &mut P, sink: &mut S) -> Result<SimState, NavigationError>
    where
        P: NavigationPolicy + ?Sized,
        S: TelemetrySink + ?Sized,
    {
        if self.state.is_finished() {
            return Ok(self.state);
        }

        self.iterations += 1;
        if self.iterations > self.config.max_iterations {
            self.state = SimState::TimedOut;
            tracing::warn!(
                iterations = self.iterations,
                pose = %self.pose,
                "iteration cap exceeded, giving up"
            );
            return Ok(self.state);
        }

        let position = WorldPoint::new(self.pose.x, self.pose.y);
        let reading = if self.iterations == 1 {
            None
        } else {
            Some(self.sensors.sense(&self.pose, &self.field))
        };

        self.state = match reading {
            None => SimState::AtJunction,
            Some(r) => match policy.default_navigate(position, self.pose.heading, &r) {
                NavCommand::Continue => SimState::Traveling,
                NavCommand::Junction => SimState::AtJunction,
            },
        };

        if self.state == SimState::AtJunction {
            self.evaluate_junction(position, policy, sink)?;
            if self.state == SimState::Terminated {
                return Ok(self.state);
            }
        }

        let (correction, next) = self.corrector.correct(&self.pose, &self.field, &self.corrector_state);
        self.corrector_state = next;
        self.pose.heading = correction.heading;
        self.pose = self.motion.advance(self.pose);

        let pixel = self.field.world_to_pixel(WorldPoint::new(self.pose.x, self.pose.y));
        self.path.push(pixel);

        tracing::debug!(
            iteration = self.iterations,
            x = pixel.x,
            y = pixel.y,
            heading = self.pose.heading,
            reading = %reading.unwrap_or_default(),
            corrected = correction.delta.is_some(),
            "tick"
        );
        sink.on_tick(&TickRecord {
            iteration: self.iterations,
            pixel,
            pose: self.pose,
            reading,
            corrected: correction.delta.is_some(),
        });

        Ok(self.state)
    }

    fn evaluate_junction<P, S>(&mut self, position: WorldPoint, policy: &mut P, sink: &mut S) -> Result<(), NavigationError>
    where
        P: NavigationPolicy + ?Sized,
        S: TelemetrySink + ?Sized,
    {
        let links = self.scanner.scan(&self.pose, &self.field);
        let command = policy.junction_navigate(position, self.pose.heading, &links);

        tracing::info!(
            iteration = self.iterations,
            x = position.x,
            y = position.y,
            heading = self.pose.heading,
            links = ?links,
            %command,
            "junction"
        );

        if let JunctionCommand::Rotate { degrees, .. } = command {
            if !degrees.is_finite() {
                return Err(NavigationError::InvalidCommand(command.to_string()));
            }
        }

        let record = JunctionRecord {
            iteration: self.iterations,
            position,
            heading: self.pose.heading,
            links,
            command,
        };
        sink.on_junction(&record);
        self.junctions.push(record);

        match command {
            JunctionCommand::End => {
                self.state = SimState::Terminated;
                tracing::info!(iterations = self.iterations, pose = %self.pose, "navigation complete");
            }
            JunctionCommand::Rotate { degrees, direction } => {
                let mut pose = self.pose.rotated(degrees)?;
                pose.reverse = direction.is_reverse();
                self.pose = pose;
                self.state = SimState::Traveling;
            }
        }
        Ok(())
    }

    /// Ticks until the run finishes and returns its report.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by [`Simulation::step`].
    pub fn run<P, S>(mut self, policy: &mut P, sink: &mut S) -> Result<SimulationReport, NavigationError>
    where
        P: NavigationPolicy + ?Sized,
        S: TelemetrySink + ?Sized,
    {
        while !self.step(policy, sink)?.is_finished() {}
        Ok(self.into_report())
    }

    /// Consumes the simulation and summarizes it.
    ///
    /// A run that has not finished yet is reported as timed out.
    pub fn into_report(self) -> SimulationReport {
        SimulationReport {
            outcome: match self.state {
                SimState::Terminated => Outcome::Terminated,
                _ => Outcome::TimedOut,
            },
            iterations: self.iterations,
            final_pose: self.pose,
            path: self.path,
            junctions: self.junctions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::TravelDirection;

    /// Drives straight and never ends.
    struct Wanderer;

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

    /// Ends at the first junction.
    struct Quitter;

    impl NavigationPolicy for Quitter {
        fn default_navigate(&mut self, _: WorldPoint, _: f64, _: &SensorReading) -> NavCommand {
            NavCommand::Continue
        }

        fn junction_navigate(&mut self, _: WorldPoint, _: f64, _: &LinkAngleSet) -> JunctionCommand {
            JunctionCommand::End
        }
    }

    #[derive(Default)]
    struct Recorder {
        ticks: Vec<TickRecord>,
        junctions: usize,
    }

    impl TelemetrySink for Recorder {
        fn on_tick(&mut self, record: &TickRecord) {
            self.ticks.push(record.clone());
        }

        fn on_junction(&mut self, _record: &JunctionRecord) {
            self.junctions += 1;
        }
    }

    fn open_field() -> WallField {
        WallField::new(101, 101, 0.01).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_input() {
        let mut config = SimConfig::default();
        config.speed = 0.0;
        let result = Simulation::new(open_field(), config, Pose::new(0.5, 0.5, 0.0));
        assert!(matches!(result, Err(NavigationError::InvalidConfig(_))));

        let mut config = SimConfig::default();
        config.pixel_resolution = 0.02;
        let result = Simulation::new(open_field(), config, Pose::new(0.5, 0.5, 0.0));
        assert!(matches!(result, Err(NavigationError::InvalidConfig(_))));

        let result = Simulation::new(open_field(), SimConfig::default(), Pose::new(f64::NAN, 0.5, 0.0));
        assert!(matches!(result, Err(NavigationError::InvalidConfig(_))));
    }

    #[test]
    fn test_first_tick_is_a_junction() {
        let mut sim = Simulation::new(open_field(), SimConfig::default(), Pose::new(0.5, 0.5, 90.0)).unwrap();
        let mut sink = Recorder::default();
        let state = sim.step(&mut Wanderer, &mut sink).unwrap();
        assert_eq!(state, SimState::Traveling);
        assert_eq!(sink.junctions, 1);
        assert_eq!(sink.ticks.len(), 1);
        assert!(sink.ticks[0].reading.is_none());
        assert_eq!(sim.path(), &[PixelPoint::new(51, 50)]);

        sim.step(&mut Wanderer, &mut sink).unwrap();
        assert_eq!(sink.junctions, 1);
        assert!(sink.ticks[1].reading.is_some());
        assert_eq!(sim.path().len(), 2);
    }

    #[test]
    fn test_end_stops_without_moving() {
        let sim = Simulation::new(open_field(), SimConfig::default(), Pose::new(0.5, 0.5, 0.0)).unwrap();
        let report = sim.run(&mut Quitter, &mut ()).unwrap();
        assert_eq!(report.outcome, Outcome::Terminated);
        assert_eq!(report.iterations, 1);
        assert!(report.path.is_empty());
        assert_eq!(report.junctions.len(), 1);
        assert!(report.junctions[0].links.is_fully_open());
        assert_eq!(report.final_pose, Pose::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_reverse_rotation_sets_travel_mode() {
        struct Backer;
        impl NavigationPolicy for Backer {
            fn default_navigate(&mut self, _: WorldPoint, _: f64, _: &SensorReading) -> NavCommand {
                NavCommand::Continue
            }
            fn junction_navigate(&mut self, _: WorldPoint, _: f64, _: &LinkAngleSet) -> JunctionCommand {
                JunctionCommand::Rotate {
                    degrees: 90.0,
                    direction: TravelDirection::Reverse,
                }
            }
        }

        let mut sim = Simulation::new(open_field(), SimConfig::default(), Pose::new(0.5, 0.5, 0.0)).unwrap();
        sim.step(&mut Backer, &mut ()).unwrap();
        let pose = sim.pose();
        assert!(pose.reverse);
        assert!((pose.heading - 90.0).abs() < 1e-9);
        // Facing east while driving west.
        assert_eq!(sim.path(), &[PixelPoint::new(49, 50)]);
    }

    #[test]
    fn test_finished_run_does_not_advance() {
        let mut sim = Simulation::new(open_field(), SimConfig::default(), Pose::new(0.5, 0.5, 0.0)).unwrap();
        assert_eq!(sim.step(&mut Quitter, &mut ()).unwrap(), SimState::Terminated);
        assert_eq!(sim.step(&mut Quitter, &mut ()).unwrap(), SimState::Terminated);
        assert_eq!(sim.iterations(), 1);
    }

    #[test]
    fn test_small_cap_times_out() {
        let mut config = SimConfig::default();
        config.max_iterations = 5;
        let sim = Simulation::new(open_field(), config, Pose::new(0.5, 0.5, 0.0)).unwrap();
        let report = sim.run(&mut Wanderer, &mut ()).unwrap();
        assert_eq!(report.outcome, Outcome::TimedOut);
        assert_eq!(report.iterations, 6);
        assert_eq!(report.path.len(), 5);
    }
}
