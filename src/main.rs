mod bus; // brings `bus.rs` in as `crate::bus`
mod policy;
mod scenario;
mod settings;

use std::sync::Arc;

use anyhow::Context;
use bus::{Telemetry, Topic};
use mazebot_navigation::{Outcome, Simulation, SimulationReport, WorldPoint};
use policy::GreedyPolicy;
use scenario::Scenario;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| settings::DEFAULT_CONFIG_PATH.to_string());
    let app = settings::load_config(&config_path).with_context(|| format!("failed to load {}", config_path))?;
    app.simulation.validate().context("invalid simulation settings")?;

    let scenario = Scenario::load(&app.scenario.path)?;
    let field = scenario.build_field(&app.simulation)?;
    info!(
        scenario = %scenario.name,
        width = field.width(),
        height = field.height(),
        walls = scenario.segments().len(),
        "Scenario loaded"
    );

    let telemetry: Topic<Telemetry> = Topic::new(app.telemetry.capacity);
    let logger = tokio::spawn(log_telemetry(telemetry.subscribe(), app.telemetry.log_every));

    let mut sink = telemetry.clone();
    let config = app.simulation.clone();
    let start = scenario.start_pose();
    let mut policy = GreedyPolicy::new(scenario.end_point(), app.scenario.goal_tolerance);
    let report = tokio::task::spawn_blocking(move || -> anyhow::Result<SimulationReport> {
        info!("Simulation task started.");
        let sim = Simulation::new(field, config, start)?;
        Ok(sim.run(&mut policy, &mut sink)?)
    })
    .await
    .context("simulation task panicked")?;

    // Dropping the last sender closes the topic so the logger can finish.
    drop(telemetry);
    if let Err(e) = logger.await {
        error!("Telemetry logger failed: {:?}", e);
    }

    let report = report.context("simulation aborted")?;
    summarize(&scenario, &report);
    match report.outcome {
        Outcome::Terminated => Ok(()),
        Outcome::TimedOut => anyhow::bail!("navigation timed out after {} iterations", report.iterations),
    }
}

/// Logs a sample of the telemetry stream until the topic closes.
async fn log_telemetry(mut rx: broadcast::Receiver<Arc<Telemetry>>, log_every: u64) {
    let log_every = log_every.max(1);
    loop {
        match rx.recv().await {
            Ok(msg) => match msg.as_ref() {
                Telemetry::Tick(tick) if tick.iteration % log_every == 0 => {
                    info!(
                        iteration = tick.iteration,
                        x = tick.pixel.x,
                        y = tick.pixel.y,
                        heading = tick.pose.heading,
                        "Progress"
                    );
                }
                Telemetry::Tick(_) => {}
                Telemetry::Junction(j) => {
                    debug!(iteration = j.iteration, links = ?j.links.angles(), command = %j.command, "Junction seen");
                }
            },
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "Telemetry logger lagging"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn summarize(scenario: &Scenario, report: &SimulationReport) {
    let end = scenario.end_point();
    let final_point = WorldPoint::new(report.final_pose.x, report.final_pose.y);
    match report.outcome {
        Outcome::Terminated => info!(
            iterations = report.iterations,
            junctions = report.junctions.len(),
            final_pose = %report.final_pose,
            distance_to_end = final_point.distance(end),
            "Navigation finished"
        ),
        Outcome::TimedOut => warn!(
            iterations = report.iterations,
            junctions = report.junctions.len(),
            final_pose = %report.final_pose,
            distance_to_end = final_point.distance(end),
            "Navigation timed out"
        ),
    }
}
