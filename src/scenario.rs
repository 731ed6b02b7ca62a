//! Maze layouts loaded from TOML files under `scenarios/`.

use std::path::Path;

use anyhow::Context;
use config::{Config, File, FileFormat};
use mazebot_navigation::{Pose, SimConfig, WallField, WallSegment, WorldPoint};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WallSpec {
    pub from: [f64; 2],
    pub to: [f64; 2],
}

/// A maze: arena extent, start and end points, and interior walls (meters).
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub extent: [f64; 2],
    pub start: [f64; 2],
    pub end: [f64; 2],
    #[serde(default)]
    pub initial_heading: f64,
    /// Surround the arena with walls along its edges.
    #[serde(default)]
    pub boundary: bool,
    #[serde(default)]
    pub walls: Vec<WallSpec>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = File::from(path).format(FileFormat::Toml).required(true);
        Config::builder()
            .add_source(source)
            .build()
            .and_then(|c| c.try_deserialize())
            .with_context(|| format!("failed to read scenario {}", path.display()))
    }

    pub fn parse(toml: &str) -> anyhow::Result<Self> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .context("failed to parse scenario")
    }

    pub fn segments(&self) -> Vec<WallSegment> {
        let [x_lim, y_lim] = self.extent;
        let mut segments = Vec::with_capacity(self.walls.len() + 4);
        if self.boundary {
            segments.extend(WallSegment::boundary(x_lim, y_lim));
        }
        segments.extend(
            self.walls
                .iter()
                .map(|w| WallSegment::new(w.from[0], w.from[1], w.to[0], w.to[1])),
        );
        segments
    }

    /// Rasterizes the maze and marks its start and end cells.
    pub fn build_field(&self, config: &SimConfig) -> anyhow::Result<WallField> {
        let [x_lim, y_lim] = self.extent;
        let mut field = WallField::build(
            x_lim,
            y_lim,
            config.pixel_resolution,
            &self.segments(),
            config.wall_half_width,
        )
        .with_context(|| format!("failed to rasterize scenario '{}'", self.name))?;
        field.mark_start(self.start_point()).context("failed to place start marker")?;
        field.mark_end(self.end_point()).context("failed to place end marker")?;
        Ok(field)
    }

    pub fn start_point(&self) -> WorldPoint {
        WorldPoint::new(self.start[0], self.start[1])
    }

    pub fn end_point(&self) -> WorldPoint {
        WorldPoint::new(self.end[0], self.end[1])
    }

    pub fn start_pose(&self) -> Pose {
        Pose::new(self.start[0], self.start[1], self.initial_heading)
    }
}
