//! Radial occupancy scan used to find open directions at a junction.

use mazebot_kinematics::Pose;

use crate::config::SensorConfig;
use crate::map::{WallField, WorldPoint};

/// Candidate travel directions found by a junction scan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkAngleSet {
    /// No wall anywhere within scan range; every direction is open.
    FullyOpen,
    /// Compass bearings (deg) of each gap, in scan order. Empty when boxed in.
    Links(Vec<f64>),
}

impl LinkAngleSet {
    /// Bearings of the gaps. Empty for [`LinkAngleSet::FullyOpen`].
    pub fn angles(&self) -> &[f64] {
        match self {
            LinkAngleSet::FullyOpen => &[],
            LinkAngleSet::Links(angles) => angles,
        }
    }

    /// Whether the scan saw no walls at all.
    pub fn is_fully_open(&self) -> bool {
        matches!(self, LinkAngleSet::FullyOpen)
    }
}

/// Quantizes the circle around the robot into bins and reports the gaps.
#[derive(Debug, Clone)]
pub struct JunctionScanner {
    range: f64,
    bins: usize,
}

impl JunctionScanner {
    /// Creates a scanner for a field with the given pixel resolution.
    pub fn new(config: &SensorConfig, resolution: f64) -> Self {
        Self {
            range: config.scan_range / resolution,
            bins: config.scan_resolution.max(1),
        }
    }

    /// Marks which bins contain at least one wall cell within scan range.
    pub fn occupancy(&self, pose: &Pose, field: &WallField) -> Vec<bool> {
        let origin = field.world_to_pixel(WorldPoint::new(pose.x, pose.y));
        let mut occupied = vec![false; self.bins];
        for cell in field.walls_near(origin, self.range) {
            if origin.distance_to(cell) <= self.range {
                let bin = (origin.bearing_to(cell) / 360.0 * self.bins as f64) as usize;
                occupied[bin.min(self.bins - 1)] = true;
            }
        }
        occupied
    }

    /// Scans around `pose` and returns the bearings of the open gaps.
    pub fn scan(&self, pose: &Pose, field: &WallField) -> LinkAngleSet {
        link_angles(&self.occupancy(pose, field))
    }
}

/// Extracts gap bearings from a ring of occupancy bins.
///
/// Each maximal run of free bins yields the midpoint of its angular span.
/// A run still open at the last bin is joined with the run starting at bin 0
/// when that bin is free: the two entries are replaced by
/// `((2c - 360) + (2l + 360)) / 2 mod 360`, appended last, where `c` is the
/// trailing run's accumulated angle and `l` the leading run's bearing. The
/// trailing run never receives its closing half bin, so the result sits half
/// a bin short of the true seam midpoint.
pub fn link_angles(occupied: &[bool]) -> LinkAngleSet {
    if occupied.iter().all(|o| !o) {
        return LinkAngleSet::FullyOpen;
    }

    let bins = occupied.len() as f64;
    let half_bin = 0.5 / bins * 360.0;
    let mut links = Vec::new();
    let mut counting = false;
    let mut current = 0.0;

    for (i, &occ) in occupied.iter().enumerate() {
        match (occ, counting) {
            (false, false) => {
                counting = true;
                current = i as f64 / bins * 360.0;
            }
            (false, true) => current += half_bin,
            (true, true) => {
                current += half_bin;
                counting = false;
                links.push(current);
            }
            (true, false) => {}
        }
    }

    if counting {
        if occupied[0] {
            links.push(current);
        } else {
            // Bin 0 free means the leading run closed, so links is non-empty.
            let start = 2.0 * current - 360.0;
            let end = 2.0 * links[0] + 360.0;
            links.remove(0);
            links.push(((start + end) / 2.0).rem_euclid(360.0));
        }
    }
    LinkAngleSet::Links(links)
}
