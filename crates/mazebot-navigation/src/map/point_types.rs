use mazebot_kinematics::compass_bearing;

/// Represents a point in grid coordinates (cell indices).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    /// The x-coordinate (column index) in the grid.
    pub x: usize,
    /// The y-coordinate (row index) in the grid, growing downwards.
    pub y: usize,
}

impl GridPoint {
    /// Creates a new `GridPoint`.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Represents a point in world coordinates (meters).
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPoint {
    /// The x-coordinate in meters.
    pub x: f64,
    /// The y-coordinate in meters, growing downwards.
    pub y: f64,
}

impl WorldPoint {
    /// Creates a new `WorldPoint`.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point, in meters.
    pub fn distance(&self, other: WorldPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Signed pixel position of the robot.
///
/// Unlike [`GridPoint`] this may lie outside the grid; lookups around it are clamped.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelPoint {
    /// The x-coordinate in pixels.
    pub x: i64,
    /// The y-coordinate in pixels, growing downwards.
    pub y: i64,
}

impl PixelPoint {
    /// Creates a new `PixelPoint`.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to a cell, in pixels.
    pub fn distance_to(&self, cell: GridPoint) -> f64 {
        let dx = cell.x as f64 - self.x as f64;
        let dy = cell.y as f64 - self.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Compass bearing of a cell as seen from this position, in `[0, 360)`.
    pub fn bearing_to(&self, cell: GridPoint) -> f64 {
        compass_bearing(cell.x as f64 - self.x as f64, cell.y as f64 - self.y as f64)
    }

    /// Returns the grid cell at this position, if it is not negative.
    pub fn as_grid(&self) -> Option<GridPoint> {
        if self.x < 0 || self.y < 0 {
            return None;
        }
        Some(GridPoint::new(self.x as usize, self.y as usize))
    }
}
