#![warn(missing_docs)]

use core::ops::Range;

use super::{GridPoint, PixelPoint, WorldPoint};
use crate::error::NavigationError;

/// Largest number of cells allowed along one axis of a field built from an extent.
const MAX_AXIS_CELLS: usize = 1 << 20;

/// Contents of a single cell in the wall field.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    /// Open floor.
    #[default]
    Empty = 0,
    /// The cell the robot starts from.
    Start = 1,
    /// The cell the robot is trying to reach.
    End = 2,
    /// Part of a thickened wall segment.
    Wall = 3,
}

impl CellKind {
    /// Whether rasterization must leave this cell alone.
    pub fn is_locked(&self) -> bool {
        !matches!(self, CellKind::Empty)
    }

    /// Single character used by the ASCII dump.
    pub fn as_char(&self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::Start => 'S',
            CellKind::End => 'E',
            CellKind::Wall => '#',
        }
    }
}

/// A straight wall between two metric endpoints.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallSegment {
    /// First endpoint (meters).
    pub start: WorldPoint,
    /// Second endpoint (meters).
    pub end: WorldPoint,
}

impl WallSegment {
    /// Creates a wall from `(x1, y1)` to `(x2, y2)`.
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            start: WorldPoint::new(x1, y1),
            end: WorldPoint::new(x2, y2),
        }
    }

    /// The four walls enclosing an arena of the given extent, with a corner at the origin.
    pub fn boundary(x_lim: f64, y_lim: f64) -> [WallSegment; 4] {
        [
            WallSegment::new(0.0, 0.0, x_lim, 0.0),
            WallSegment::new(x_lim, 0.0, x_lim, y_lim),
            WallSegment::new(0.0, y_lim, x_lim, y_lim),
            WallSegment::new(0.0, 0.0, 0.0, y_lim),
        ]
    }
}

/// Occupancy grid produced by rasterizing metric wall segments.
///
/// Cell `(0, 0)` sits at the metric origin and y grows downwards. A metric
/// point maps to the cell nearest to it (`round(v / resolution)`, ties to even).
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallField {
    /// Width of the grid in cells
    width: usize,
    /// Height of the grid in cells
    height: usize,
    /// Meters per cell
    resolution: f64,
    /// Row-major cell contents
    data: Vec<CellKind>,
}

impl WallField {
    /// Creates an empty wall field.
    ///
    /// # Arguments
    /// * `width` - Width of the grid in cells
    /// * `height` - Height of the grid in cells
    /// * `resolution` - Meters per cell
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The empty field or an error if parameters are invalid
    pub fn new(width: usize, height: usize, resolution: f64) -> Result<Self, NavigationError> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(NavigationError::InvalidResolution("Resolution must be positive"));
        }
        if width == 0 || height == 0 {
            return Err(NavigationError::InvalidDimensions("Width and height must be non-zero"));
        }
        let Some(cells) = width.checked_mul(height) else {
            return Err(NavigationError::InvalidDimensions("Map dimensions too large, would cause overflow"));
        };

        Ok(WallField {
            width,
            height,
            resolution,
            data: vec![CellKind::Empty; cells],
        })
    }

    /// Creates an empty wall field covering a metric extent, edges included.
    ///
    /// The grid gets `trunc(x_lim / resolution) + 1` columns and
    /// `trunc(y_lim / resolution) + 1` rows.
    pub fn from_extent(x_lim: f64, y_lim: f64, resolution: f64) -> Result<Self, NavigationError> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(NavigationError::InvalidResolution("Resolution must be positive"));
        }
        if !(x_lim >= 0.0 && y_lim >= 0.0 && x_lim.is_finite() && y_lim.is_finite()) {
            return Err(NavigationError::InvalidDimensions("Extent must be finite and non-negative"));
        }
        let (Some(width), Some(height)) = (axis_cells(x_lim / resolution), axis_cells(y_lim / resolution)) else {
            return Err(NavigationError::InvalidDimensions("Extent too large for the resolution"));
        };
        Self::new(width, height, resolution)
    }

    /// Builds a field from an extent and a set of walls in one go.
    pub fn build(
        x_lim: f64,
        y_lim: f64,
        resolution: f64,
        segments: &[WallSegment],
        half_width: f64,
    ) -> Result<Self, NavigationError> {
        let mut field = Self::from_extent(x_lim, y_lim, resolution)?;
        field.rasterize(segments, half_width)?;
        Ok(field)
    }

    /// Width of the grid in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the grid in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Meters per cell.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    fn get_index(&self, p: GridPoint) -> usize {
        p.y * self.width + p.x
    }

    /// Converts a metric point to the nearest pixel. The result may be off the grid.
    pub fn world_to_pixel(&self, p: WorldPoint) -> PixelPoint {
        PixelPoint::new(
            (p.x / self.resolution).round_ties_even() as i64,
            (p.y / self.resolution).round_ties_even() as i64,
        )
    }

    /// Converts a pixel back to its metric position.
    pub fn pixel_to_world(&self, p: PixelPoint) -> WorldPoint {
        WorldPoint::new(p.x as f64 * self.resolution, p.y as f64 * self.resolution)
    }

    /// Gets the cell contents at a grid position.
    ///
    /// # Returns
    /// * `Result<CellKind, NavigationError>` - The cell or an error if out of bounds
    pub fn get(&self, p: GridPoint) -> Result<CellKind, NavigationError> {
        if p.x < self.width && p.y < self.height {
            Ok(self.data[self.get_index(p)])
        } else {
            Err(NavigationError::OutOfBounds("Wall field index out of bounds"))
        }
    }

    /// Whether the cell is a wall. Cells outside the grid are not.
    pub fn is_wall(&self, p: GridPoint) -> bool {
        matches!(self.get(p), Ok(CellKind::Wall))
    }

    /// Marks the cell nearest to `p` as the start cell.
    pub fn mark_start(&mut self, p: WorldPoint) -> Result<GridPoint, NavigationError> {
        self.mark(p, CellKind::Start)
    }

    /// Marks the cell nearest to `p` as the end cell.
    pub fn mark_end(&mut self, p: WorldPoint) -> Result<GridPoint, NavigationError> {
        self.mark(p, CellKind::End)
    }

    fn mark(&mut self, p: WorldPoint, kind: CellKind) -> Result<GridPoint, NavigationError> {
        let cell = self
            .world_to_pixel(p)
            .as_grid()
            .ok_or(NavigationError::OutOfBounds("Marker lies outside the grid"))?;
        let current = self.get(cell)?;
        if current.is_locked() {
            return Err(NavigationError::CellOccupied("Marker cell is not empty"));
        }
        let idx = self.get_index(cell);
        self.data[idx] = kind;
        Ok(cell)
    }

    /// Clamped index range `[floor(c - r), ceil(c + r) + 1)` within `0..limit`.
    fn window(centre: f64, radius: f64, limit: usize) -> Range<usize> {
        let lo = (centre - radius).floor().max(0.0);
        let hi = ((centre + radius).ceil() + 1.0).min(limit as f64);
        if hi <= lo { 0..0 } else { lo as usize..hi as usize }
    }

    /// Rejects endpoints that are not finite or lie so far off the grid that
    /// walking the segment would not terminate in reasonable time.
    fn check_segment(&self, segment: &WallSegment, w: f64) -> Result<(), NavigationError> {
        let margin = self.width.max(self.height) as f64 + w;
        let within = |v: f64, limit: usize| v.is_finite() && v >= -margin && v <= (limit - 1) as f64 + margin;
        for p in [segment.start, segment.end] {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(NavigationError::InvalidConfig("Wall endpoints must be finite"));
            }
            if !within(p.x / self.resolution, self.width) || !within(p.y / self.resolution, self.height) {
                return Err(NavigationError::InvalidConfig("Wall endpoint lies far outside the field"));
            }
        }
        Ok(())
    }

    /// Rasterizes wall segments into the grid.
    ///
    /// Each segment is walked in unit pixel steps (`ceil` of its pixel length,
    /// endpoints included). Every cell within `half_width` of a step point
    /// becomes [`CellKind::Wall`]; start, end, and existing wall cells are
    /// never overwritten.
    ///
    /// # Arguments
    /// * `segments` - Walls in meters
    /// * `half_width` - Wall half-width tolerance in meters
    pub fn rasterize(&mut self, segments: &[WallSegment], half_width: f64) -> Result<(), NavigationError> {
        if !half_width.is_finite() || half_width < 0.0 {
            return Err(NavigationError::InvalidConfig("Wall half-width must be non-negative"));
        }
        let w = half_width / self.resolution;
        for segment in segments {
            self.check_segment(segment, w)?;
        }

        for segment in segments {
            let p1 = self.world_to_pixel(segment.start);
            let p2 = self.world_to_pixel(segment.end);
            let dx = (p2.x - p1.x) as f64;
            let dy = (p2.y - p1.y) as f64;
            let steps = (dx * dx + dy * dy).sqrt().ceil() as usize;
            let (ux, uy) = if steps == 0 {
                (0.0, 0.0)
            } else {
                (dx / steps as f64, dy / steps as f64)
            };

            let (mut cx, mut cy) = (p1.x as f64, p1.y as f64);
            for _ in 0..=steps {
                let (rx, ry) = (cx.round_ties_even(), cy.round_ties_even());
                for x in Self::window(rx, w, self.width) {
                    for y in Self::window(ry, w, self.height) {
                        let idx = self.get_index(GridPoint::new(x, y));
                        if self.data[idx].is_locked() {
                            continue;
                        }
                        let ddx = rx - x as f64;
                        let ddy = ry - y as f64;
                        if (ddx * ddx + ddy * ddy).sqrt() <= w {
                            self.data[idx] = CellKind::Wall;
                        }
                    }
                }
                cx += ux;
                cy += uy;
            }
        }
        Ok(())
    }

    /// Iterates over the wall cells in the square window of half-size `radius`
    /// pixels around `centre`, clamped to the grid, column by column.
    ///
    /// Callers still filter by true distance; the window only bounds the search.
    pub fn walls_near(&self, centre: PixelPoint, radius: f64) -> impl Iterator<Item = GridPoint> + '_ {
        let xs = Self::window(centre.x as f64, radius, self.width);
        let ys = Self::window(centre.y as f64, radius, self.height);
        xs.flat_map(move |x| ys.clone().map(move |y| GridPoint::new(x, y)))
            .filter(move |p| self.data[self.get_index(*p)] == CellKind::Wall)
    }

    /// Number of cells holding `kind`.
    pub fn count(&self, kind: CellKind) -> usize {
        self.data.iter().filter(|c| **c == kind).count()
    }
}

/// Cell count along one axis spanning `cells` pixels, both edges included.
fn axis_cells(cells: f64) -> Option<usize> {
    if cells >= MAX_AXIS_CELLS as f64 {
        return None;
    }
    (cells as usize).checked_add(1)
}

impl core::fmt::Display for WallField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "WallField ({}x{}, resolution: {:.3}m)", self.width, self.height, self.resolution)?;
        for row in self.data.chunks(self.width) {
            let line: String = row.iter().map(CellKind::as_char).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
