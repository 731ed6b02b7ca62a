//! Map-related functionality for navigation.
//!
//! This module provides the rasterized wall field and the point types used
//! to address it in meters, cells, and robot pixels.

pub mod point_types;
pub mod wall_field;

pub use point_types::{GridPoint, PixelPoint, WorldPoint};
pub use wall_field::{CellKind, WallField, WallSegment};
