//! Fundamental identifier and coordinate types.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::{MAP_PADDING, TILE_SIZE};

/// Opaque entity identifier. Issued once by a monotonic counter, never reused.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Entity(pub u64);

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Tile coordinate in the padded map (row/col include the border ring).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub row: i32,
    pub col: i32,
}

impl TileCoord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Padded tile containing a world position (pixels, origin at the
    /// top-left of the visible area).
    pub fn from_world(position: Vec2) -> Self {
        Self {
            row: (position.y / TILE_SIZE).floor() as i32 + MAP_PADDING,
            col: (position.x / TILE_SIZE).floor() as i32 + MAP_PADDING,
        }
    }

    /// Padded coordinate of a visible-area tile.
    pub fn from_visible(row: i32, col: i32) -> Self {
        Self {
            row: row + MAP_PADDING,
            col: col + MAP_PADDING,
        }
    }

    /// World position of this tile's centre.
    pub fn center(&self) -> Vec2 {
        let offset = MAP_PADDING as f32 - 0.5;
        Vec2::new(
            (self.col as f32 - offset) * TILE_SIZE,
            (self.row as f32 - offset) * TILE_SIZE,
        )
    }

    /// Neighbouring coordinate (may fall outside the map).
    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Position within a tile, in `[0, TILE_SIZE)` on both axes.
/// Works for negative world coordinates off the west/north edge.
pub fn local_offset(position: Vec2) -> Vec2 {
    Vec2::new(
        position.x.rem_euclid(TILE_SIZE),
        position.y.rem_euclid(TILE_SIZE),
    )
}
