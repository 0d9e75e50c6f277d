//! ASCII tile map.
//!
//! `#` is blocked, space is open ground towers may be built on, `>` `<` `n` `v`
//! are path tiles heading east, west, north and south, and any other
//! character is a turn in the path.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::MAP_PADDING;
use crate::error::ConfigError;
use crate::types::TileCoord;

/// Cardinal travel direction of a straight path tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    East,
    West,
    North,
    South,
}

impl Heading {
    pub fn from_symbol(symbol: u8) -> Option<Self> {
        match symbol {
            b'>' => Some(Heading::East),
            b'<' => Some(Heading::West),
            b'n' => Some(Heading::North),
            b'v' => Some(Heading::South),
            _ => None,
        }
    }

    /// Unit vector in screen space (y grows downward).
    pub fn vector(self) -> Vec2 {
        match self {
            Heading::East => Vec2::X,
            Heading::West => Vec2::NEG_X,
            Heading::North => Vec2::NEG_Y,
            Heading::South => Vec2::Y,
        }
    }
}

/// Classified map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Blocked,
    Open,
    Path(Heading),
    Turn,
}

impl Tile {
    pub fn from_symbol(symbol: u8) -> Self {
        match symbol {
            b'#' => Tile::Blocked,
            b' ' => Tile::Open,
            other => match Heading::from_symbol(other) {
                Some(heading) => Tile::Path(heading),
                None => Tile::Turn,
            },
        }
    }
}

/// Rectangular padded map, stored as raw ASCII symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    rows: usize,
    cols: usize,
    symbols: Vec<u8>,
}

impl TileMap {
    /// Parse and validate authored rows. The map must be rectangular, ASCII,
    /// and large enough to hold the border ring around at least one tile.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, ConfigError> {
        let first = rows.first().ok_or(ConfigError::EmptyMap)?;
        let cols = first.as_ref().len();

        let mut symbols = Vec::with_capacity(rows.len() * cols);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            if !line.is_ascii() {
                return Err(ConfigError::NonAsciiMap { row });
            }
            if line.len() != cols {
                return Err(ConfigError::RaggedMap {
                    row,
                    expected: cols,
                    found: line.len(),
                });
            }
            symbols.extend_from_slice(line.as_bytes());
        }

        let min = 2 * MAP_PADDING as usize + 1;
        if rows.len() < min || cols < min {
            return Err(ConfigError::MapTooSmall {
                rows: rows.len(),
                cols,
            });
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            symbols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && (coord.row as usize) < self.rows
            && (coord.col as usize) < self.cols
    }

    /// Raw symbol at a padded coordinate, `None` outside the map.
    pub fn symbol(&self, coord: TileCoord) -> Option<u8> {
        if !self.contains(coord) {
            return None;
        }
        let idx = coord.row as usize * self.cols + coord.col as usize;
        self.symbols.get(idx).copied()
    }

    pub fn tile(&self, coord: TileCoord) -> Option<Tile> {
        self.symbol(coord).map(Tile::from_symbol)
    }

    /// Iterate all padded coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| TileCoord::new(row as i32, col as i32))
        })
    }
}
