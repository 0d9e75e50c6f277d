//! Setup-time configuration errors.
//!
//! Only configuration can fail. Missing components during a tick are a normal
//! branch inside systems and never surface here.

use thiserror::Error;

/// A configuration the engine refuses to start from.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("map has no rows")]
    EmptyMap,

    #[error("map row {row} contains non-ASCII characters")]
    NonAsciiMap { row: usize },

    #[error("map row {row} is {found} columns wide, expected {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("map is {rows}x{cols}, too small to hold the border ring")]
    MapTooSmall { rows: usize, cols: usize },

    #[error("{exits} exits configured but no entrance to loop back to")]
    MissingEntrances { exits: usize },

    #[error("entrance/exit tile ({row}, {col}) lies outside the map")]
    TileOutOfBounds { row: i32, col: i32 },

    #[error("no entrance with index {index}")]
    UnknownEntrance { index: usize },

    #[error("tower at ({row}, {col}) lies outside the map")]
    TowerOutOfBounds { row: i32, col: i32 },

    #[error("tower at ({row}, {col}) would sit on the path")]
    TowerOnPath { row: i32, col: i32 },

    #[error("tower at ({row}, {col}) would sit on a blocked tile")]
    TowerOnBlocked { row: i32, col: i32 },

    #[error("tile ({row}, {col}) already has a tower")]
    TileOccupied { row: i32, col: i32 },

    #[error("{field} must be a finite number above zero, got {value}")]
    NonPositiveParam { field: &'static str, value: f32 },

    #[error("{field} must be a finite number, zero or above, got {value}")]
    NegativeParam { field: &'static str, value: f32 },

    #[error("{field} must be finite, got {value}")]
    NonFiniteParam { field: &'static str, value: f32 },

    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },

    #[error("smoke lifetime of {spacing} x {buffer_len} ticks does not fit in 32 bits")]
    SmokeLifetimeOverflow { spacing: u32, buffer_len: usize },

    #[error("missiles trail exactly {expected} smoke waves, got {found}")]
    SmokeWaveCount { expected: usize, found: usize },

    #[error("knockback decay must lie in [0, 1), got {value}")]
    InvalidDecay { value: f32 },

    #[error("{waves} waves configured but no entrance to spawn them at")]
    WavesWithoutEntrances { waves: usize },
}
