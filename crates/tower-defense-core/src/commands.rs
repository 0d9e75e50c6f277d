//! Commands queued by the host and applied at the next tick boundary.

use serde::{Deserialize, Serialize};

/// Request from outside the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    /// Build a missile tower on a visible-area tile.
    PlaceMissileTower { row: i32, col: i32 },
    /// Build a swallow tower on a visible-area tile.
    PlaceSwallowTower { row: i32, col: i32 },
    /// Spawn a walker at the centre of the given entrance.
    SpawnWalker { entrance: usize },
}
