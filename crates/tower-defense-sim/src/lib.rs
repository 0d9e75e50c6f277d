//! Simulation engine for the tower defense game.
//!
//! Owns the component store, runs systems in a fixed order once per tick,
//! and produces snapshots and interpolated render frames for collaborators.
//! Completely headless.

pub mod engine;
pub mod game_loop;
pub mod path_field;
pub mod store;
pub mod systems;
pub mod world_setup;

pub use engine::SimulationEngine;
pub use game_loop::{FrameOutcome, FrameReport, FrameSink, GameLoop};

#[cfg(test)]
mod tests;
