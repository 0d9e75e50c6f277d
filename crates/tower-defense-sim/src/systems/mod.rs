//! Systems that operate on the component store each tick.
//!
//! Systems are plain functions over `&mut Components` plus whatever shared
//! state they read. Apart from the wave queue, which the engine owns, all
//! state lives in components.

pub mod explosion;
pub mod missile;
pub mod movement;
pub mod smoke;
pub mod snapshot;
pub mod walker;
pub mod waves;
