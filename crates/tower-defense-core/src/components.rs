//! Component records stored per entity.
//!
//! Components are plain data. Game logic lives in systems, not here.
//! Back-references between components (`target`, `missile`, `trail`, `roost`,
//! `struck`) are plain entity ids and may dangle once the referenced entity
//! is gone.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::Entity;

/// Movable object: kinematic state shared by walkers, missiles and swallows.
///
/// `temp_velocity` and `temp_acceleration` are scratch accumulators. Any number
/// of systems add into them during a tick; the integration step folds them in
/// and zeroes them exactly once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Mob {
    pub position: Vec2,
    /// Radians.
    pub rotation: f32,
    /// Radians per tick, applied every tick and never reset automatically.
    pub d_rotation: f32,
    /// Persistent velocity (px/tick).
    pub velocity: Vec2,
    /// Per-tick displacement contributions (`tempDx`, `tempDy`).
    pub temp_velocity: Vec2,
    /// Per-tick velocity contributions (`tempDdx`, `tempDdy`).
    pub temp_acceleration: Vec2,
}

impl Mob {
    /// A mob at rest at the given position.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// Walk intent: the path-following direction an entity wants to move in.
/// Kept apart from `Mob::velocity` so walking can be suppressed on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkIntent {
    pub direction: Vec2,
}

/// A placed tower. Visible-area tile coordinates, immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tower {
    pub row: i32,
    pub col: i32,
}

/// Launcher attached to a tower entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissileSpawner {
    /// Ticks until the next launch is allowed.
    pub reload_countdown: u32,
    /// Value `reload_countdown` is reset to after a launch.
    pub reload_cost: u32,
}

/// Homing missile. Lives on the same entity as the `Mob` that moves it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Missile {
    pub target: Entity,
    pub acceleration: f32,
    /// Current scalar speed (px/tick).
    pub speed: f32,
    pub top_speed: f32,
    pub turn_radius: f32,
}

/// One of the three braided smoke ribbons following a missile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmokeTrail {
    /// Ticks since the trail was spawned.
    pub age: u32,
    /// Back-reference; the trail is retired once this missile is gone.
    pub missile: Entity,
    /// Render points, newest first. Fixed length.
    pub points: Vec<Vec2>,
    pub frequency: f32,
    pub shift: f32,
}

/// Immutable emission record left behind by a trail. Ages out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmokeParticle {
    pub age: u32,
    /// Back-reference to the trail that emitted this particle.
    pub trail: Entity,
    pub position: Vec2,
    /// Unit lateral direction captured at emission.
    pub normal: Vec2,
}

/// Bird launched from a swallow tower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swallow {
    /// Tower the swallow rests in while not flying.
    pub roost: Option<Entity>,
    /// Equal to the roost while roosting.
    pub target: Entity,
    pub fixed_speed: f32,
    pub turn_radius: f32,
    /// Point the swallow disappears into when not airborne.
    pub vanishing_point: Vec2,
}

/// Marks a mob that explosions can push. Knockback lives in the mob's
/// persistent velocity and shrinks by `decay` every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impulse {
    pub decay: f32,
}

/// Expanding blast left where a missile hit.
///
/// Each mob is pushed once, on the tick the blast front first reaches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub center: Vec2,
    /// Ticks since detonation.
    pub age: u32,
    /// Ticks to reach `max_radius`.
    pub duration: u32,
    pub radius: f32,
    pub max_radius: f32,
    /// Mobs already pushed by this blast.
    pub struck: Vec<Entity>,
}

impl Explosion {
    pub fn at(center: Vec2, max_radius: f32, duration: u32) -> Self {
        Self {
            center,
            age: 0,
            duration,
            radius: 0.0,
            max_radius,
            struck: Vec::new(),
        }
    }
}
