//! Snapshots handed to rendering collaborators.
//!
//! Nothing here refers back into the simulation; a renderer may keep these
//! around as long as it likes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::events::{EntityKind, SimEvent};
use crate::types::Entity;

/// Kinematic state of one mob at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MobPose {
    pub entity: Entity,
    pub kind: Option<EntityKind>,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub dx: f32,
    pub dy: f32,
    pub d_rotation: f32,
}

impl MobPose {
    /// Extrapolate by a fraction of a tick using persistent velocity.
    pub fn interpolate(&self, fraction: f32) -> RenderPose {
        RenderPose {
            entity: self.entity,
            kind: self.kind,
            x: self.x + fraction * self.dx,
            y: self.y + fraction * self.dy,
            rotation: self.rotation + fraction * self.d_rotation,
        }
    }
}

/// Pose to draw for one entity in one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderPose {
    pub entity: Entity,
    pub kind: Option<EntityKind>,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

/// Point buffer of one smoke ribbon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailView {
    pub entity: Entity,
    pub missile: Entity,
    pub points: Vec<Vec2>,
}

/// Expanding blast ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionView {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Fades from 1 toward 0 as the blast expands.
    pub alpha: f32,
}

/// Result of one simulation tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub tick: u64,
    /// Sorted by entity.
    pub poses: Vec<MobPose>,
    /// Lifecycle events raised during the tick, in order.
    pub events: Vec<SimEvent>,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub tick: u64,
    /// Fraction of a tick elapsed since the last update, in `[0, 1]`.
    pub interpolation: f32,
    pub poses: Vec<RenderPose>,
    pub trails: Vec<TrailView>,
    pub explosions: Vec<ExplosionView>,
}
