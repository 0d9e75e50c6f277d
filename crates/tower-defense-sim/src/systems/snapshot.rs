//! Snapshot system: reads the component store and builds render snapshots.
//!
//! Read-only. Called after a tick, and any number of times between ticks.

use tower_defense_core::events::SimEvent;
use tower_defense_core::state::{ExplosionView, MobPose, RenderFrame, TickSnapshot, TrailView};

use crate::store::Components;
use crate::systems::explosion;

/// Poses of every mob, sorted by entity.
pub fn collect_poses(components: &Components) -> Vec<MobPose> {
    components
        .mobs
        .iter()
        .map(|(entity, mob)| MobPose {
            entity,
            kind: components.markers.get(entity).copied(),
            x: mob.position.x,
            y: mob.position.y,
            rotation: mob.rotation,
            dx: mob.velocity.x,
            dy: mob.velocity.y,
            d_rotation: mob.d_rotation,
        })
        .collect()
}

/// Build the result of a finished tick.
pub fn build_tick_snapshot(components: &Components, tick: u64, events: Vec<SimEvent>) -> TickSnapshot {
    TickSnapshot {
        tick,
        poses: collect_poses(components),
        events,
    }
}

/// Build an interpolated frame. `fraction` is clamped to `[0, 1]`.
pub fn build_render_frame(components: &Components, tick: u64, fraction: f32) -> RenderFrame {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };

    let poses = collect_poses(components)
        .iter()
        .map(|pose| pose.interpolate(fraction))
        .collect();

    let trails = components
        .smoke_trails
        .iter()
        .map(|(entity, trail)| TrailView {
            entity,
            missile: trail.missile,
            points: trail.points.clone(),
        })
        .collect();

    let explosions = components
        .explosions
        .iter()
        .map(|(entity, blast)| ExplosionView {
            entity,
            x: blast.center.x,
            y: blast.center.y,
            radius: blast.radius,
            alpha: explosion::alpha(blast),
        })
        .collect();

    RenderFrame {
        tick,
        interpolation: fraction,
        poses,
        trails,
        explosions,
    }
}
