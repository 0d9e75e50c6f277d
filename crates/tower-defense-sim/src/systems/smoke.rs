//! Smoke trails behind missiles.
//!
//! Each missile drags several trails. A trail drops a particle every
//! `spacing` ticks at the missile's position; particles age out after
//! `spacing * buffer_len` ticks. Every tick the live particles are written
//! into their trail's point buffer, displaced along their normal by a sine
//! wave keyed to their birth tick.

use glam::Vec2;
use tracing::debug;

use tower_defense_core::components::{SmokeParticle, SmokeTrail};
use tower_defense_core::config::SmokeParams;
use tower_defense_core::constants::SMOKE_BASE_AMPLITUDE;
use tower_defense_core::events::{EntityKind, SimEvent};
use tower_defense_core::types::Entity;

use crate::store::{ComponentStore, Components, EntityIds};

/// Spawn one trail per configured wave for a freshly launched missile.
/// Point buffers start collapsed onto `origin`.
pub fn spawn_trails(
    components: &mut Components,
    ids: &mut EntityIds,
    missile: Entity,
    origin: Vec2,
    params: &SmokeParams,
    events: &mut Vec<SimEvent>,
) -> Vec<Entity> {
    params
        .waves
        .iter()
        .map(|&(frequency, shift)| {
            let entity = ids.allocate();
            components.smoke_trails.set(
                entity,
                SmokeTrail {
                    age: 0,
                    missile,
                    points: vec![origin; params.buffer_len],
                    frequency,
                    shift,
                },
            );
            components.markers.set(entity, EntityKind::SmokeTrail);
            events.push(SimEvent::Spawned {
                entity,
                kind: EntityKind::SmokeTrail,
            });
            entity
        })
        .collect()
}

/// Run the smoke subsystem for one tick: age, emit or retire, then rebuild
/// the point buffers.
pub fn run(
    components: &mut Components,
    ids: &mut EntityIds,
    params: &SmokeParams,
    current_tick: u64,
    events: &mut Vec<SimEvent>,
) {
    age_particles(&mut components.smoke_particles, params.lifetime());
    emit_particles(components, ids, params, events);
    update_trail_points(components, params, current_tick);
}

/// Age every particle and delete those that reached `lifetime`.
pub fn age_particles(particles: &mut ComponentStore<SmokeParticle>, lifetime: u32) {
    particles.retain(|_entity, particle| {
        particle.age += 1;
        particle.age < lifetime
    });
}

/// Emit a particle from every trail whose missile is still flying, and
/// retire trails whose missile is gone. Retiring happens once: the trail
/// entity is removed and a single `Despawned` event is raised.
pub fn emit_particles(
    components: &mut Components,
    ids: &mut EntityIds,
    params: &SmokeParams,
    events: &mut Vec<SimEvent>,
) {
    let spacing = params.spacing.max(1);
    let mut retired: Vec<Entity> = Vec::new();

    {
        let Components {
            mobs,
            missiles,
            smoke_trails,
            smoke_particles,
            ..
        } = &mut *components;

        for (entity, trail) in smoke_trails.iter_mut() {
            let missile_mob = if missiles.contains(trail.missile) {
                mobs.get(trail.missile)
            } else {
                None
            };
            let mob = match missile_mob {
                Some(m) => m,
                None => {
                    retired.push(entity);
                    continue;
                }
            };

            if trail.age % spacing == 0 {
                smoke_particles.set(
                    ids.allocate(),
                    SmokeParticle {
                        age: 0,
                        trail: entity,
                        position: mob.position,
                        normal: Vec2::new(-mob.rotation.sin(), mob.rotation.cos()),
                    },
                );
            }
            trail.age += 1;
        }
    }

    for entity in retired {
        if components.despawn(entity) {
            debug!(%entity, "smoke trail retired");
            events.push(SimEvent::Despawned { entity });
        }
    }
}

/// Write each live particle into its trail's point buffer.
///
/// Slot `age / spacing` gets the emission position pushed `(slot + 3)` pixels
/// along the normal, scaled by `sin(frequency * birth_tick + shift)`.
/// Slots without a particle keep their previous value.
pub fn update_trail_points(components: &mut Components, params: &SmokeParams, current_tick: u64) {
    let spacing = params.spacing.max(1);
    let Components {
        smoke_trails,
        smoke_particles,
        ..
    } = components;

    for (_entity, particle) in smoke_particles.iter() {
        let trail = match smoke_trails.get_mut(particle.trail) {
            Some(t) => t,
            None => continue,
        };
        let slot = (particle.age / spacing) as usize;
        let point = match trail.points.get_mut(slot) {
            Some(p) => p,
            None => continue,
        };
        let birth_tick = current_tick.saturating_sub(particle.age as u64) as f32;
        let wave = (trail.frequency * birth_tick + trail.shift).sin();
        let amplitude = slot as f32 + SMOKE_BASE_AMPLITUDE;
        *point = particle.position + amplitude * wave * particle.normal;
    }
}
