//! Missile blasts and the knockback they deal.
//!
//! A blast grows to full radius along a sine ease. The tick its front first
//! reaches a pushable mob, that mob gets a kick away from the centre, added
//! into its acceleration accumulator so it lands in persistent velocity.
//! Knockback velocity then decays geometrically until it comes to rest.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use tracing::debug;

use tower_defense_core::components::{Explosion, Mob};
use tower_defense_core::config::KnockbackParams;
use tower_defense_core::constants::IMPULSE_REST_SPEED;
use tower_defense_core::events::{EntityKind, SimEvent};
use tower_defense_core::types::Entity;

use crate::store::{Components, EntityIds};

/// Create a blast at `center`.
pub fn spawn_explosion(
    components: &mut Components,
    ids: &mut EntityIds,
    center: Vec2,
    params: &KnockbackParams,
    events: &mut Vec<SimEvent>,
) -> Entity {
    let entity = ids.allocate();
    components.explosions.set(
        entity,
        Explosion::at(center, params.explosion_radius, params.explosion_ticks),
    );
    components.markers.set(entity, EntityKind::Explosion);
    events.push(SimEvent::Spawned {
        entity,
        kind: EntityKind::Explosion,
    });
    debug!(%entity, x = center.x, y = center.y, "explosion");
    entity
}

/// Grow every blast by one tick, push the mobs its front reaches, and remove
/// blasts that have run their course.
pub fn update_explosions(
    components: &mut Components,
    params: &KnockbackParams,
    events: &mut Vec<SimEvent>,
) {
    let mut finished: Vec<Entity> = Vec::new();

    {
        let Components {
            mobs,
            impulses,
            explosions,
            ..
        } = &mut *components;

        for (entity, explosion) in explosions.iter_mut() {
            if explosion.age >= explosion.duration {
                finished.push(entity);
                continue;
            }
            explosion.age += 1;
            explosion.radius = explosion.max_radius * progress(explosion).sin();

            let reach = params.walker_radius + explosion.radius;
            let strength = 1.5 - 0.5 * explosion.radius / explosion.max_radius;

            for target in impulses.entities() {
                if explosion.struck.contains(&target) {
                    continue;
                }
                let mob = match mobs.get_mut(target) {
                    Some(m) => m,
                    None => continue,
                };
                let offset = mob.position - explosion.center;
                if offset.length_squared() > reach * reach {
                    continue;
                }
                push(mob, offset.normalize_or_zero() * strength, params.max_impulse);
                explosion.struck.push(target);
            }
        }
    }

    for entity in finished {
        if components.despawn(entity) {
            events.push(SimEvent::Despawned { entity });
        }
    }
}

/// Shrink the knockback velocity of every pushable mob by its decay factor.
/// Velocity below a crawl is dropped to zero.
pub fn decay_impulses(components: &mut Components) {
    let Components {
        mobs, impulses, ..
    } = components;

    for (entity, impulse) in impulses.iter() {
        let mob = match mobs.get_mut(entity) {
            Some(m) => m,
            None => continue,
        };
        let mut kept = mob.velocity * impulse.decay;
        if kept.length() < IMPULSE_REST_SPEED {
            kept = Vec2::ZERO;
        }
        mob.temp_acceleration += kept - mob.velocity;
    }
}

/// Add `kick` to the velocity the mob will have after integration, keeping
/// that velocity no faster than `max_speed`.
pub fn push(mob: &mut Mob, kick: Vec2, max_speed: f32) {
    let pending = mob.velocity + mob.temp_acceleration;
    let next = (pending + kick).clamp_length_max(max_speed);
    mob.temp_acceleration += next - pending;
}

/// Eased expansion angle, `PI / 2` at full size.
fn progress(explosion: &Explosion) -> f32 {
    explosion.age as f32 / explosion.duration.max(1) as f32 * FRAC_PI_2
}

/// Blast opacity: starts near 1 and fades to 0 at full size.
pub fn alpha(explosion: &Explosion) -> f32 {
    progress(explosion).cos()
}
