//! Missile towers and homing missiles.
//!
//! Towers count down a reload timer and launch at the first live walker.
//! Missiles turn toward their target at a bounded rate, accelerate toward a
//! top speed, and detonate on reaching it.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use tracing::debug;

use tower_defense_core::components::{Missile, Mob, WalkIntent};
use tower_defense_core::config::{KnockbackParams, LostTargetPolicy, MissileParams, SmokeParams};
use tower_defense_core::events::{EntityKind, SimEvent};
use tower_defense_core::map::TileMap;
use tower_defense_core::types::{Entity, TileCoord};

use crate::store::{ComponentStore, Components, EntityIds};
use crate::systems::{explosion, smoke};

/// Count down every launcher and fire the ones that are ready.
///
/// A launcher with no walker to shoot at stays ready without resetting, and
/// fires on the first tick a walker shows up.
pub fn operate_towers(
    components: &mut Components,
    ids: &mut EntityIds,
    params: &MissileParams,
    smoke_params: &SmokeParams,
    events: &mut Vec<SimEvent>,
) {
    let mut launches: Vec<(Vec2, Entity, Vec2)> = Vec::new();

    {
        let Components {
            mobs,
            walk_intents,
            towers,
            missile_spawners,
            ..
        } = &mut *components;

        for (entity, spawner) in missile_spawners.iter_mut() {
            let tower = match towers.get(entity) {
                Some(t) => t,
                None => continue,
            };
            spawner.reload_countdown = spawner.reload_countdown.saturating_sub(1);
            if spawner.reload_countdown > 0 {
                continue;
            }
            let target = match first_walker(walk_intents, mobs) {
                Some(t) => t,
                None => continue,
            };
            let target_position = match mobs.get(target) {
                Some(m) => m.position,
                None => continue,
            };
            let origin = TileCoord::from_visible(tower.row, tower.col).center();
            launches.push((origin, target, target_position));
            spawner.reload_countdown = spawner.reload_cost;
        }
    }

    for (origin, target, target_position) in launches {
        let missile = spawn_missile(components, ids, origin, target, target_position, params, events);
        smoke::spawn_trails(components, ids, missile, origin, smoke_params, events);
    }
}

/// Create a missile at `origin` pointing at the target.
pub fn spawn_missile(
    components: &mut Components,
    ids: &mut EntityIds,
    origin: Vec2,
    target: Entity,
    target_position: Vec2,
    params: &MissileParams,
    events: &mut Vec<SimEvent>,
) -> Entity {
    let entity = ids.allocate();
    let aim = target_position - origin;
    components.mobs.set(
        entity,
        Mob {
            position: origin,
            rotation: aim.y.atan2(aim.x),
            ..Default::default()
        },
    );
    components.missiles.set(
        entity,
        Missile {
            target,
            acceleration: params.acceleration,
            speed: 0.0,
            top_speed: params.top_speed,
            turn_radius: params.turn_radius,
        },
    );
    components.markers.set(entity, EntityKind::Missile);
    events.push(SimEvent::Spawned {
        entity,
        kind: EntityKind::Missile,
    });
    debug!(%entity, %target, x = origin.x, y = origin.y, "missile launched");
    entity
}

/// Guide every missile. Missiles that hit are replaced by a blast at the
/// point of impact; coasting missiles that leave the map just vanish.
pub fn update_missiles(
    components: &mut Components,
    ids: &mut EntityIds,
    map: &TileMap,
    params: &MissileParams,
    knockback: &KnockbackParams,
    policy: LostTargetPolicy,
    events: &mut Vec<SimEvent>,
) {
    let collision_threshold = params.collision_threshold;
    let mut finished: Vec<(Entity, Option<Vec2>)> = Vec::new();

    {
        let Components {
            mobs,
            walk_intents,
            missiles,
            ..
        } = &mut *components;

        for (entity, missile) in missiles.iter_mut() {
            let mut target_position = mobs.get(missile.target).map(|m| m.position);

            if target_position.is_none() && policy == LostTargetPolicy::Retarget {
                if let Some(target) = first_walker(walk_intents, mobs) {
                    debug!(%entity, %target, "missile retargeted");
                    missile.target = target;
                    target_position = mobs.get(target).map(|m| m.position);
                }
            }

            let mob = match mobs.get_mut(entity) {
                Some(m) => m,
                None => continue,
            };

            match target_position {
                Some(target) => {
                    steer(mob, missile, target);
                    if collided(mob.position, target, collision_threshold) {
                        debug!(%entity, target = %missile.target, "missile hit");
                        finished.push((entity, Some(mob.position)));
                    }
                }
                None => {
                    if policy == LostTargetPolicy::Hover {
                        continue;
                    }
                    coast(mob, missile);
                    let next = mob.position + mob.temp_velocity;
                    if !map.contains(TileCoord::from_world(next)) {
                        debug!(%entity, "coasting missile left the map");
                        finished.push((entity, None));
                    }
                }
            }
        }
    }

    for (entity, impact) in finished {
        if components.despawn(entity) {
            events.push(SimEvent::Despawned { entity });
        }
        if let Some(point) = impact {
            explosion::spawn_explosion(components, ids, point, knockback, events);
        }
    }
}

/// Turn toward `target` by at most the turn rate, speed up, and add the
/// resulting displacement into the mob's accumulator.
pub fn steer(mob: &mut Mob, missile: &mut Missile, target: Vec2) {
    let to_target = target - mob.position;
    let desired = to_target.y.atan2(to_target.x);
    let max_turn = turn_rate(missile.top_speed, missile.turn_radius);
    let delta = angle_delta(mob.rotation, desired).max(-max_turn).min(max_turn);
    mob.rotation += delta;

    missile.speed = accelerate(missile.speed, missile.acceleration, missile.top_speed);
    mob.temp_velocity += missile.speed * Vec2::from_angle(mob.rotation);
}

/// Keep flying along the current heading without speeding up.
fn coast(mob: &mut Mob, missile: &Missile) {
    mob.temp_velocity += missile.speed * Vec2::from_angle(mob.rotation);
}

/// Signed smallest rotation from `from` to `to`, in `(-PI, PI]`.
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(TAU);
    if delta > PI {
        delta - TAU
    } else {
        delta
    }
}

/// Maximum rotation per tick.
pub fn turn_rate(top_speed: f32, turn_radius: f32) -> f32 {
    top_speed / turn_radius
}

/// Friction-limited acceleration: converges on `top_speed` from below.
pub fn accelerate(speed: f32, acceleration: f32, top_speed: f32) -> f32 {
    (speed + acceleration) * top_speed / (acceleration + top_speed)
}

/// Strictly closer than `threshold`.
pub fn collided(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance_squared(b) < threshold * threshold
}

/// First walker with a body, in entity order.
fn first_walker(
    walk_intents: &ComponentStore<WalkIntent>,
    mobs: &ComponentStore<Mob>,
) -> Option<Entity> {
    walk_intents.entities().find(|entity| mobs.contains(*entity))
}
