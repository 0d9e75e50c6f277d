//! Path following: direction planning, walking and exit-to-entrance looping.

use glam::Vec2;
use tracing::debug;

use tower_defense_core::types::TileCoord;

use crate::path_field::PathField;
use crate::store::Components;

/// Set each walker's direction from the path field at its current position.
/// Walkers off the map stand still.
pub fn plan_walk(components: &mut Components, path: &PathField) {
    let Components {
        mobs, walk_intents, ..
    } = components;

    for (entity, intent) in walk_intents.iter_mut() {
        let mob = match mobs.get(entity) {
            Some(m) => m,
            None => continue,
        };
        intent.direction = match path.direction_at(mob.position) {
            Some(direction) => direction,
            None => {
                debug!(%entity, x = mob.position.x, y = mob.position.y, "walker off map");
                Vec2::ZERO
            }
        };
    }
}

/// Add `direction * speed` into each walker's displacement accumulator.
pub fn execute_walk(components: &mut Components, walk_speed: f32) {
    let Components {
        mobs, walk_intents, ..
    } = components;

    for (entity, intent) in walk_intents.iter() {
        if let Some(mob) = mobs.get_mut(entity) {
            mob.temp_velocity += intent.direction * walk_speed;
        }
    }
}

/// Teleport walkers standing on exit `i` to the centre of entrance `i`, or
/// entrance 0 when `i` has no pair. Exact tile match, no proximity.
pub fn loop_walkers(components: &mut Components, entrances: &[TileCoord], exits: &[TileCoord]) {
    let Components {
        mobs, walk_intents, ..
    } = components;

    for entity in walk_intents.entities() {
        let mob = match mobs.get_mut(entity) {
            Some(m) => m,
            None => continue,
        };
        let tile = TileCoord::from_world(mob.position);
        let exit_index = match exits.iter().position(|exit| *exit == tile) {
            Some(i) => i,
            None => continue,
        };
        if let Some(entrance) = entrances.get(exit_index).or_else(|| entrances.first()) {
            debug!(%entity, exit = %tile, entrance = %entrance, "walker looped");
            mob.position = entrance.center();
        }
    }
}
