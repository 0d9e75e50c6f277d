//! Entity spawn factories and setup-time validation.
//!
//! Creates walkers, missile towers and swallow towers with the component
//! bundles the systems expect, and checks a configuration before anything
//! is spawned from it.

use std::collections::HashSet;

use glam::Vec2;
use tracing::info;

use tower_defense_core::components::*;
use tower_defense_core::config::{
    MapConfig, SimConfig, TowerPlacement, WalkerGroup, WalkerPlacement, Wave, WaveConfig,
};
use tower_defense_core::constants::TILE_SIZE;
use tower_defense_core::error::ConfigError;
use tower_defense_core::events::{EntityKind, SimEvent};
use tower_defense_core::map::{Tile, TileMap};
use tower_defense_core::types::{Entity, TileCoord};

use crate::path_field::PathField;
use crate::store::{ComponentStore, Components, EntityIds};

/// The demo world: four walkers near the west entrances, two missile towers
/// and two swallow towers on the default map, with two waves to follow.
pub fn demo_config() -> SimConfig {
    let tiles = |x: f32, y: f32| WalkerPlacement {
        x: x * TILE_SIZE,
        y: y * TILE_SIZE,
    };
    SimConfig {
        towers: vec![
            TowerPlacement { row: 3, col: 6 },
            TowerPlacement { row: 10, col: 13 },
        ],
        swallow_towers: vec![
            TowerPlacement { row: 7, col: 6 },
            TowerPlacement { row: 14, col: 14 },
        ],
        walkers: vec![
            tiles(-0.5, 1.5),
            tiles(-0.5, 2.5),
            tiles(1.5, 1.5),
            tiles(1.5, 2.5),
        ],
        waves: WaveConfig {
            waves: vec![
                Wave {
                    groups: vec![WalkerGroup { size: 6 }],
                },
                Wave {
                    groups: vec![WalkerGroup { size: 6 }, WalkerGroup { size: 4 }],
                },
            ],
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Check a whole configuration. Returns the path field on success.
pub fn validate_config(config: &SimConfig) -> Result<PathField, ConfigError> {
    config.validate_tuning()?;
    let field = validate_map(&config.map)?;

    if !config.waves.waves.is_empty() && config.map.entrances.is_empty() {
        return Err(ConfigError::WavesWithoutEntrances {
            waves: config.waves.waves.len(),
        });
    }

    let mut occupied = HashSet::new();
    for placement in config.towers.iter().chain(&config.swallow_towers) {
        check_tower_tile(field.map(), placement.row, placement.col)?;
        if !occupied.insert((placement.row, placement.col)) {
            return Err(ConfigError::TileOccupied {
                row: placement.row,
                col: placement.col,
            });
        }
    }
    Ok(field)
}

/// Parse the map and check the entrance/exit lists against it.
pub fn validate_map(config: &MapConfig) -> Result<PathField, ConfigError> {
    let map = TileMap::parse(config.path.as_slice())?;

    if config.entrances.is_empty() && !config.exits.is_empty() {
        return Err(ConfigError::MissingEntrances {
            exits: config.exits.len(),
        });
    }
    for coord in config.entrances.iter().chain(&config.exits) {
        if !map.contains(*coord) {
            return Err(ConfigError::TileOutOfBounds {
                row: coord.row,
                col: coord.col,
            });
        }
    }
    Ok(PathField::new(map))
}

/// A tower may only go on open ground inside the map.
/// `row` and `col` are visible-area coordinates.
pub fn check_tower_tile(map: &TileMap, row: i32, col: i32) -> Result<(), ConfigError> {
    match map.tile(TileCoord::from_visible(row, col)) {
        None => Err(ConfigError::TowerOutOfBounds { row, col }),
        Some(Tile::Open) => Ok(()),
        Some(Tile::Blocked) => Err(ConfigError::TowerOnBlocked { row, col }),
        Some(Tile::Path(_)) | Some(Tile::Turn) => Err(ConfigError::TowerOnPath { row, col }),
    }
}

/// Tower already standing on a visible-area tile, if any.
pub fn tower_at(towers: &ComponentStore<Tower>, row: i32, col: i32) -> Option<Entity> {
    towers
        .iter()
        .find(|(_, tower)| tower.row == row && tower.col == col)
        .map(|(entity, _)| entity)
}

/// Spawn every tower and walker a validated config asks for.
pub fn populate(
    components: &mut Components,
    ids: &mut EntityIds,
    config: &SimConfig,
    events: &mut Vec<SimEvent>,
) {
    for placement in &config.towers {
        spawn_missile_tower(
            components,
            ids,
            placement.row,
            placement.col,
            config.missile.reload_cost,
            events,
        );
    }
    for placement in &config.swallow_towers {
        spawn_swallow_tower(components, ids, placement.row, placement.col, events);
    }
    for placement in &config.walkers {
        spawn_walker(
            components,
            ids,
            placement.position(),
            config.knockback.decay,
            events,
        );
    }
    info!(
        towers = components.towers.len(),
        walkers = components.walk_intents.len(),
        "world populated"
    );
}

/// Spawn a walker at a world position. It picks a direction on its next tick
/// and can be knocked back by explosions.
pub fn spawn_walker(
    components: &mut Components,
    ids: &mut EntityIds,
    position: Vec2,
    impulse_decay: f32,
    events: &mut Vec<SimEvent>,
) -> Entity {
    let entity = ids.allocate();
    components.mobs.set(entity, Mob::at(position));
    components.walk_intents.set(entity, WalkIntent::default());
    components.impulses.set(
        entity,
        Impulse {
            decay: impulse_decay,
        },
    );
    mark(components, entity, EntityKind::Walker, events);
    entity
}

/// Spawn a missile tower. The launcher is ready to fire immediately.
pub fn spawn_missile_tower(
    components: &mut Components,
    ids: &mut EntityIds,
    row: i32,
    col: i32,
    reload_cost: u32,
    events: &mut Vec<SimEvent>,
) -> Entity {
    let entity = ids.allocate();
    components.towers.set(entity, Tower { row, col });
    components.missile_spawners.set(
        entity,
        MissileSpawner {
            reload_countdown: 0,
            reload_cost,
        },
    );
    mark(components, entity, EntityKind::Tower, events);
    entity
}

/// Spawn a swallow tower and the swallow roosting in it.
/// Returns the tower entity.
pub fn spawn_swallow_tower(
    components: &mut Components,
    ids: &mut EntityIds,
    row: i32,
    col: i32,
    events: &mut Vec<SimEvent>,
) -> Entity {
    let tower = ids.allocate();
    components.towers.set(tower, Tower { row, col });
    mark(components, tower, EntityKind::Tower, events);

    let center = TileCoord::from_visible(row, col).center();
    let swallow = ids.allocate();
    components.swallows.set(
        swallow,
        Swallow {
            roost: Some(tower),
            target: tower,
            fixed_speed: 0.0,
            turn_radius: 0.0,
            vanishing_point: center,
        },
    );
    components.mobs.set(swallow, Mob::at(center));
    mark(components, swallow, EntityKind::Swallow, events);
    tower
}

fn mark(components: &mut Components, entity: Entity, kind: EntityKind, events: &mut Vec<SimEvent>) {
    components.markers.set(entity, kind);
    events.push(SimEvent::Spawned { entity, kind });
}
