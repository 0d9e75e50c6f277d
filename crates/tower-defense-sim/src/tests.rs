//! Cross-module scenarios: determinism, looping, missile cadence, smoke
//! lifetime and the command queue.

use glam::Vec2;

use tower_defense_core::commands::SimCommand;
use tower_defense_core::config::{
    SimConfig, TowerPlacement, WalkerGroup, WalkerPlacement, Wave, WaveConfig,
};
use tower_defense_core::error::ConfigError;
use tower_defense_core::events::{EntityKind, SimEvent};
use tower_defense_core::state::TickSnapshot;
use tower_defense_core::types::{Entity, TileCoord};

use crate::engine::{SimulationEngine, Stage, SYSTEM_ORDER};

fn one_tower(walkers: Vec<WalkerPlacement>) -> SimConfig {
    SimConfig {
        towers: vec![TowerPlacement { row: 3, col: 6 }],
        walkers,
        ..Default::default()
    }
}

fn launched_missile(snapshot: &TickSnapshot) -> bool {
    snapshot.events.iter().any(|e| {
        matches!(
            e,
            SimEvent::Spawned {
                kind: EntityKind::Missile,
                ..
            }
        )
    })
}

// ---- Determinism ----

#[test]
fn test_determinism_same_config() {
    let mut engine_a = SimulationEngine::demo().unwrap();
    let mut engine_b = SimulationEngine::demo().unwrap();

    for _ in 0..600 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same config");
    }
}

#[test]
fn test_system_order_integrates_once_after_forces() {
    let integrate = SYSTEM_ORDER
        .iter()
        .position(|s| *s == Stage::Integrate)
        .unwrap();
    assert_eq!(
        SYSTEM_ORDER.iter().filter(|s| **s == Stage::Integrate).count(),
        1
    );
    for force in [
        Stage::ExecuteWalk,
        Stage::GuideMissiles,
        Stage::DecayImpulses,
        Stage::Explode,
    ] {
        let at = SYSTEM_ORDER.iter().position(|s| *s == force).unwrap();
        assert!(at < integrate, "{force:?} must run before integration");
    }
    let decay = SYSTEM_ORDER.iter().position(|s| *s == Stage::DecayImpulses);
    let explode = SYSTEM_ORDER.iter().position(|s| *s == Stage::Explode);
    assert!(decay < explode);
    assert_eq!(SYSTEM_ORDER.first(), Some(&Stage::SpawnWaves));
    assert_eq!(SYSTEM_ORDER.last(), Some(&Stage::LoopWalkers));
}

#[test]
fn test_accumulators_zero_after_every_tick() {
    let mut engine = SimulationEngine::demo().unwrap();
    for _ in 0..300 {
        engine.tick();
        for (entity, mob) in engine.components().mobs.iter() {
            assert_eq!(mob.temp_velocity, Vec2::ZERO, "{entity}");
            assert_eq!(mob.temp_acceleration, Vec2::ZERO, "{entity}");
        }
    }
}

#[test]
fn test_snapshot_serialization_round_trip() {
    let mut engine = SimulationEngine::demo().unwrap();
    let snapshot = engine.tick();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: TickSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot, back);
}

// ---- Walking ----

#[test]
fn test_walker_loops_from_exit_to_entrance() {
    // Padded (3, 23) is the last '>' before exit (3, 24).
    let config = SimConfig {
        walkers: vec![WalkerPlacement { x: 703.0, y: 48.0 }],
        ..Default::default()
    };
    let mut engine = SimulationEngine::new(config).unwrap();

    let snapshot = engine.tick();
    let pose = snapshot.poses[0];
    let entrance = TileCoord::new(3, 0);
    assert_eq!(pose.x, (entrance.col as f32 - 1.5) * 32.0);
    assert_eq!(pose.y, (entrance.row as f32 - 1.5) * 32.0);

    // Back on the path, heading east again.
    let snapshot = engine.tick();
    assert_eq!(snapshot.poses[0].x, -48.0 + 1.5);
}

#[test]
fn test_walker_advances_along_path() {
    let config = SimConfig {
        walkers: vec![WalkerPlacement { x: -16.0, y: 48.0 }],
        ..Default::default()
    };
    let mut engine = SimulationEngine::new(config).unwrap();
    for _ in 0..10 {
        engine.tick();
    }
    let mob = engine.components().mobs.iter().next().unwrap().1;
    assert_eq!(mob.position, Vec2::new(-16.0 + 15.0, 48.0));
}

// ---- Missiles ----

#[test]
fn test_tower_fires_every_reload_period() {
    let mut engine =
        SimulationEngine::new(one_tower(vec![WalkerPlacement { x: -16.0, y: 48.0 }])).unwrap();

    let mut launch_ticks = Vec::new();
    for _ in 0..900 {
        let snapshot = engine.tick();
        if launched_missile(&snapshot) {
            launch_ticks.push(snapshot.tick);
        }
    }

    assert_eq!(launch_ticks.len(), 10);
    assert_eq!(launch_ticks[0], 1);
    for pair in launch_ticks.windows(2) {
        assert_eq!(pair[1] - pair[0], 90);
    }
}

#[test]
fn test_starved_tower_waits_for_a_walker() {
    let mut engine = SimulationEngine::new(one_tower(Vec::new())).unwrap();
    let tower = engine.components().towers.entities().next().unwrap();

    for _ in 0..300 {
        let snapshot = engine.tick();
        assert!(!launched_missile(&snapshot));
    }
    let spawner = engine.components().missile_spawners.get(tower).unwrap();
    assert_eq!(spawner.reload_countdown, 0);

    engine.queue_command(SimCommand::SpawnWalker { entrance: 0 });
    let snapshot = engine.tick();
    assert!(launched_missile(&snapshot));
    assert_eq!(
        engine
            .components()
            .missile_spawners
            .get(tower)
            .unwrap()
            .reload_countdown,
        90
    );
}

#[test]
fn test_hit_removes_missile_and_retires_trails_same_tick() {
    let mut engine =
        SimulationEngine::new(one_tower(vec![WalkerPlacement { x: -16.0, y: 48.0 }])).unwrap();
    engine.tick();

    let missile = engine.components().missiles.entities().next().unwrap();
    let trails: Vec<Entity> = engine
        .components()
        .smoke_trails
        .iter()
        .filter(|(_, t)| t.missile == missile)
        .map(|(e, _)| e)
        .collect();
    assert_eq!(trails.len(), 3);

    let target = engine.components().missiles.get(missile).unwrap().target;
    let target_position = engine.components().mobs.get(target).unwrap().position;
    engine
        .components_mut()
        .mobs
        .get_mut(missile)
        .unwrap()
        .position = target_position + Vec2::new(2.0, 0.0);

    let snapshot = engine.tick();
    let despawned: Vec<Entity> = snapshot
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Despawned { entity } => Some(*entity),
            _ => None,
        })
        .collect();
    assert_eq!(despawned[0], missile);
    assert_eq!(&despawned[1..], trails.as_slice());
    assert!(engine.components().missiles.is_empty());
    assert!(engine.components().smoke_trails.is_empty());
    assert!(!engine.components().markers.contains(missile));
    // The walker survives.
    assert!(engine.components().mobs.contains(target));
}

#[test]
fn test_hit_knocks_walker_back_then_decays() {
    let mut config = one_tower(vec![WalkerPlacement { x: -16.0, y: 48.0 }]);
    // A single launch, so no later blast interferes.
    config.missile.reload_cost = 10_000;
    let mut engine = SimulationEngine::new(config).unwrap();
    engine.tick();

    let missile = engine.components().missiles.entities().next().unwrap();
    let walker = engine.components().missiles.get(missile).unwrap().target;
    let walker_position = engine.components().mobs.get(walker).unwrap().position;
    // Just east of the walker, so the blast pushes it west.
    engine
        .components_mut()
        .mobs
        .get_mut(missile)
        .unwrap()
        .position = walker_position + Vec2::new(2.0, 0.0);

    let snapshot = engine.tick();
    assert!(snapshot.events.iter().any(|e| matches!(
        e,
        SimEvent::Spawned {
            kind: EntityKind::Explosion,
            ..
        }
    )));
    let knocked = engine.components().mobs.get(walker).unwrap().velocity;
    assert!(knocked.x < -1.0, "{knocked:?}");
    assert_eq!(knocked.y, 0.0);
    let pose = snapshot.poses.iter().find(|p| p.entity == walker).unwrap();
    assert_eq!(pose.dx, knocked.x);

    let frame = engine.render_frame(0.5);
    let drawn = frame.poses.iter().find(|p| p.entity == walker).unwrap();
    assert_eq!(drawn.x, pose.x + 0.5 * knocked.x);
    assert_eq!(frame.explosions.len(), 1);

    // Struck once; afterwards the knockback only shrinks.
    engine.tick();
    let decayed = engine.components().mobs.get(walker).unwrap().velocity;
    assert!((decayed.x - knocked.x * 0.95).abs() < 1e-5, "{decayed:?}");

    for _ in 0..200 {
        engine.tick();
    }
    assert_eq!(engine.components().mobs.get(walker).unwrap().velocity, Vec2::ZERO);
}

#[test]
fn test_hovering_missile_stays_put_without_target() {
    let mut engine =
        SimulationEngine::new(one_tower(vec![WalkerPlacement { x: -16.0, y: 48.0 }])).unwrap();
    engine.tick();
    let missile = engine.components().missiles.entities().next().unwrap();
    let target = engine.components().missiles.get(missile).unwrap().target;
    engine.components_mut().despawn(target);

    let before = engine.components().mobs.get(missile).unwrap().position;
    for _ in 0..20 {
        engine.tick();
    }
    let after = engine.components().mobs.get(missile).unwrap().position;
    assert_eq!(before, after);
    // Trails keep smoking while the missile exists.
    assert_eq!(engine.components().smoke_trails.len(), 3);
}

// ---- Smoke ----

#[test]
fn test_particle_deleted_forty_ticks_after_spawn() {
    let mut engine =
        SimulationEngine::new(one_tower(vec![WalkerPlacement { x: -16.0, y: 48.0 }])).unwrap();
    engine.tick();

    let first = engine
        .components()
        .smoke_particles
        .entities()
        .next()
        .unwrap();
    for _ in 0..39 {
        engine.tick();
    }
    assert_eq!(
        engine.components().smoke_particles.get(first).map(|p| p.age),
        Some(39)
    );
    engine.tick();
    assert!(!engine.components().smoke_particles.contains(first));
}

#[test]
fn test_trails_render_in_frames() {
    let mut engine =
        SimulationEngine::new(one_tower(vec![WalkerPlacement { x: -16.0, y: 48.0 }])).unwrap();
    for _ in 0..5 {
        engine.tick();
    }
    let frame = engine.render_frame(0.5);
    assert_eq!(frame.trails.len(), 3);
    for trail in &frame.trails {
        assert_eq!(trail.points.len(), 40);
    }
    assert_eq!(frame, engine.render_frame(0.5));
}

// ---- Waves ----

#[test]
fn test_waves_release_walkers_through_entrances() {
    let config = SimConfig {
        waves: WaveConfig {
            ticks_per_wave: 100,
            ticks_between_spawns: 10,
            waves: vec![Wave {
                groups: vec![WalkerGroup { size: 3 }],
            }],
        },
        ..Default::default()
    };
    let mut engine = SimulationEngine::new(config).unwrap();

    let walkers_spawned = |snapshot: &TickSnapshot| {
        snapshot
            .events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    SimEvent::Spawned {
                        kind: EntityKind::Walker,
                        ..
                    }
                )
            })
            .count()
    };

    assert_eq!(walkers_spawned(&engine.tick()), 2);
    assert_eq!(engine.queued_walkers(), 1);
    for _ in 1..10 {
        assert_eq!(walkers_spawned(&engine.tick()), 0);
    }
    assert_eq!(walkers_spawned(&engine.tick()), 1);
    assert_eq!(engine.queued_walkers(), 0);
    assert_eq!(engine.components().walk_intents.len(), 3);
    assert_eq!(engine.components().impulses.len(), 3);

    // No second wave configured.
    for _ in 0..200 {
        assert_eq!(walkers_spawned(&engine.tick()), 0);
    }
}

// ---- Commands and setup ----

#[test]
fn test_command_queue_applies_at_tick_boundary() {
    let mut engine = SimulationEngine::new(SimConfig::default()).unwrap();
    engine.queue_commands([
        SimCommand::PlaceMissileTower { row: 1, col: 1 },
        SimCommand::PlaceMissileTower { row: 3, col: 6 },
        SimCommand::PlaceMissileTower { row: 3, col: 6 },
        SimCommand::PlaceSwallowTower { row: 7, col: 6 },
        SimCommand::SpawnWalker { entrance: 9 },
    ]);
    assert!(engine.components().towers.is_empty());

    let snapshot = engine.tick();
    assert_eq!(engine.components().towers.len(), 2);
    assert_eq!(engine.components().missile_spawners.len(), 1);
    assert_eq!(engine.components().swallows.len(), 1);
    assert!(engine.components().walk_intents.is_empty());
    let kinds: Vec<EntityKind> = snapshot
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Spawned { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![EntityKind::Tower, EntityKind::Tower, EntityKind::Swallow]
    );
}

#[test]
fn test_direct_placement_errors() {
    let mut engine = SimulationEngine::new(SimConfig::default()).unwrap();
    assert!(engine.place_missile_tower(3, 6).is_ok());
    assert!(matches!(
        engine.place_swallow_tower(3, 6),
        Err(ConfigError::TileOccupied { row: 3, col: 6 })
    ));
    assert!(matches!(
        engine.spawn_walker_at_entrance(5),
        Err(ConfigError::UnknownEntrance { index: 5 })
    ));
    assert!(engine.spawn_walker_at_entrance(1).is_ok());
}

#[test]
fn test_invalid_config_builds_nothing() {
    let config = SimConfig {
        towers: vec![
            TowerPlacement { row: 3, col: 6 },
            TowerPlacement { row: 1, col: 1 },
        ],
        ..Default::default()
    };
    assert!(matches!(
        SimulationEngine::new(config),
        Err(ConfigError::TowerOnPath { row: 1, col: 1 })
    ));

    let mut config = SimConfig::default();
    config.map.path[4].push('#');
    assert!(matches!(
        SimulationEngine::new(config),
        Err(ConfigError::RaggedMap { row: 4, .. })
    ));
}

#[test]
fn test_bad_tuning_is_rejected_at_setup() {
    let mut config = one_tower(vec![WalkerPlacement { x: -16.0, y: 48.0 }]);
    config.smoke.spacing = 70_000;
    config.smoke.buffer_len = 70_000;
    assert!(matches!(
        SimulationEngine::new(config),
        Err(ConfigError::SmokeLifetimeOverflow { .. })
    ));

    let mut config = one_tower(vec![WalkerPlacement { x: -16.0, y: 48.0 }]);
    config.missile.acceleration = -7.0;
    config.missile.top_speed = 7.0;
    assert!(matches!(
        SimulationEngine::new(config),
        Err(ConfigError::NonPositiveParam {
            field: "missile.acceleration",
            ..
        })
    ));
}

#[test]
fn test_missile_positions_stay_finite() {
    let mut engine =
        SimulationEngine::new(one_tower(vec![WalkerPlacement { x: -16.0, y: 48.0 }])).unwrap();
    for _ in 0..600 {
        for pose in engine.tick().poses {
            assert!(pose.x.is_finite() && pose.y.is_finite(), "{pose:?}");
        }
    }
}

#[test]
fn test_ids_never_reused_across_despawns() {
    let mut engine =
        SimulationEngine::new(one_tower(vec![WalkerPlacement { x: -16.0, y: 48.0 }])).unwrap();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..400 {
        let snapshot = engine.tick();
        for event in &snapshot.events {
            if let SimEvent::Spawned { entity, .. } = event {
                assert!(seen.insert(*entity), "{entity} spawned twice");
            }
        }
    }
}
