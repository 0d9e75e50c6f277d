//! Simulation engine.
//!
//! `SimulationEngine` owns the component store, applies queued commands at
//! tick boundaries, runs every system in a fixed order, and produces
//! `TickSnapshot`s and `RenderFrame`s. Completely headless and
//! deterministic: the same config and command sequence always produce the
//! same snapshots.

use std::collections::VecDeque;

use glam::Vec2;
use tracing::{info, trace, warn};

use tower_defense_core::commands::SimCommand;
use tower_defense_core::config::SimConfig;
use tower_defense_core::error::ConfigError;
use tower_defense_core::events::SimEvent;
use tower_defense_core::state::{RenderFrame, TickSnapshot};
use tower_defense_core::types::Entity;

use crate::path_field::PathField;
use crate::store::{Components, EntityIds};
use crate::systems;
use crate::systems::waves::WaveSpawner;
use crate::world_setup;

/// One step of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    SpawnWaves,
    PlanWalk,
    ExecuteWalk,
    GuideMissiles,
    DecayImpulses,
    Explode,
    LaunchMissiles,
    Smoke,
    Integrate,
    LoopWalkers,
}

/// Order stages run in within a tick.
///
/// Every stage that adds into the mob accumulators comes before
/// `Integrate`, which runs exactly once. Wave walkers plan their first step
/// on the tick they appear. Blasts from this tick's hits push before
/// integration, on top of already decayed knockback. Looping sees
/// post-integration positions.
pub const SYSTEM_ORDER: [Stage; 10] = [
    Stage::SpawnWaves,
    Stage::PlanWalk,
    Stage::ExecuteWalk,
    Stage::GuideMissiles,
    Stage::DecayImpulses,
    Stage::Explode,
    Stage::LaunchMissiles,
    Stage::Smoke,
    Stage::Integrate,
    Stage::LoopWalkers,
];

/// The simulation engine. Owns the component store and all sim state.
pub struct SimulationEngine {
    components: Components,
    entity_ids: EntityIds,
    path: PathField,
    config: SimConfig,
    waves: WaveSpawner,
    /// Ticks completed so far.
    tick: u64,
    command_queue: VecDeque<SimCommand>,
    events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Validate the config and build the initial world from it.
    /// Nothing is spawned unless the whole config is valid.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let path = world_setup::validate_config(&config)?;
        info!(
            rows = path.map().rows(),
            cols = path.map().cols(),
            entrances = config.map.entrances.len(),
            exits = config.map.exits.len(),
            "map loaded"
        );

        let mut engine = Self {
            components: Components::new(),
            entity_ids: EntityIds::new(),
            path,
            config,
            waves: WaveSpawner::new(),
            tick: 0,
            command_queue: VecDeque::new(),
            events: Vec::new(),
        };
        world_setup::populate(
            &mut engine.components,
            &mut engine.entity_ids,
            &engine.config,
            &mut engine.events,
        );
        Ok(engine)
    }

    /// The demo world on the default map.
    pub fn demo() -> Result<Self, ConfigError> {
        Self::new(world_setup::demo_config())
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> TickSnapshot {
        self.process_commands();
        self.run_systems();
        self.tick += 1;

        let events = std::mem::take(&mut self.events);
        trace!(
            tick = self.tick,
            mobs = self.components.mobs.len(),
            events = events.len(),
            "tick complete"
        );
        systems::snapshot::build_tick_snapshot(&self.components, self.tick, events)
    }

    /// Interpolated view of the current state. Does not touch sim state, so
    /// it may be called any number of times between ticks.
    pub fn render_frame(&self, fraction: f32) -> RenderFrame {
        systems::snapshot::build_render_frame(&self.components, self.tick, fraction)
    }

    /// Build a missile tower on a visible-area tile.
    pub fn place_missile_tower(&mut self, row: i32, col: i32) -> Result<Entity, ConfigError> {
        self.check_tower_site(row, col)?;
        let entity = world_setup::spawn_missile_tower(
            &mut self.components,
            &mut self.entity_ids,
            row,
            col,
            self.config.missile.reload_cost,
            &mut self.events,
        );
        info!(%entity, row, col, "missile tower placed");
        Ok(entity)
    }

    /// Build a swallow tower on a visible-area tile. Returns the tower entity.
    pub fn place_swallow_tower(&mut self, row: i32, col: i32) -> Result<Entity, ConfigError> {
        self.check_tower_site(row, col)?;
        let entity = world_setup::spawn_swallow_tower(
            &mut self.components,
            &mut self.entity_ids,
            row,
            col,
            &mut self.events,
        );
        info!(%entity, row, col, "swallow tower placed");
        Ok(entity)
    }

    /// Spawn a walker at a world position.
    pub fn spawn_walker(&mut self, position: Vec2) -> Entity {
        world_setup::spawn_walker(
            &mut self.components,
            &mut self.entity_ids,
            position,
            self.config.knockback.decay,
            &mut self.events,
        )
    }

    /// Spawn a walker at the centre of a configured entrance.
    pub fn spawn_walker_at_entrance(&mut self, index: usize) -> Result<Entity, ConfigError> {
        let entrance = self
            .config
            .map
            .entrances
            .get(index)
            .copied()
            .ok_or(ConfigError::UnknownEntrance { index })?;
        Ok(self.spawn_walker(entrance.center()))
    }

    /// Ticks completed so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    /// Wave walkers not yet released.
    pub fn queued_walkers(&self) -> usize {
        self.waves.queued().len()
    }

    /// Mutable access to the store (for tests that stage a scenario).
    #[cfg(test)]
    pub fn components_mut(&mut self) -> &mut Components {
        &mut self.components
    }

    fn check_tower_site(&self, row: i32, col: i32) -> Result<(), ConfigError> {
        world_setup::check_tower_tile(self.path.map(), row, col)?;
        if world_setup::tower_at(&self.components.towers, row, col).is_some() {
            return Err(ConfigError::TileOccupied { row, col });
        }
        Ok(())
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(error) = self.handle_command(command) {
                warn!(?command, %error, "command rejected");
            }
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: SimCommand) -> Result<(), ConfigError> {
        match command {
            SimCommand::PlaceMissileTower { row, col } => {
                self.place_missile_tower(row, col)?;
            }
            SimCommand::PlaceSwallowTower { row, col } => {
                self.place_swallow_tower(row, col)?;
            }
            SimCommand::SpawnWalker { entrance } => {
                self.spawn_walker_at_entrance(entrance)?;
            }
        }
        Ok(())
    }

    /// Run all systems in `SYSTEM_ORDER`.
    fn run_systems(&mut self) {
        for stage in SYSTEM_ORDER {
            self.run_stage(stage);
        }
    }

    fn run_stage(&mut self, stage: Stage) {
        match stage {
            // 1. Wave start and walker release
            Stage::SpawnWaves => systems::waves::run(
                &mut self.waves,
                &mut self.components,
                &mut self.entity_ids,
                &self.config,
                self.tick,
                &mut self.events,
            ),
            // 2. Walk direction from the path field
            Stage::PlanWalk => systems::walker::plan_walk(&mut self.components, &self.path),
            // 3. Walk displacement into the accumulators
            Stage::ExecuteWalk => {
                systems::walker::execute_walk(&mut self.components, self.config.walk_speed)
            }
            // 4. Missile steering, thrust and hits
            Stage::GuideMissiles => systems::missile::update_missiles(
                &mut self.components,
                &mut self.entity_ids,
                self.path.map(),
                &self.config.missile,
                &self.config.knockback,
                self.config.lost_target,
                &mut self.events,
            ),
            // 5. Knockback decay
            Stage::DecayImpulses => systems::explosion::decay_impulses(&mut self.components),
            // 6. Blast growth and knockback
            Stage::Explode => systems::explosion::update_explosions(
                &mut self.components,
                &self.config.knockback,
                &mut self.events,
            ),
            // 7. Tower reload and launch
            Stage::LaunchMissiles => systems::missile::operate_towers(
                &mut self.components,
                &mut self.entity_ids,
                &self.config.missile,
                &self.config.smoke,
                &mut self.events,
            ),
            // 8. Smoke aging, emission and point buffers
            Stage::Smoke => systems::smoke::run(
                &mut self.components,
                &mut self.entity_ids,
                &self.config.smoke,
                self.tick,
                &mut self.events,
            ),
            // 9. Movement integration
            Stage::Integrate => systems::movement::run(&mut self.components.mobs),
            // 10. Exit-to-entrance teleport
            Stage::LoopWalkers => systems::walker::loop_walkers(
                &mut self.components,
                &self.config.map.entrances,
                &self.config.map.exits,
            ),
        }
    }
}
