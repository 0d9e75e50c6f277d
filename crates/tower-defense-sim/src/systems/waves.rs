//! Wave spawner: releases configured walker groups through the entrances.

use tracing::{debug, info};

use tower_defense_core::config::{SimConfig, Wave};
use tower_defense_core::events::SimEvent;

use crate::store::{Components, EntityIds};
use crate::world_setup;

/// A walker waiting for its release tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedWalker {
    /// Index into the configured entrances.
    pub entrance: usize,
    pub spawn_tick: u64,
}

/// Walkers from started waves that have not left their entrance yet,
/// in release order.
#[derive(Debug, Clone, Default)]
pub struct WaveSpawner {
    queued: Vec<QueuedWalker>,
}

impl WaveSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queued(&self) -> &[QueuedWalker] {
        &self.queued
    }

    /// Deal a wave's walkers round-robin over `entrance_count` entrances,
    /// staggering each entrance by `ticks_between_spawns`.
    pub fn queue_wave(
        &mut self,
        wave: &Wave,
        entrance_count: usize,
        ticks_between_spawns: u32,
        tick: u64,
    ) {
        if entrance_count == 0 {
            return;
        }
        let walkers = wave
            .groups
            .iter()
            .flat_map(|group| 0..group.size)
            .enumerate();
        for (i, _) in walkers {
            let round = (i / entrance_count) as u64;
            self.queued.push(QueuedWalker {
                entrance: i % entrance_count,
                spawn_tick: tick + round * u64::from(ticks_between_spawns),
            });
        }
    }

    /// Remove and return the walkers due by `tick`.
    fn release(&mut self, tick: u64) -> Vec<QueuedWalker> {
        let mut due = Vec::new();
        self.queued.retain(|walker| {
            if walker.spawn_tick <= tick {
                due.push(*walker);
                false
            } else {
                true
            }
        });
        due
    }
}

/// Start the wave scheduled for `tick`, if any, then spawn every walker due.
pub fn run(
    spawner: &mut WaveSpawner,
    components: &mut Components,
    ids: &mut EntityIds,
    config: &SimConfig,
    tick: u64,
    events: &mut Vec<SimEvent>,
) {
    let schedule = &config.waves;
    let entrances = &config.map.entrances;

    let period = u64::from(schedule.ticks_per_wave.max(1));
    if tick % period == 0 {
        let index = tick / period;
        let wave = usize::try_from(index)
            .ok()
            .and_then(|i| schedule.waves.get(i));
        if let Some(wave) = wave {
            spawner.queue_wave(wave, entrances.len(), schedule.ticks_between_spawns, tick);
            info!(wave = index, walkers = wave.size(), "wave started");
        }
    }

    for walker in spawner.release(tick) {
        let entrance = match entrances.get(walker.entrance) {
            Some(e) => *e,
            None => continue,
        };
        let entity = world_setup::spawn_walker(
            components,
            ids,
            entrance.center(),
            config.knockback.decay,
            events,
        );
        debug!(%entity, %entrance, "wave walker spawned");
    }
}
