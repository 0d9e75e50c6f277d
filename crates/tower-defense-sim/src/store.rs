//! Sparse component store: one map per component kind, keyed by entity.
//!
//! There is no entity registry. An entity is alive for a system if it has the
//! components that system looks at. Nothing enforces references between
//! kinds, so every cross-kind lookup returns an `Option`.

use std::collections::BTreeMap;

use tower_defense_core::components::*;
use tower_defense_core::events::EntityKind;
use tower_defense_core::types::Entity;

/// Mapping from entity to one kind of component.
///
/// Backed by a `BTreeMap` so iteration runs in entity order, which is also
/// creation order since ids are never reused. Keeps ticks deterministic.
#[derive(Debug, Clone)]
pub struct ComponentStore<T> {
    entries: BTreeMap<Entity, T>,
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> ComponentStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the previous value, if any.
    pub fn set(&mut self, entity: Entity, value: T) -> Option<T> {
        self.entries.insert(entity, value)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.entries.get(&entity)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.entries.get_mut(&entity)
    }

    pub fn delete(&mut self, entity: Entity) -> Option<T> {
        self.entries.remove(&entity)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entries.iter().map(|(entity, value)| (*entity, value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entries.iter_mut().map(|(entity, value)| (*entity, value))
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entries.keys().copied()
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(Entity, &mut T) -> bool) {
        self.entries.retain(|entity, value| keep(*entity, value));
    }
}

/// Issues entity ids from a monotonic counter. Ids are never reused; at
/// 64 bits the counter cannot wrap within any realistic run.
#[derive(Debug, Clone, Default)]
pub struct EntityIds {
    next: u64,
}

impl EntityIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Entity {
        let entity = Entity(self.next);
        self.next += 1;
        entity
    }
}

/// All component maps of the simulation.
#[derive(Debug, Clone, Default)]
pub struct Components {
    pub mobs: ComponentStore<Mob>,
    pub walk_intents: ComponentStore<WalkIntent>,
    pub towers: ComponentStore<Tower>,
    pub missile_spawners: ComponentStore<MissileSpawner>,
    pub missiles: ComponentStore<Missile>,
    pub smoke_trails: ComponentStore<SmokeTrail>,
    pub smoke_particles: ComponentStore<SmokeParticle>,
    pub swallows: ComponentStore<Swallow>,
    pub impulses: ComponentStore<Impulse>,
    pub explosions: ComponentStore<Explosion>,
    /// Render kind of every entity a collaborator draws.
    pub markers: ComponentStore<EntityKind>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every component of an entity. Returns whether anything was removed.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let mut removed = false;
        removed |= self.mobs.delete(entity).is_some();
        removed |= self.walk_intents.delete(entity).is_some();
        removed |= self.towers.delete(entity).is_some();
        removed |= self.missile_spawners.delete(entity).is_some();
        removed |= self.missiles.delete(entity).is_some();
        removed |= self.smoke_trails.delete(entity).is_some();
        removed |= self.smoke_particles.delete(entity).is_some();
        removed |= self.swallows.delete(entity).is_some();
        removed |= self.impulses.delete(entity).is_some();
        removed |= self.explosions.delete(entity).is_some();
        removed |= self.markers.delete(entity).is_some();
        removed
    }
}
