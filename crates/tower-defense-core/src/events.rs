//! Lifecycle events emitted by the simulation for rendering collaborators.

use serde::{Deserialize, Serialize};

use crate::types::Entity;

/// What a newly spawned entity looks like, so a renderer can allocate a
/// matching visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Walker,
    Missile,
    /// A point buffer drawn as a ribbon.
    SmokeTrail,
    Tower,
    Swallow,
    /// A blast drawn as an expanding ring.
    Explosion,
}

/// Entity lifecycle notification. Buffered during a tick, handed out after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    Spawned { entity: Entity, kind: EntityKind },
    Despawned { entity: Entity },
}

impl SimEvent {
    pub fn entity(&self) -> Entity {
        match *self {
            SimEvent::Spawned { entity, .. } | SimEvent::Despawned { entity } => entity,
        }
    }
}
