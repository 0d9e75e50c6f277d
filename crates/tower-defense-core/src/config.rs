//! Simulation configuration, loaded once at setup.
//!
//! Every field has a default, so a partial JSON document only overrides what
//! it names.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;
use crate::types::TileCoord;

/// The demo map: 22x18 visible tiles plus a 2-tile border ring.
pub const DEFAULT_MAP: [&str; TRUE_MAP_HEIGHT] = [
    "##########################",
    "##########################",
    "##                      ##",
    "#>>>x x>>>x    x>>>x x>>>#",
    "#>>xv nx>xv    nx>xv nx>>#",
    "## vx>xn vv    nn vx>xn ##",
    "## x>>>x vv    nn x>>>x ##",
    "##       vv    nn       ##",
    "## x<<<x vv    nn x<<<x ##",
    "## vx<xn vv    nn vx<xn ##",
    "## vv nx<xv    nx<xv nn ##",
    "## vv x<<<x    x<<<x nn ##",
    "## vv                nn ##",
    "## vv                nn ##",
    "## vv  x>>>x  x>>>x  nn ##",
    "## vv  nx>xv  nx>xv  nn ##",
    "## vv  nn vx>>xn vv  nn ##",
    "## vx>>xn x>>>>x vx>>xn ##",
    "## x>>>>x        x>>>>x ##",
    "##                      ##",
    "##########################",
    "##########################",
];

/// Top-level configuration for a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub map: MapConfig,
    /// Pixels per tick a walker moves along the path.
    pub walk_speed: f32,
    pub missile: MissileParams,
    pub smoke: SmokeParams,
    pub lost_target: LostTargetPolicy,
    pub knockback: KnockbackParams,
    pub waves: WaveConfig,
    /// Missile towers built at setup.
    pub towers: Vec<TowerPlacement>,
    /// Swallow towers built at setup.
    pub swallow_towers: Vec<TowerPlacement>,
    /// Walkers spawned at setup.
    pub walkers: Vec<WalkerPlacement>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            walk_speed: WALK_SPEED,
            missile: MissileParams::default(),
            smoke: SmokeParams::default(),
            lost_target: LostTargetPolicy::default(),
            knockback: KnockbackParams::default(),
            waves: WaveConfig::default(),
            towers: Vec::new(),
            swallow_towers: Vec::new(),
            walkers: Vec::new(),
        }
    }
}

impl SimConfig {
    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every tuning value. Map and placement checks need the parsed
    /// map and happen in the engine's setup.
    pub fn validate_tuning(&self) -> Result<(), ConfigError> {
        non_negative("walk_speed", self.walk_speed)?;
        self.missile.validate()?;
        self.smoke.validate()?;
        self.knockback.validate()?;
        self.waves.validate()
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveParam { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeParam { field, value })
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteParam { field, value })
    }
}

fn at_least_one(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::ZeroCount { field })
    }
}

/// Map layout plus the entrance/exit pairs used to loop walkers.
/// Exit `i` teleports to entrance `i`, or entrance 0 when `i` has no pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub path: Vec<String>,
    pub entrances: Vec<TileCoord>,
    pub exits: Vec<TileCoord>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_MAP.iter().map(|row| row.to_string()).collect(),
            entrances: vec![TileCoord::new(3, 0), TileCoord::new(4, 0)],
            exits: vec![TileCoord::new(3, 24), TileCoord::new(4, 24)],
        }
    }
}

/// Designer-chosen missile tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileParams {
    pub acceleration: f32,
    pub top_speed: f32,
    pub turn_radius: f32,
    pub reload_cost: u32,
    pub collision_threshold: f32,
}

impl MissileParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("missile.acceleration", self.acceleration)?;
        positive("missile.top_speed", self.top_speed)?;
        positive("missile.turn_radius", self.turn_radius)?;
        non_negative("missile.collision_threshold", self.collision_threshold)
    }
}

impl Default for MissileParams {
    fn default() -> Self {
        Self {
            acceleration: MISSILE_ACCELERATION,
            top_speed: MISSILE_TOP_SPEED,
            turn_radius: MISSILE_TURN_RADIUS,
            reload_cost: MISSILE_RELOAD_TICKS,
            collision_threshold: MISSILE_COLLISION_THRESHOLD,
        }
    }
}

/// Smoke trail shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeParams {
    /// Ticks between emissions. Must be at least 1.
    pub spacing: u32,
    pub buffer_len: usize,
    /// One `(frequency, shift)` pair per trail spawned with a missile.
    pub waves: Vec<(f32, f32)>,
}

impl Default for SmokeParams {
    fn default() -> Self {
        Self {
            spacing: SMOKE_SPACING,
            buffer_len: SMOKE_BUFFER_LEN,
            waves: SMOKE_WAVES.to_vec(),
        }
    }
}

impl SmokeParams {
    /// Particle age at which it is deleted, or `None` if that does not fit
    /// in a `u32`.
    pub fn checked_lifetime(&self) -> Option<u32> {
        u32::try_from(self.buffer_len)
            .ok()?
            .checked_mul(self.spacing.max(1))
    }

    /// Particle age at which it is deleted. Saturates on overflow, which a
    /// validated config never reaches.
    pub fn lifetime(&self) -> u32 {
        self.checked_lifetime().unwrap_or(u32::MAX)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least_one("smoke.spacing", u64::from(self.spacing))?;
        at_least_one("smoke.buffer_len", self.buffer_len as u64)?;
        if self.checked_lifetime().is_none() {
            return Err(ConfigError::SmokeLifetimeOverflow {
                spacing: self.spacing,
                buffer_len: self.buffer_len,
            });
        }
        if self.waves.len() != SMOKE_WAVES.len() {
            return Err(ConfigError::SmokeWaveCount {
                expected: SMOKE_WAVES.len(),
                found: self.waves.len(),
            });
        }
        for &(frequency, shift) in &self.waves {
            finite("smoke.waves.frequency", frequency)?;
            finite("smoke.waves.shift", shift)?;
        }
        Ok(())
    }
}

/// Missile blasts and the knockback they deal to walkers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockbackParams {
    pub explosion_radius: f32,
    pub explosion_ticks: u32,
    pub walker_radius: f32,
    /// Fraction of knockback velocity kept each tick, in `[0, 1)`.
    pub decay: f32,
    /// Cap on knockback speed (px/tick).
    pub max_impulse: f32,
}

impl Default for KnockbackParams {
    fn default() -> Self {
        Self {
            explosion_radius: EXPLOSION_RADIUS,
            explosion_ticks: EXPLOSION_TICKS,
            walker_radius: WALKER_RADIUS,
            decay: IMPULSE_DECAY,
            max_impulse: MAX_IMPULSE,
        }
    }
}

impl KnockbackParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("knockback.explosion_radius", self.explosion_radius)?;
        at_least_one("knockback.explosion_ticks", u64::from(self.explosion_ticks))?;
        non_negative("knockback.walker_radius", self.walker_radius)?;
        non_negative("knockback.max_impulse", self.max_impulse)?;
        if !(0.0..1.0).contains(&self.decay) {
            return Err(ConfigError::InvalidDecay { value: self.decay });
        }
        Ok(())
    }
}

/// Walker waves and the schedule that releases them.
///
/// Wave `i` is queued on tick `i * ticks_per_wave`. Its walkers are dealt
/// round-robin over the entrances, and each entrance lets one go every
/// `ticks_between_spawns` ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub ticks_per_wave: u32,
    pub ticks_between_spawns: u32,
    pub waves: Vec<Wave>,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            ticks_per_wave: TICKS_PER_WAVE,
            ticks_between_spawns: TICKS_BETWEEN_SPAWNS,
            waves: Vec::new(),
        }
    }
}

impl WaveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least_one("waves.ticks_per_wave", u64::from(self.ticks_per_wave))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wave {
    pub groups: Vec<WalkerGroup>,
}

impl Wave {
    /// Walkers in the whole wave.
    pub fn size(&self) -> u64 {
        self.groups.iter().map(|group| u64::from(group.size)).sum()
    }
}

/// A run of identical walkers within a wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerGroup {
    pub size: u32,
}

/// What a missile does once its target no longer exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LostTargetPolicy {
    /// Stop thrusting and hang in place.
    #[default]
    Hover,
    /// Keep flying along the current heading at the current speed.
    Coast,
    /// Lock onto the first live walker; coast while there is none.
    Retarget,
}

/// Tower build request in visible-area tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerPlacement {
    pub row: i32,
    pub col: i32,
}

/// Walker spawn position in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkerPlacement {
    pub x: f32,
    pub y: f32,
}

impl WalkerPlacement {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Host loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub ms_per_update: f64,
    pub max_updates_per_frame: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            ms_per_update: MS_PER_UPDATE,
            max_updates_per_frame: MAX_UPDATES_PER_FRAME,
        }
    }
}
