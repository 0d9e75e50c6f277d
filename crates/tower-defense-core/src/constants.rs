//! Simulation constants and tuning parameters.

use std::f32::consts::PI;

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Milliseconds of real time covered by one tick at 1x speed.
pub const MS_PER_UPDATE: f64 = 1000.0 / TICK_RATE as f64;

/// Catch-up cap: ticks run per rendered frame before the loop gives up on lag.
pub const MAX_UPDATES_PER_FRAME: u32 = 7;

/// Game speed multiplier when fast-forward is on.
pub const FAST_GAME_SPEED: f64 = 3.0;

// --- Map ---

/// Side length of one tile in pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Visible play area width in tiles.
pub const MAP_WIDTH: usize = 22;

/// Visible play area height in tiles.
pub const MAP_HEIGHT: usize = 18;

/// Border cells on each side of the visible area.
/// Paths start and end inside this ring so mobs can walk in from off-screen.
pub const MAP_PADDING: i32 = 2;

/// Authored map width including the border.
pub const TRUE_MAP_WIDTH: usize = MAP_WIDTH + 2 * MAP_PADDING as usize;

/// Authored map height including the border.
pub const TRUE_MAP_HEIGHT: usize = MAP_HEIGHT + 2 * MAP_PADDING as usize;

// --- Walking ---

/// Pixels per tick a walker contributes along its path direction.
pub const WALK_SPEED: f32 = 1.5;

// --- Missiles ---

/// Speed gained per tick before air resistance (px/tick²).
pub const MISSILE_ACCELERATION: f32 = 0.15;

/// Asymptotic missile speed (px/tick).
pub const MISSILE_TOP_SPEED: f32 = 7.0;

/// Turn radius at top speed (px). Max turn rate is top speed / turn radius.
pub const MISSILE_TURN_RADIUS: f32 = 3.0 * TILE_SIZE;

/// Ticks between launches from one missile tower.
pub const MISSILE_RELOAD_TICKS: u32 = 90;

/// Missile hits when closer than this to its target (px).
pub const MISSILE_COLLISION_THRESHOLD: f32 = 5.0;

// --- Smoke ---

/// Ticks between particle emissions on a trail.
pub const SMOKE_SPACING: u32 = 1;

/// Render points per trail; also bounds particle lifetime.
pub const SMOKE_BUFFER_LEN: usize = 40;

/// Lateral offset (px) of the newest trail point; each older slot adds 1 px.
pub const SMOKE_BASE_AMPLITUDE: f32 = 3.0;

/// `(frequency, shift)` of the three braided trails spawned per missile.
pub const SMOKE_WAVES: [(f32, f32); 3] = [
    (0.2, 0.0),
    (0.12, 2.0 / 3.0 * PI),
    (0.2, 4.0 / 3.0 * PI),
];

// --- Waves ---

/// Ticks from the start of one wave to the start of the next.
pub const TICKS_PER_WAVE: u32 = 20 * TICK_RATE;

/// Delay between successive walkers leaving the same entrance.
pub const TICKS_BETWEEN_SPAWNS: u32 = 40;

// --- Explosions and knockback ---

/// Final radius of a missile explosion (px).
pub const EXPLOSION_RADIUS: f32 = 1.2 * TILE_SIZE;

/// Ticks an explosion takes to expand to full radius.
pub const EXPLOSION_TICKS: u32 = 16;

/// Body radius a walker is pushed by (px).
pub const WALKER_RADIUS: f32 = 0.3 * TILE_SIZE;

/// Fraction of knockback velocity kept from one tick to the next.
pub const IMPULSE_DECAY: f32 = 0.95;

/// Cap on knockback speed (px/tick).
pub const MAX_IMPULSE: f32 = TILE_SIZE / 2.0;

/// Knockback below this speed (px/tick) is dropped to zero.
pub const IMPULSE_REST_SPEED: f32 = 0.01;
