//! Kinematic integration.
//!
//! Folds the per-tick accumulators into persistent state and zeroes them.
//! Runs once per tick after every system that adds into them.

use tower_defense_core::components::Mob;

use crate::store::ComponentStore;

/// Integrate every mob.
pub fn run(mobs: &mut ComponentStore<Mob>) {
    for (_entity, mob) in mobs.iter_mut() {
        integrate(mob);
    }
}

/// One integration step.
///
/// Velocity picks up this tick's acceleration before moving, and the
/// displacement contributions move the mob without touching its velocity.
pub fn integrate(mob: &mut Mob) {
    mob.velocity += mob.temp_acceleration;
    mob.position += mob.velocity + mob.temp_velocity;
    mob.rotation += mob.d_rotation;
    mob.temp_velocity = glam::Vec2::ZERO;
    mob.temp_acceleration = glam::Vec2::ZERO;
}
