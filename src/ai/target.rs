//! The entity agents hunt
//!
//! Agents never hold on to the player; the caller passes the target into
//! every update and agents act on it only through this trait.

use glam::Vec2;

/// Something agents can perceive, approach and hit
pub trait Target {
    /// World position (center)
    fn position(&self) -> Vec2;

    /// Collision radius used for edge-to-edge combat distance
    fn radius(&self) -> f32;

    /// Unit vector the target is facing
    fn facing(&self) -> Vec2;

    /// Apply damage from an attacker standing at `source`
    fn damage(&mut self, amount: f32, source: Vec2);
}

/// Edge-to-edge distance between two circles
#[must_use]
pub fn combat_distance(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> f32 {
    a.distance(b) - a_radius - b_radius
}
