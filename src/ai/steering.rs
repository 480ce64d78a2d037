//! Steering behaviors for agent movement
//!
//! Local, per-tick adjustments layered on top of path following: seek
//! (clamped so it never overshoots), separation between agents, and
//! circling around the target.

use glam::Vec2;

use crate::world::TileCoord;

/// Distance at which a path node counts as reached
pub const NODE_REACHED_DISTANCE: f32 = 2.0;

/// Output from a steering behavior
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Desired velocity contribution
    pub linear: Vec2,
}

impl SteeringOutput {
    /// Zero steering
    pub const ZERO: Self = Self { linear: Vec2::ZERO };

    /// Combine with another steering output
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self {
            linear: self.linear + other.linear,
        }
    }

    /// Scale the output
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self {
            linear: self.linear * factor,
        }
    }
}

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// Calculate steering for an agent at `position`
    fn calculate(&self, position: Vec2) -> SteeringOutput;
}

/// Seek behavior - move towards target
#[derive(Debug, Clone)]
pub struct Seek {
    /// Target position
    pub target: Vec2,
    /// Maximum speed
    pub max_speed: f32,
}

impl Seek {
    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec2, max_speed: f32) -> Self {
        Self { target, max_speed }
    }

    /// Displacement for one tick, clamped so the target is never overshot
    #[must_use]
    pub fn step(&self, position: Vec2, dt: f32) -> Vec2 {
        let to_target = self.target - position;
        if to_target.length() <= self.max_speed * dt {
            to_target
        } else {
            self.calculate(position).scale(dt).linear
        }
    }
}

impl SteeringBehavior for Seek {
    fn calculate(&self, position: Vec2) -> SteeringOutput {
        let direction = (self.target - position).normalize_or_zero();
        SteeringOutput {
            linear: direction * self.max_speed,
        }
    }
}

/// Separation behavior - push away from nearby agents
#[derive(Debug, Clone)]
pub struct Separation<'a> {
    /// Positions of other agents
    pub neighbors: &'a [Vec2],
    /// Agents closer than this push apart
    pub radius: f32,
    /// Push speed at full overlap
    pub strength: f32,
}

impl<'a> Separation<'a> {
    /// Create a new separation behavior
    #[must_use]
    pub fn new(neighbors: &'a [Vec2], radius: f32, strength: f32) -> Self {
        Self {
            neighbors,
            radius,
            strength,
        }
    }
}

impl SteeringBehavior for Separation<'_> {
    fn calculate(&self, position: Vec2) -> SteeringOutput {
        let mut push = Vec2::ZERO;

        for &other in self.neighbors {
            let away = position - other;
            let distance = away.length();
            if distance >= self.radius {
                continue;
            }
            // Stacked exactly: pick a fixed axis so the pair can split
            let direction = if distance > f32::EPSILON {
                away / distance
            } else {
                Vec2::X
            };
            push += direction * (1.0 - distance / self.radius);
        }

        SteeringOutput {
            linear: push * self.strength,
        }
    }
}

/// Circle behavior - strafe sideways around a center
#[derive(Debug, Clone)]
pub struct Circle {
    /// Point to circle around
    pub center: Vec2,
    /// Strafing speed
    pub speed: f32,
    /// +1 counter-clockwise, -1 clockwise
    pub direction: f32,
}

impl Circle {
    /// Create a new circle behavior
    #[must_use]
    pub fn new(center: Vec2, speed: f32, direction: f32) -> Self {
        Self {
            center,
            speed,
            direction: direction.signum(),
        }
    }
}

impl SteeringBehavior for Circle {
    fn calculate(&self, position: Vec2) -> SteeringOutput {
        let to_center = (self.center - position).normalize_or_zero();
        SteeringOutput {
            linear: to_center.perp() * self.direction * self.speed,
        }
    }
}

/// Move along a tile route.
///
/// Skips nodes already reached and returns the clamped displacement toward
/// the next one, or `None` once the route is exhausted.
pub fn follow_path(
    position: Vec2,
    path: &[TileCoord],
    index: &mut usize,
    tile_size: f32,
    max_speed: f32,
    dt: f32,
) -> Option<Vec2> {
    while let Some(node) = path.get(*index) {
        let target = node.center(tile_size);
        if position.distance(target) <= NODE_REACHED_DISTANCE {
            *index += 1;
            continue;
        }
        return Some(Seek::new(target, max_speed).step(position, dt));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek() {
        let seek = Seek::new(Vec2::new(10.0, 0.0), 5.0);
        let output = seek.calculate(Vec2::ZERO);

        assert!(output.linear.x > 0.0);
        assert!((output.linear.length() - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_seek_step_never_overshoots() {
        let seek = Seek::new(Vec2::new(3.0, 4.0), 100.0);
        let step = seek.step(Vec2::ZERO, 1.0);
        assert_eq!(step, Vec2::new(3.0, 4.0));

        let slow = Seek::new(Vec2::new(100.0, 0.0), 10.0).step(Vec2::ZERO, 0.5);
        assert!((slow.x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_separation_pushes_apart() {
        let neighbors = [Vec2::new(10.0, 0.0), Vec2::new(500.0, 0.0)];
        let separation = Separation::new(&neighbors, 36.0, 60.0);
        let output = separation.calculate(Vec2::ZERO);

        assert!(output.linear.x < 0.0);
        assert!(output.linear.y.abs() < 1e-5);
        // Only the close neighbor counts: 1 - 10/36 of full strength
        assert!((output.linear.length() - 60.0 * (1.0 - 10.0 / 36.0)).abs() < 1e-3);
    }

    #[test]
    fn test_separation_out_of_range_is_zero() {
        let neighbors = [Vec2::new(100.0, 0.0)];
        let output = Separation::new(&neighbors, 36.0, 60.0).calculate(Vec2::ZERO);
        assert_eq!(output, SteeringOutput::ZERO);
    }

    #[test]
    fn test_circle_is_tangential() {
        let circle = Circle::new(Vec2::ZERO, 10.0, 1.0);
        let position = Vec2::new(50.0, 0.0);
        let output = circle.calculate(position);

        assert!(output.linear.dot(position).abs() < 1e-4);
        assert!((output.linear.length() - 10.0).abs() < 1e-4);

        let reverse = Circle::new(Vec2::ZERO, 10.0, -3.0).calculate(position);
        assert!((reverse.linear + output.linear).length() < 1e-4);
    }

    #[test]
    fn test_follow_path_advances_and_ends() {
        let path = [TileCoord::new(0, 0), TileCoord::new(1, 0)];
        let mut index = 0;
        // Standing on the first node center: skip it and head for the second
        let step = follow_path(Vec2::new(16.0, 16.0), &path, &mut index, 32.0, 64.0, 0.25);
        assert_eq!(index, 1);
        assert_eq!(step, Some(Vec2::new(16.0, 0.0)));

        let done = follow_path(Vec2::new(48.0, 16.0), &path, &mut index, 32.0, 64.0, 0.25);
        assert_eq!(done, None);
        assert_eq!(index, 2);
    }

    #[test]
    fn test_steering_output_combine_and_scale() {
        let a = SteeringOutput { linear: Vec2::X };
        let b = SteeringOutput { linear: Vec2::Y };

        let combined = a.combine(b).scale(2.0);
        assert!((combined.linear - Vec2::new(2.0, 2.0)).length() < 0.01);
    }
}
