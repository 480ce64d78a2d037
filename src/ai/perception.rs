//! Agent perception
//!
//! Range, optional vision cone, and line of sight against the tile grid.
//! A successful check latches the target position as "last seen"; a failed
//! one leaves the memory alone so the state machine decides when to forget.

use glam::Vec2;

use crate::core::AiConfig;
use crate::world::TileGrid;

/// Vision parameters plus last-known target memory
#[derive(Debug, Clone)]
pub struct Perception {
    /// Vision radius in world units
    pub vision_radius: f32,
    /// Full cone angle in radians; `None` sees all around
    pub vision_angle: Option<f32>,
    /// Whether solid tiles block sight
    pub occlusion: bool,
    /// Last position the target was seen at
    last_seen: Option<Vec2>,
}

impl Perception {
    /// Create a perception model
    #[must_use]
    pub fn new(vision_radius: f32, vision_angle: Option<f32>, occlusion: bool) -> Self {
        Self {
            vision_radius,
            vision_angle,
            occlusion,
            last_seen: None,
        }
    }

    /// Perception with the configured defaults
    #[must_use]
    pub fn from_config(config: &AiConfig) -> Self {
        Self::new(config.vision_radius, config.vision_angle, config.occlusion)
    }

    /// Test whether `target` is visible from `origin`.
    ///
    /// `facing` enables the cone check; pass `None` to look all around
    /// (e.g. once the agent is already engaged). Remembers the target
    /// position on success.
    pub fn can_see(
        &mut self,
        origin: Vec2,
        facing: Option<Vec2>,
        target: Vec2,
        grid: &TileGrid,
    ) -> bool {
        if !origin.is_finite() || !target.is_finite() {
            return false;
        }

        let visible = self.in_range(origin, target)
            && facing.is_none_or(|f| self.in_cone(origin, f, target))
            && (!self.occlusion || line_of_sight(grid, origin, target, self.vision_radius));

        if visible {
            self.last_seen = Some(target);
        }
        visible
    }

    /// Euclidean range check
    #[must_use]
    pub fn in_range(&self, origin: Vec2, target: Vec2) -> bool {
        origin.distance(target) <= self.vision_radius
    }

    /// Cone check. Always true without a cone or a usable facing vector.
    #[must_use]
    pub fn in_cone(&self, origin: Vec2, facing: Vec2, target: Vec2) -> bool {
        let Some(angle) = self.vision_angle else {
            return true;
        };
        let forward = facing.normalize_or_zero();
        let to_target = (target - origin).normalize_or_zero();
        if forward == Vec2::ZERO || to_target == Vec2::ZERO {
            return true;
        }

        let cos = forward.dot(to_target).clamp(-1.0, 1.0);
        cos.acos() <= angle / 2.0
    }

    /// Last position the target was seen at
    #[must_use]
    pub fn last_seen(&self) -> Option<Vec2> {
        self.last_seen
    }

    /// Overwrite the memory (shared aggro)
    pub fn remember(&mut self, position: Vec2) {
        self.last_seen = Some(position);
    }

    /// Drop the memory
    pub fn forget(&mut self) {
        self.last_seen = None;
    }
}

/// Sample `ceil(vision_radius)` points from `origin` towards `target`
/// (target included); any sample on a solid or undefined tile blocks sight.
#[must_use]
pub fn line_of_sight(grid: &TileGrid, origin: Vec2, target: Vec2, vision_radius: f32) -> bool {
    let samples = vision_radius.ceil().max(1.0) as u32;
    (1..=samples).all(|i| {
        let t = i as f32 / samples as f32;
        let point = origin.lerp(target, t);
        !grid.is_solid_at(point)
    })
}
