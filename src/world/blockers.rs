//! Dynamic blockers
//!
//! Trees, rocks and structures are not part of the tile grid but still block
//! pathing. Each tick the caller hands over their collision boxes; they are
//! rasterized once into the set of tiles they touch.

use glam::Vec2;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::grid::TileGrid;
use super::tile::TileCoord;

/// Axis-aligned rectangle in world space (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Aabb {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square box of edge `size` centered on `center` (rocks)
    #[must_use]
    pub fn centered(center: Vec2, size: f32) -> Self {
        Self::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }

    /// Check if a point is inside the rectangle
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Inclusive tile range `(top_left, bottom_right)` this box overlaps.
    ///
    /// Edges are floored/ceiled, so a box touching any part of a tile claims
    /// the whole tile. Degenerate boxes still claim the tile they sit in.
    #[must_use]
    pub fn tile_span(&self, tile_size: f32) -> Option<(TileCoord, TileCoord)> {
        if !self.is_finite() || tile_size <= 0.0 {
            return None;
        }
        let left = (self.x / tile_size).floor() as i32;
        let top = (self.y / tile_size).floor() as i32;
        let right = edge_tile(self.x + self.width.max(0.0), tile_size).max(left);
        let bottom = edge_tile(self.y + self.height.max(0.0), tile_size).max(top);
        Some((TileCoord::new(left, top), TileCoord::new(right, bottom)))
    }
}

/// Last tile touched by a max edge; casts saturate on huge values
fn edge_tile(edge: f32, tile_size: f32) -> i32 {
    ((edge / tile_size).ceil() as i32).saturating_sub(1)
}

/// Anything that exposes a world-space collision box
pub trait CollisionBox {
    /// The box that blocks movement
    fn collision_box(&self) -> Aabb;
}

impl CollisionBox for Aabb {
    fn collision_box(&self) -> Aabb {
        *self
    }
}

/// Tiles covered by dynamic blockers this tick
#[derive(Debug, Clone, Default)]
pub struct DynamicBlockers {
    tiles: FxHashSet<TileCoord>,
}

impl DynamicBlockers {
    /// No blockers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterize a set of collision boxes onto `grid`
    #[must_use]
    pub fn from_boxes<B: CollisionBox>(boxes: &[B], grid: &TileGrid) -> Self {
        let mut blockers = Self::new();
        for b in boxes {
            blockers.insert_box(b.collision_box(), grid);
        }
        blockers
    }

    /// Add every in-bounds tile a box touches.
    ///
    /// Tiles outside the grid are solid already and are never stored, so
    /// the cost is bounded by the grid size whatever the box.
    pub fn insert_box(&mut self, aabb: Aabb, grid: &TileGrid) {
        let Some((min, max)) = aabb.tile_span(grid.tile_size()) else {
            log::trace!("Ignoring degenerate blocker box {aabb:?}");
            return;
        };

        let last_x = i32::try_from(grid.width()).unwrap_or(i32::MAX).saturating_sub(1);
        let last_y = i32::try_from(grid.height()).unwrap_or(i32::MAX).saturating_sub(1);
        let (x0, x1) = (min.x.max(0), max.x.min(last_x));
        let (y0, y1) = (min.y.max(0), max.y.min(last_y));
        if x0 > x1 || y0 > y1 {
            log::trace!("Blocker box {aabb:?} lies outside the grid");
            return;
        }

        for y in y0..=y1 {
            for x in x0..=x1 {
                self.tiles.insert(TileCoord::new(x, y));
            }
        }
    }

    /// Check if a tile is covered
    #[must_use]
    #[inline]
    pub fn is_blocked(&self, tile: TileCoord) -> bool {
        self.tiles.contains(&tile)
    }

    /// Number of covered tiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Check if nothing is blocked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Remove all blockers
    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TileGrid {
        TileGrid::new(10, 10, 32.0)
    }

    #[test]
    fn test_box_inside_one_tile() {
        let blockers = DynamicBlockers::from_boxes(&[Aabb::new(36.0, 36.0, 20.0, 20.0)], &grid());
        assert_eq!(blockers.len(), 1);
        assert!(blockers.is_blocked(TileCoord::new(1, 1)));
    }

    #[test]
    fn test_large_box_blocks_every_touched_tile() {
        // Spans x 20..84 and y 0..40: columns 0..=2, rows 0..=1
        let blockers = DynamicBlockers::from_boxes(&[Aabb::new(20.0, 0.0, 64.0, 40.0)], &grid());
        assert_eq!(blockers.len(), 6);
        assert!(blockers.is_blocked(TileCoord::new(0, 0)));
        assert!(blockers.is_blocked(TileCoord::new(2, 1)));
        assert!(!blockers.is_blocked(TileCoord::new(3, 0)));
    }

    #[test]
    fn test_box_ending_on_tile_edge() {
        // Exactly one tile wide; must not spill into the next column
        let blockers = DynamicBlockers::from_boxes(&[Aabb::new(32.0, 32.0, 32.0, 32.0)], &grid());
        assert_eq!(blockers.len(), 1);
        assert!(blockers.is_blocked(TileCoord::new(1, 1)));
    }

    #[test]
    fn test_degenerate_boxes() {
        let grid = grid();
        let mut blockers = DynamicBlockers::new();
        blockers.insert_box(Aabb::new(f32::NAN, 0.0, 10.0, 10.0), &grid);
        assert!(blockers.is_empty());

        blockers.insert_box(Aabb::new(40.0, 40.0, 0.0, 0.0), &grid);
        assert!(blockers.is_blocked(TileCoord::new(1, 1)));
    }

    #[test]
    fn test_huge_box_is_clamped_to_grid() {
        let grid = grid();
        let blockers = DynamicBlockers::from_boxes(&[Aabb::new(0.0, 0.0, 2.0e6, 2.0e6)], &grid);
        assert_eq!(blockers.len(), 100);
        assert!(blockers.is_blocked(TileCoord::new(9, 9)));
        assert!(!blockers.is_blocked(TileCoord::new(10, 9)));

        let everywhere = Aabb::new(-1.0e12, -1.0e12, 3.0e12, 3.0e12);
        let blockers = DynamicBlockers::from_boxes(&[everywhere], &grid);
        assert_eq!(blockers.len(), 100);
    }

    #[test]
    fn test_box_outside_grid_is_ignored() {
        let grid = grid();
        let blockers = DynamicBlockers::from_boxes(&[Aabb::new(-500.0, 40.0, 100.0, 20.0)], &grid);
        assert!(blockers.is_empty());

        let partly = DynamicBlockers::from_boxes(&[Aabb::new(-40.0, 40.0, 60.0, 10.0)], &grid);
        assert_eq!(partly.len(), 1);
        assert!(partly.is_blocked(TileCoord::new(0, 1)));
    }

    #[test]
    fn test_centered_box() {
        let rock = Aabb::centered(Vec2::new(48.0, 48.0), 20.0);
        assert!(rock.contains(Vec2::new(48.0, 48.0)));
        assert!(!rock.contains(Vec2::new(60.0, 48.0)));
    }
}
