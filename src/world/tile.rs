//! Tile coordinates and world/tile conversion

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tile edge length in pixels of the stock tile sheet.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;

/// Integer tile coordinate (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl TileCoord {
    /// Create a tile coordinate
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing a world position (`floor(world / tile_size)`).
    ///
    /// Returns `None` for non-finite input so garbage positions never alias
    /// onto tile (0, 0).
    #[must_use]
    pub fn from_world(pos: Vec2, tile_size: f32) -> Option<Self> {
        let x = (pos.x / tile_size).floor();
        let y = (pos.y / tile_size).floor();
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Self::new(x as i32, y as i32))
    }

    /// World position of the tile center
    #[must_use]
    pub fn center(self, tile_size: f32) -> Vec2 {
        Vec2::new(
            (self.x as f32 + 0.5) * tile_size,
            (self.y as f32 + 0.5) * tile_size,
        )
    }

    /// Coordinate shifted by a delta
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev distance (number of 8-directional steps)
    #[must_use]
    pub fn chebyshev(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Manhattan distance
    #[must_use]
    pub fn manhattan(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// True if `other` is one of the eight surrounding tiles
    #[must_use]
    pub fn is_adjacent8(self, other: Self) -> bool {
        self != other && self.chebyshev(other) == 1
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
