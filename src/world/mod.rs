//! Tile world primitives
//!
//! The read-only view of the world the AI needs: tile coordinates, the
//! static tile grid, and the dynamic blockers refreshed every tick.

mod blockers;
mod grid;
mod tile;

pub use blockers::{Aabb, CollisionBox, DynamicBlockers};
pub use grid::{GridError, TileGrid};
pub use tile::{DEFAULT_TILE_SIZE, TileCoord};
