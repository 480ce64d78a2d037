//! Static tile grid
//!
//! A fixed-size grid of integer tile codes plus the set of codes that are
//! solid. Read-only to the AI once built.

use glam::Vec2;
use rustc_hash::FxHashSet;

use super::tile::TileCoord;

/// A 2D grid of tile codes
#[derive(Debug, Clone)]
pub struct TileGrid {
    /// Width in tiles
    width: usize,
    /// Height in tiles
    height: usize,
    /// Tile edge length in world units
    tile_size: f32,
    /// Row-major tile codes
    tiles: Vec<u16>,
    /// Codes that block movement and sight
    solid_codes: FxHashSet<u16>,
}

impl TileGrid {
    /// Create a grid filled with tile code `0`, with no solid codes.
    #[must_use]
    pub fn new(width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            tiles: vec![0; width * height],
            solid_codes: FxHashSet::default(),
        }
    }

    /// Build a grid from row-major tile codes.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rows or rows differ in length.
    pub fn from_rows<R: AsRef<[u16]>>(rows: &[R], tile_size: f32) -> Result<Self, GridError> {
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row, codes) in rows.iter().enumerate() {
            let codes = codes.as_ref();
            if codes.len() != width {
                return Err(GridError::RaggedRow {
                    row,
                    expected: width,
                    found: codes.len(),
                });
            }
            tiles.extend_from_slice(codes);
        }

        Ok(Self {
            width,
            height: rows.len(),
            tile_size,
            tiles,
            solid_codes: FxHashSet::default(),
        })
    }

    /// Declare which tile codes are solid
    #[must_use]
    pub fn with_solid_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.solid_codes = codes.into_iter().collect();
        self
    }

    /// Width in tiles
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile edge length in world units
    #[must_use]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Check if a tile coordinate lies inside the grid
    #[must_use]
    pub fn in_bounds(&self, tile: TileCoord) -> bool {
        tile.x >= 0
            && tile.y >= 0
            && (tile.x as usize) < self.width
            && (tile.y as usize) < self.height
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        self.in_bounds(tile)
            .then(|| tile.y as usize * self.width + tile.x as usize)
    }

    /// Tile code at a coordinate, `None` outside the grid
    #[must_use]
    pub fn tile(&self, tile: TileCoord) -> Option<u16> {
        self.index(tile).map(|i| self.tiles[i])
    }

    /// Overwrite a tile code. Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, tile: TileCoord, code: u16) {
        if let Some(i) = self.index(tile) {
            self.tiles[i] = code;
        }
    }

    /// Check if a tile is solid. Everything outside the grid is solid.
    #[must_use]
    pub fn is_solid(&self, tile: TileCoord) -> bool {
        match self.tile(tile) {
            Some(code) => self.solid_codes.contains(&code),
            None => true,
        }
    }

    /// Check if the tile under a world position is solid.
    ///
    /// Non-finite positions count as solid.
    #[must_use]
    pub fn is_solid_at(&self, pos: Vec2) -> bool {
        match self.world_to_tile(pos) {
            Some(tile) => self.is_solid(tile),
            None => true,
        }
    }

    /// Convert a world position to the tile under it
    #[must_use]
    pub fn world_to_tile(&self, pos: Vec2) -> Option<TileCoord> {
        TileCoord::from_world(pos, self.tile_size)
    }

    /// World position of a tile's center
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> Vec2 {
        tile.center(self.tile_size)
    }
}

/// Errors that can occur while building a grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// No rows or zero-width rows
    Empty,
    /// A row has a different length than the first
    RaggedRow {
        /// Offending row index
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of this row
        found: usize,
    },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "tile grid has no tiles"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} tiles, expected {expected}"),
        }
    }
}

impl std::error::Error for GridError {}
