//! A* pathfinding on the tile grid
//!
//! 8-directional search over [`TileGrid`] plus [`DynamicBlockers`]. Diagonal
//! steps may not cut the corner of a blocked tile, and the search gives up
//! after a fixed number of iterations instead of running unbounded.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::SQRT_2;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::world::{DynamicBlockers, TileCoord, TileGrid};

/// Default iteration cap before a search is abandoned
pub const DEFAULT_MAX_ITERATIONS: usize = 4000;

/// Expansion order: orthogonal first, then diagonals.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Why a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathOutcome {
    /// A route was found
    Found,
    /// Start or goal is solid or covered by a blocker
    #[default]
    InvalidEndpoint,
    /// The open set ran dry
    Unreachable,
    /// The iteration cap was hit
    IterationCap,
}

/// Result of pathfinding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathResult {
    /// Route from start to goal, both included. Empty if none.
    pub tiles: Vec<TileCoord>,
    /// Total step cost (1 per orthogonal, √2 per diagonal step)
    pub cost: f32,
    /// How the search ended
    pub outcome: PathOutcome,
}

impl PathResult {
    fn failed(outcome: PathOutcome) -> Self {
        Self {
            tiles: Vec::new(),
            cost: 0.0,
            outcome,
        }
    }

    /// Check if path was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of tiles in the route
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }
}

/// Open-set entry. Ordered so `BinaryHeap` pops the lowest f-score first and,
/// among equal f-scores, the one pushed earliest.
#[derive(Debug, Clone, Copy)]
struct Node {
    tile: TileCoord,
    f_cost: f32,
    seq: u64,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Check if a tile is solid or covered by a dynamic blocker
#[must_use]
#[inline]
pub fn is_blocked(grid: &TileGrid, blockers: &DynamicBlockers, tile: TileCoord) -> bool {
    grid.is_solid(tile) || blockers.is_blocked(tile)
}

fn heuristic(a: TileCoord, b: TileCoord) -> f32 {
    a.manhattan(b) as f32
}

/// Walkable neighbors of a tile with their step cost
fn neighbors(
    grid: &TileGrid,
    blockers: &DynamicBlockers,
    tile: TileCoord,
) -> SmallVec<[(TileCoord, f32); 8]> {
    let mut result = SmallVec::new();

    for &(dx, dy) in &DIRECTIONS {
        let next = tile.offset(dx, dy);
        if is_blocked(grid, blockers, next) {
            continue;
        }

        let diagonal = dx != 0 && dy != 0;
        if diagonal
            && (is_blocked(grid, blockers, tile.offset(dx, 0))
                || is_blocked(grid, blockers, tile.offset(0, dy)))
        {
            continue;
        }

        result.push((next, if diagonal { SQRT_2 } else { 1.0 }));
    }

    result
}

/// Find a path using A* algorithm
///
/// Returns the full route including `start`, or an empty result when either
/// endpoint is blocked, the goal is unreachable, or `max_iterations` pops of
/// the open set pass without reaching it.
#[must_use]
pub fn find_path(
    grid: &TileGrid,
    blockers: &DynamicBlockers,
    start: TileCoord,
    goal: TileCoord,
    max_iterations: usize,
) -> PathResult {
    if is_blocked(grid, blockers, start) || is_blocked(grid, blockers, goal) {
        return PathResult::failed(PathOutcome::InvalidEndpoint);
    }

    let mut open_set = BinaryHeap::new();
    let mut closed: FxHashSet<TileCoord> = FxHashSet::default();
    let mut came_from: FxHashMap<TileCoord, TileCoord> = FxHashMap::default();
    let mut g_score: FxHashMap<TileCoord, f32> = FxHashMap::default();
    let mut seq = 0u64;

    g_score.insert(start, 0.0);
    open_set.push(Node {
        tile: start,
        f_cost: heuristic(start, goal),
        seq,
    });

    let mut iterations = 0usize;
    while let Some(current) = open_set.pop() {
        iterations += 1;
        if iterations > max_iterations {
            log::warn!(
                "Pathfinding aborted after {max_iterations} iterations ({start} -> {goal})"
            );
            return PathResult::failed(PathOutcome::IterationCap);
        }

        if !closed.insert(current.tile) {
            continue;
        }

        if current.tile == goal {
            let cost = g_score.get(&goal).copied().unwrap_or(0.0);
            return PathResult {
                tiles: reconstruct_path(&came_from, goal),
                cost,
                outcome: PathOutcome::Found,
            };
        }

        let current_g = g_score.get(&current.tile).copied().unwrap_or(f32::MAX);
        for (next, step_cost) in neighbors(grid, blockers, current.tile) {
            if closed.contains(&next) {
                continue;
            }

            let tentative_g = current_g + step_cost;
            if tentative_g < g_score.get(&next).copied().unwrap_or(f32::MAX) {
                came_from.insert(next, current.tile);
                g_score.insert(next, tentative_g);

                seq += 1;
                open_set.push(Node {
                    tile: next,
                    f_cost: tentative_g + heuristic(next, goal),
                    seq,
                });
            }
        }
    }

    // No path found
    PathResult::failed(PathOutcome::Unreachable)
}

fn reconstruct_path(
    came_from: &FxHashMap<TileCoord, TileCoord>,
    goal: TileCoord,
) -> Vec<TileCoord> {
    let mut path = vec![goal];
    let mut curr = goal;

    while let Some(&prev) = came_from.get(&curr) {
        path.push(prev);
        curr = prev;
    }

    path.reverse();
    path
}
