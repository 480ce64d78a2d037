//! Enemy AI and pathfinding for a top-down 2D action game
//!
//! This crate provides:
//! - Tile-grid A* with corner-cut prevention and dynamic blockers
//! - Vision range, cone and line-of-sight perception
//! - Seek, separation and circling steering
//! - A per-agent behavior state machine with attack windups, hit-stun and death
//! - An agent group with shared attacker slots, group aggro and events
//!
//! The simulation is single-threaded and frame-stepped: call
//! [`AgentGroup::update`](ai::AgentGroup::update) once per frame.

pub mod ai;
pub mod core;
pub mod world;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        Agent, AgentGroup, AgentId, AgentState, Archetype, ArchetypeKind, PathResult, Target,
        find_path,
    };
    pub use crate::core::{AiConfig, AiEvent, AiStats, ConfigError, Encounter, SpawnEntry};
    pub use crate::world::{Aabb, CollisionBox, DynamicBlockers, TileCoord, TileGrid};
    pub use glam::Vec2;
}
