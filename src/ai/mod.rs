//! Enemy AI and navigation
//!
//! Grid pathfinding, perception, steering, the per-agent state machine and
//! the [`AgentGroup`] that ties them together.

mod agent;
mod archetype;
mod fsm;
mod group;
mod pathfinding;
mod perception;
mod steering;
mod target;

pub use agent::{Agent, AgentId, TickContext, TickReport};
pub use archetype::{Archetype, ArchetypeKind};
pub use fsm::{AgentState, StateMachine, Transition};
pub use group::{AgentGroup, AttackerSlots};
pub use pathfinding::{DEFAULT_MAX_ITERATIONS, PathOutcome, PathResult, find_path, is_blocked};
pub use perception::{Perception, line_of_sight};
pub use steering::{
    Circle, NODE_REACHED_DISTANCE, Seek, Separation, SteeringBehavior, SteeringOutput,
    follow_path,
};
pub use target::{Target, combat_distance};
