//! Finite State Machine for Agent Behavior
//!
//! Agents run a flat state machine over [`AgentState`]. The behavior for each
//! state lives on the agent itself (it needs the agent's timers, path and
//! perception); this module owns the bookkeeping every state shares:
//! the current state, time spent in it, and the rule that `Dead` is
//! terminal.
//!
//! # Example
//!
//! ```ignore
//! let mut fsm = StateMachine::new(AgentState::Patrol);
//! fsm.tick(dt);
//! if let Some(change) = fsm.transition(AgentState::Chase) {
//!     log::debug!("{} -> {}", change.from, change.to);
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// States
// ============================================================================

/// Behavior state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentState {
    /// Standing still, occasionally starts patrolling
    Idle,
    /// Walking waypoints or wandering around the patrol origin
    #[default]
    Patrol,
    /// Pursuing the target
    Chase,
    /// Walking to the last known target position
    Search,
    /// Walking back to the patrol origin
    Return,
    /// Telegraphing an attack; holds an attacker slot
    Windup,
    /// Attack resolved, recovering before chasing again
    Attack,
    /// Dead and fading out
    Dead,
}

impl AgentState {
    /// State name for debugging and logging.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Patrol => "Patrol",
            Self::Chase => "Chase",
            Self::Search => "Search",
            Self::Return => "Return",
            Self::Windup => "Windup",
            Self::Attack => "Attack",
            Self::Dead => "Dead",
        }
    }

    /// Engaged with the target (chasing or attacking)
    #[must_use]
    pub const fn is_engaged(self) -> bool {
        matches!(self, Self::Chase | Self::Windup | Self::Attack)
    }

    /// No transition leaves this state
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Dead)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Transition
// ============================================================================

/// A state change that actually happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// State that was left
    pub from: AgentState,
    /// State that was entered
    pub to: AgentState,
    /// Seconds spent in `from`
    pub held: f32,
}

// ============================================================================
// State Machine
// ============================================================================

/// Tracks the current state and how long the agent has been in it.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current active state
    current: AgentState,
    /// Seconds spent in the current state
    time_in_state: f32,
}

impl StateMachine {
    /// Create a state machine in its initial state.
    #[must_use]
    pub fn new(initial: AgentState) -> Self {
        Self {
            current: initial,
            time_in_state: 0.0,
        }
    }

    /// Advance the time spent in the current state.
    pub fn tick(&mut self, dt: f32) {
        self.time_in_state += dt;
    }

    /// Switch to a new state.
    ///
    /// Returns `None` when nothing changed: the target equals the current
    /// state, or the current state is terminal.
    pub fn transition(&mut self, to: AgentState) -> Option<Transition> {
        let from = self.current;
        if from == to {
            return None;
        }
        if from.is_terminal() {
            log::trace!("Ignoring transition {from} -> {to}: state is terminal");
            return None;
        }

        let held = self.time_in_state;
        self.current = to;
        self.time_in_state = 0.0;
        Some(Transition { from, to, held })
    }

    /// Get the current state.
    #[must_use]
    pub fn current(&self) -> AgentState {
        self.current
    }

    /// Seconds spent in the current state.
    #[must_use]
    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Check if the FSM is in the given state.
    #[must_use]
    pub fn is_in(&self, state: AgentState) -> bool {
        self.current == state
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(AgentState::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
