//! Event Queue for AI Notifications
//!
//! The AI core never reaches into the rest of the game. Everything the game
//! may want to react to (XP orbs, damage numbers, particles, sounds) is
//! published as an [`AiEvent`] instead.
//!
//! The queue is double-buffered: events pushed during a tick become readable
//! after the queue is swapped, which `AgentGroup::update` does at the end of
//! every tick.
//!
//! # Example
//!
//! ```ignore
//! let reward = group.update(dt, &mut player, &blockers);
//! for event in group.events().iter() {
//!     if let AiEvent::PickupDropped { position, kind, .. } = event {
//!         spawn_pickup(*position, *kind);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;

use crate::ai::{AgentId, AgentState};

// ============================================================================
// Event Types
// ============================================================================

/// Pickup dropped by a dying agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    /// Restores health
    Health,
    /// Restores spirit
    Spirit,
}

/// Things that happened inside the AI simulation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AiEvent {
    /// An agent entered the world.
    AgentSpawned {
        /// The new agent
        agent: AgentId,
        /// Where it was placed
        position: Vec2,
    },

    /// An agent changed behavior state.
    StateChanged {
        /// The agent
        agent: AgentId,
        /// Previous state
        from: AgentState,
        /// New state
        to: AgentState,
    },

    /// A windup landed on the target.
    TargetHit {
        /// Attacking agent
        agent: AgentId,
        /// Damage passed to the target
        amount: f32,
        /// Attacker position
        source: Vec2,
    },

    /// An agent died. Emitted exactly once per agent.
    AgentDied {
        /// The agent
        agent: AgentId,
        /// Where it died
        position: Vec2,
        /// Reward granted for the kill
        reward: u32,
    },

    /// A dying agent dropped a pickup.
    PickupDropped {
        /// The agent
        agent: AgentId,
        /// Drop position
        position: Vec2,
        /// What was dropped
        kind: PickupKind,
    },

    /// A dead agent finished fading and left the group.
    AgentRemoved {
        /// The agent
        agent: AgentId,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for tick-consistent event processing.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<AiEvent>,
    /// Events from the last finished tick, ready for processing
    processing: VecDeque<AiEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event; visible after the next `swap()`.
    #[inline]
    pub fn push(&mut self, event: AiEvent) {
        self.pending.push_back(event);
    }

    /// Make pending events readable and start a fresh pending buffer.
    ///
    /// Unread events from the previous swap are dropped.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over readable events.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &AiEvent> {
        self.processing.iter()
    }

    /// Drain readable events.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = AiEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are no readable events.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Number of readable events.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Number of events waiting for the next swap.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and processing).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn removed(id: u32) -> AiEvent {
        AiEvent::AgentRemoved {
            agent: AgentId::from_raw(id),
        }
    }

    #[test]
    fn test_event_queue_push_and_swap() {
        let mut queue = EventQueue::new();

        queue.push(removed(1));
        assert!(queue.is_empty(), "Events should not be visible before swap");
        assert_eq!(queue.pending_count(), 1);

        queue.swap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next(), Some(&removed(1)));
    }

    #[test]
    fn test_event_queue_double_buffer_isolation() {
        let mut queue = EventQueue::new();

        queue.push(removed(1));
        queue.swap();
        queue.push(removed(2));

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&removed(1)]);

        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&removed(2)]);
    }

    #[test]
    fn test_event_queue_drain_and_clear() {
        let mut queue = EventQueue::new();

        queue.push(AiEvent::StateChanged {
            agent: AgentId::from_raw(3),
            from: AgentState::Patrol,
            to: AgentState::Chase,
        });
        queue.push(AiEvent::PickupDropped {
            agent: AgentId::from_raw(3),
            position: Vec2::ZERO,
            kind: PickupKind::Spirit,
        });
        queue.swap();

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events.len(), 2);
        assert!(queue.is_empty());

        queue.push(removed(4));
        queue.clear();
        assert_eq!(queue.pending_count(), 0);
    }
}
