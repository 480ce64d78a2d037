//! Core module
//!
//! Configuration, encounter files, events and debug counters

mod config;
mod debug;
mod encounter;
mod events;

pub use config::{AiConfig, ConfigError};
pub use debug::AiStats;
pub use encounter::{Encounter, SpawnEntry};
pub use events::{AiEvent, EventQueue, PickupKind};
