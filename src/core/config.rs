//! AI configuration
//!
//! Every tunable of the enemy simulation in one serde struct. Missing fields
//! fall back to the defaults, so a RON file only needs the values it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ai::DEFAULT_MAX_ITERATIONS;
use crate::world::DEFAULT_TILE_SIZE;

/// AI simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    // -------------------------------------------------------------------------
    // Simulation
    // -------------------------------------------------------------------------
    /// Tile edge length in pixels
    pub tile_size: f32,
    /// Seed for the group's random number generator
    pub seed: u64,
    /// Largest `dt` a single tick integrates
    pub max_dt: f32,
    /// Number of agents allowed to wind up an attack at the same time
    pub max_attackers: u32,

    // -------------------------------------------------------------------------
    // Perception
    // -------------------------------------------------------------------------
    /// Vision radius in pixels
    pub vision_radius: f32,
    /// Full vision cone angle in radians (`None` = all around)
    pub vision_angle: Option<f32>,
    /// Whether solid tiles block sight
    pub occlusion: bool,
    /// Seconds the target must stay visible before an agent reacts
    pub alert_delay: f32,

    // -------------------------------------------------------------------------
    // Chase
    // -------------------------------------------------------------------------
    /// Minimum seconds an agent commits to a chase
    pub min_chase_time: f32,
    /// Seconds of lost sight tolerated before giving up
    pub lost_sight_grace: f32,
    /// Chase is dropped beyond `vision_radius * chase_range_multiplier`
    pub chase_range_multiplier: f32,
    /// Speed multiplier while chasing
    pub chase_speed_multiplier: f32,
    /// Fallback interval between path recomputations
    pub repath_interval: f32,
    /// Sideways offset of the approach goal, in pixels
    pub flank_offset: f32,
    /// Per-tick chance of a hesitation pause
    pub hesitation_chance: f32,
    /// Shortest hesitation pause
    pub hesitation_min: f32,
    /// Longest hesitation pause
    pub hesitation_max: f32,

    // -------------------------------------------------------------------------
    // Patrol / search / return
    // -------------------------------------------------------------------------
    /// Seconds spent searching the last known position
    pub search_duration: f32,
    /// Distance at which a destination counts as reached
    pub arrive_distance: f32,
    /// Per-tick chance an idle agent starts patrolling
    pub idle_to_patrol_chance: f32,
    /// Radius of random patrol targets around the patrol origin
    pub wander_radius: f32,

    // -------------------------------------------------------------------------
    // Combat
    // -------------------------------------------------------------------------
    /// Telegraph time between committing to an attack and the hit
    pub windup_duration: f32,
    /// Time spent in the resolved attack before chasing again
    pub attack_recovery: f32,
    /// Hit-stun after taking damage
    pub hit_stun_duration: f32,
    /// Initial knockback speed in pixels per second
    pub knockback_strength: f32,
    /// Knockback velocity multiplier applied each tick
    pub knockback_decay: f32,
    /// Seconds a dead agent lingers before removal
    pub death_fade_duration: f32,
    /// Chance a dying agent drops a pickup
    pub pickup_drop_chance: f32,
    /// Seconds between burn damage ticks
    pub burn_tick_interval: f32,
    /// Damage per burn tick
    pub burn_damage: f32,

    // -------------------------------------------------------------------------
    // Group behavior
    // -------------------------------------------------------------------------
    /// Radius within which an alerted agent pulls others into the chase
    pub aggro_radius: f32,
    /// Agents closer than this push apart
    pub separation_radius: f32,
    /// Separation push speed at full overlap
    pub separation_strength: f32,
    /// Strafing speed around the target, as a fraction of move speed
    pub circle_strength: f32,
    /// Shortest time before an agent flips its strafing direction
    pub circle_switch_min: f32,
    /// Longest time before an agent flips its strafing direction
    pub circle_switch_max: f32,

    // -------------------------------------------------------------------------
    // Pathfinding / spawning
    // -------------------------------------------------------------------------
    /// Pathfinder iteration cap
    pub path_max_iterations: usize,
    /// How many tile rings `spawn` searches for a clear tile
    pub spawn_probe_radius: i32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            seed: 0x5EED,
            max_dt: 0.1,
            max_attackers: 2,

            vision_radius: 200.0,
            vision_angle: None,
            occlusion: true,
            alert_delay: 0.35,

            min_chase_time: 1.2,
            lost_sight_grace: 0.6,
            chase_range_multiplier: 1.5,
            chase_speed_multiplier: 1.15,
            repath_interval: 0.3,
            flank_offset: 20.0,
            hesitation_chance: 0.004,
            hesitation_min: 0.2,
            hesitation_max: 0.45,

            search_duration: 2.5,
            arrive_distance: 10.0,
            idle_to_patrol_chance: 0.005,
            wander_radius: 100.0,

            windup_duration: 0.35,
            attack_recovery: 0.15,
            hit_stun_duration: 0.25,
            knockback_strength: 180.0,
            knockback_decay: 0.82,
            death_fade_duration: 0.6,
            pickup_drop_chance: 0.3,
            burn_tick_interval: 0.5,
            burn_damage: 1.0,

            aggro_radius: 160.0,
            separation_radius: 36.0,
            separation_strength: 60.0,
            circle_strength: 0.6,
            circle_switch_min: 1.5,
            circle_switch_max: 3.5,

            path_max_iterations: DEFAULT_MAX_ITERATIONS,
            spawn_probe_radius: 3,
        }
    }
}

impl AiConfig {
    /// Set the RNG seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of attacker slots
    #[must_use]
    pub fn with_max_attackers(mut self, max_attackers: u32) -> Self {
        self.max_attackers = max_attackers;
        self
    }

    /// Set vision radius and optional cone angle (radians)
    #[must_use]
    pub fn with_vision(mut self, radius: f32, angle: Option<f32>) -> Self {
        self.vision_radius = radius;
        self.vision_angle = angle;
        self
    }

    /// Disable all per-tick random behavior (idle wake-ups, hesitation, drops)
    #[must_use]
    pub fn without_randomness(mut self) -> Self {
        self.idle_to_patrol_chance = 0.0;
        self.hesitation_chance = 0.0;
        self.pickup_drop_chance = 0.0;
        self
    }

    /// Check that values are usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &str, reason: &str) -> ConfigError {
            ConfigError::Invalid(format!("{field} {reason}"))
        }

        if !(self.tile_size > 0.0) {
            return Err(invalid("tile_size", "must be positive"));
        }
        if self.max_attackers == 0 {
            return Err(invalid("max_attackers", "must be at least 1"));
        }
        if !(self.max_dt > 0.0) {
            return Err(invalid("max_dt", "must be positive"));
        }

        let durations = [
            ("alert_delay", self.alert_delay),
            ("min_chase_time", self.min_chase_time),
            ("lost_sight_grace", self.lost_sight_grace),
            ("repath_interval", self.repath_interval),
            ("hesitation_min", self.hesitation_min),
            ("hesitation_max", self.hesitation_max),
            ("search_duration", self.search_duration),
            ("windup_duration", self.windup_duration),
            ("attack_recovery", self.attack_recovery),
            ("hit_stun_duration", self.hit_stun_duration),
            ("death_fade_duration", self.death_fade_duration),
            ("burn_tick_interval", self.burn_tick_interval),
            ("circle_switch_min", self.circle_switch_min),
            ("circle_switch_max", self.circle_switch_max),
        ];
        for (field, value) in durations {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be a non-negative number of seconds"));
            }
        }
        if self.hesitation_max < self.hesitation_min {
            return Err(invalid("hesitation_max", "must not be below hesitation_min"));
        }
        if self.circle_switch_max < self.circle_switch_min {
            return Err(invalid("circle_switch_max", "must not be below circle_switch_min"));
        }

        let chances = [
            ("hesitation_chance", self.hesitation_chance),
            ("idle_to_patrol_chance", self.idle_to_patrol_chance),
            ("pickup_drop_chance", self.pickup_drop_chance),
        ];
        for (field, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be within [0, 1]"));
            }
        }

        if !(0.0..=1.0).contains(&self.knockback_decay) {
            return Err(invalid("knockback_decay", "must be within [0, 1]"));
        }
        if self.vision_angle.is_some_and(|a| !(a > 0.0)) {
            return Err(invalid("vision_angle", "must be positive"));
        }
        if !(self.wander_radius.is_finite() && self.wander_radius >= 0.0) {
            return Err(invalid("wander_radius", "must be a non-negative distance"));
        }
        if self.spawn_probe_radius < 0 {
            return Err(invalid("spawn_probe_radius", "must not be negative"));
        }

        Ok(())
    }

    /// Parse and validate a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur while loading or saving configuration data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Parse error
    ParseError(String),
    /// Serialization error
    SerializeError(String),
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::ParseError(e) => write!(f, "Parse error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = AiConfig::from_ron_str("(max_attackers: 3, alert_delay: 0.5)").unwrap();
        assert_eq!(config.max_attackers, 3);
        assert!((config.alert_delay - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.path_max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn test_ron_roundtrip_keeps_cone() {
        let config = AiConfig::default().with_vision(150.0, Some(1.5));
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = AiConfig::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let zero_slots = AiConfig::default().with_max_attackers(0);
        assert!(matches!(zero_slots.validate(), Err(ConfigError::Invalid(_))));

        let bad_chance = AiConfig {
            pickup_drop_chance: 1.5,
            ..AiConfig::default()
        };
        assert!(bad_chance.validate().is_err());

        let nan_tiles = AiConfig {
            tile_size: f32::NAN,
            ..AiConfig::default()
        };
        assert!(nan_tiles.validate().is_err());

        let nan_wander = AiConfig {
            wander_radius: f32::NAN,
            ..AiConfig::default()
        };
        let err = nan_wander.validate().unwrap_err();
        assert!(err.to_string().contains("wander_radius"));

        let endless_pause = AiConfig {
            hesitation_max: f32::INFINITY,
            ..AiConfig::default()
        };
        assert!(endless_pause.validate().is_err());

        let from_file = AiConfig::from_ron_str("(windup_duration: -1.0)");
        assert!(
            matches!(from_file, Err(ConfigError::Invalid(msg)) if msg.contains("windup_duration"))
        );
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        assert!(matches!(
            AiConfig::from_ron_str("(max_attackers: \"two\")"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AiConfig::load_ron("/nonexistent/horde.ron").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
