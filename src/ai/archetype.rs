//! Enemy archetypes
//!
//! Named stat presets. Courage scales how often an agent hesitates mid-chase;
//! the retreat threshold is a fraction of max health at or below which the
//! agent breaks off and searches instead.

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

/// Stat bundle for one kind of agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Walking speed in pixels per second
    pub speed: f32,
    /// Starting and maximum health
    pub max_health: f32,
    /// Edge-to-edge distance at which the agent stops pathing and closes in
    pub melee_range: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
    /// Damage passed to the target per landed attack
    pub attack_damage: f32,
    /// 0 = skittish, 1 = never hesitates
    pub courage: f32,
    /// Fraction of max health at or below which the agent retreats
    pub retreat_health_threshold: f32,
    /// Collision radius
    pub radius: f32,
    /// Reward granted on death
    pub reward: u32,
}

impl Default for Archetype {
    fn default() -> Self {
        ArchetypeKind::Grunt.stats()
    }
}

impl Archetype {
    /// Health at or below which the agent retreats
    #[must_use]
    pub fn retreat_health(&self) -> f32 {
        self.max_health * self.retreat_health_threshold
    }

    /// Check that the stats are usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &str, reason: &str) -> ConfigError {
            ConfigError::Invalid(format!("archetype {field} {reason}"))
        }

        if !(self.max_health > 0.0 && self.max_health.is_finite()) {
            return Err(invalid("max_health", "must be positive"));
        }

        let magnitudes = [
            ("speed", self.speed),
            ("melee_range", self.melee_range),
            ("attack_cooldown", self.attack_cooldown),
            ("attack_damage", self.attack_damage),
            ("radius", self.radius),
        ];
        for (field, value) in magnitudes {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be a non-negative number"));
            }
        }

        let fractions = [
            ("courage", self.courage),
            ("retreat_health_threshold", self.retreat_health_threshold),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be within [0, 1]"));
            }
        }

        Ok(())
    }
}

/// Built-in archetype presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArchetypeKind {
    /// Baseline melee enemy
    #[default]
    Grunt,
    /// Slow, tough, fearless
    Brute,
    /// Fast and fragile
    Skirmisher,
    /// Breaks off early
    Coward,
}

impl ArchetypeKind {
    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grunt => "Grunt",
            Self::Brute => "Brute",
            Self::Skirmisher => "Skirmisher",
            Self::Coward => "Coward",
        }
    }

    /// Stats for this preset
    #[must_use]
    pub const fn stats(self) -> Archetype {
        match self {
            Self::Grunt => Archetype {
                speed: 60.0,
                max_health: 3.0,
                melee_range: 20.0,
                attack_cooldown: 1.0,
                attack_damage: 1.0,
                courage: 0.5,
                retreat_health_threshold: 0.0,
                radius: 14.0,
                reward: 10,
            },
            Self::Brute => Archetype {
                speed: 45.0,
                max_health: 6.0,
                melee_range: 26.0,
                attack_cooldown: 1.6,
                attack_damage: 2.0,
                courage: 1.0,
                retreat_health_threshold: 0.0,
                radius: 16.0,
                reward: 15,
            },
            Self::Skirmisher => Archetype {
                speed: 75.0,
                max_health: 2.0,
                melee_range: 18.0,
                attack_cooldown: 0.8,
                attack_damage: 1.0,
                courage: 0.6,
                retreat_health_threshold: 0.25,
                radius: 12.0,
                reward: 10,
            },
            Self::Coward => Archetype {
                speed: 66.0,
                max_health: 2.0,
                melee_range: 18.0,
                attack_cooldown: 1.2,
                attack_damage: 1.0,
                courage: 0.2,
                retreat_health_threshold: 0.5,
                radius: 12.0,
                reward: 8,
            },
        }
    }

    /// Get all presets
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Grunt, Self::Brute, Self::Skirmisher, Self::Coward]
    }
}

impl From<ArchetypeKind> for Archetype {
    fn from(kind: ArchetypeKind) -> Self {
        kind.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_sane() {
        for kind in ArchetypeKind::all() {
            let stats = kind.stats();
            assert!(stats.speed > 0.0, "{}", kind.name());
            assert!(stats.max_health > 0.0);
            assert!((0.0..=1.0).contains(&stats.courage));
            assert!(stats.retreat_health() < stats.max_health);
            assert!(stats.validate().is_ok());
        }
    }

    #[test]
    fn test_broken_stats_are_rejected() {
        let nan_courage = Archetype {
            courage: f32::NAN,
            ..ArchetypeKind::Grunt.stats()
        };
        let err = nan_courage.validate().unwrap_err();
        assert!(err.to_string().contains("courage"));

        let reckless = Archetype {
            retreat_health_threshold: 1.5,
            ..ArchetypeKind::Grunt.stats()
        };
        assert!(reckless.validate().is_err());

        let endless = Archetype {
            speed: f32::INFINITY,
            ..ArchetypeKind::Grunt.stats()
        };
        assert!(endless.validate().is_err());

        let ghost = Archetype {
            max_health: 0.0,
            ..ArchetypeKind::Grunt.stats()
        };
        assert!(ghost.validate().is_err());
    }

    #[test]
    fn test_coward_retreats_earlier_than_brute() {
        let coward = ArchetypeKind::Coward.stats();
        let brute = ArchetypeKind::Brute.stats();
        assert!(coward.retreat_health_threshold > brute.retreat_health_threshold);
        assert!(coward.courage < brute.courage);
        assert!((coward.retreat_health() - 1.0).abs() < f32::EPSILON);
    }
}
