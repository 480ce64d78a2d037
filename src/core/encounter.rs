//! Encounter files
//!
//! A named list of enemy spawns, saved and loaded as RON or JSON.
//!
//! ```ron
//! (
//!     name: "Meadow",
//!     version: 1,
//!     spawns: [
//!         (tile: (x: 9, y: 11), archetype: Grunt, waypoints: [(x: 16, y: 11)]),
//!     ],
//! )
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::config::ConfigError;
use crate::ai::{AgentGroup, AgentId, ArchetypeKind};
use crate::world::TileCoord;

/// One enemy to place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    /// Requested spawn tile
    pub tile: TileCoord,
    /// Stat preset
    #[serde(default)]
    pub archetype: ArchetypeKind,
    /// Patrol route as tiles; agents walk to each tile's center
    #[serde(default)]
    pub waypoints: Vec<TileCoord>,
}

impl SpawnEntry {
    /// A grunt at `tile` with no patrol route
    #[must_use]
    pub fn new(tile: TileCoord) -> Self {
        Self {
            tile,
            archetype: ArchetypeKind::default(),
            waypoints: Vec::new(),
        }
    }

    /// Set the archetype
    #[must_use]
    pub fn with_archetype(mut self, archetype: ArchetypeKind) -> Self {
        self.archetype = archetype;
        self
    }

    /// Set the patrol route
    #[must_use]
    pub fn with_waypoints(mut self, waypoints: impl IntoIterator<Item = TileCoord>) -> Self {
        self.waypoints = waypoints.into_iter().collect();
        self
    }
}

/// A serializable set of spawns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    /// Encounter name
    pub name: String,
    /// Format version for compatibility
    pub version: u32,
    /// Spawns in placement order
    pub spawns: Vec<SpawnEntry>,
}

impl Encounter {
    /// Create an empty encounter
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            spawns: Vec::new(),
        }
    }

    /// Append a spawn, returning its index
    pub fn add_spawn(&mut self, spawn: SpawnEntry) -> usize {
        let index = self.spawns.len();
        self.spawns.push(spawn);
        index
    }

    /// Spawn every entry into `group`, in order
    pub fn populate(&self, group: &mut AgentGroup) -> Vec<AgentId> {
        let tile_size = group.grid().tile_size();
        let ids = self
            .spawns
            .iter()
            .map(|spawn| {
                let id = group.spawn(spawn.tile, spawn.archetype);
                if !spawn.waypoints.is_empty() {
                    let route = spawn.waypoints.iter().map(|t| t.center(tile_size)).collect();
                    group.set_waypoints(id, route);
                }
                id
            })
            .collect();
        log::info!("Populated encounter '{}' with {} agents", self.name, self.spawns.len());
        ids
    }

    /// Save the encounter to a RON file
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

    /// Load an encounter from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        ron::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save the encounter to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load an encounter from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Number of spawns
    #[must_use]
    pub fn spawn_count(&self) -> usize {
        self.spawns.len()
    }

    /// Check if the encounter has no spawns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AgentState;
    use crate::core::AiConfig;
    use crate::world::TileGrid;

    fn meadow() -> Encounter {
        let mut encounter = Encounter::new("Meadow");
        encounter.add_spawn(
            SpawnEntry::new(TileCoord::new(9, 11))
                .with_waypoints([TileCoord::new(16, 11), TileCoord::new(16, 16)]),
        );
        encounter.add_spawn(
            SpawnEntry::new(TileCoord::new(15, 3)).with_archetype(ArchetypeKind::Brute),
        );
        encounter
    }

    #[test]
    fn test_encounter_serialization_ron() {
        let encounter = meadow();

        let ron_str =
            ron::ser::to_string_pretty(&encounter, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("Brute"));

        let loaded: Encounter = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, encounter);
    }

    #[test]
    fn test_encounter_serialization_json() {
        let json_str = serde_json::to_string(&meadow()).unwrap();
        let loaded: Encounter = serde_json::from_str(&json_str).unwrap();
        assert_eq!(loaded.name, "Meadow");
        assert_eq!(loaded.spawns[0].waypoints.len(), 2);
    }

    #[test]
    fn test_spawn_defaults_when_omitted() {
        let loaded: Encounter =
            ron::from_str("(name: \"Bare\", version: 1, spawns: [(tile: (x: 2, y: 3))])").unwrap();
        assert_eq!(loaded.spawns[0].archetype, ArchetypeKind::Grunt);
        assert!(loaded.spawns[0].waypoints.is_empty());
    }

    #[test]
    fn test_populate_spawns_with_routes() {
        let grid = TileGrid::new(25, 19, 32.0);
        let mut group = AgentGroup::new(AiConfig::default(), grid).unwrap();

        let ids = meadow().populate(&mut group);
        assert_eq!(ids.len(), 2);

        let patroller = group.get(ids[0]).unwrap();
        assert_eq!(patroller.state(), AgentState::Patrol);
        assert_eq!(patroller.waypoints()[0], TileCoord::new(16, 11).center(32.0));

        let brute = group.get(ids[1]).unwrap();
        assert_eq!(brute.max_health(), ArchetypeKind::Brute.stats().max_health);
        assert!(brute.waypoints().is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            Encounter::load_json("/nonexistent/encounter.json"),
            Err(ConfigError::IoError(_))
        ));
    }
}
