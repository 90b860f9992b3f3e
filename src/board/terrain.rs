//! Terrain kinds, unit classes, and the terrain cost catalog.
//!
//! The catalog maps every terrain kind to attack, defense, and movement
//! costs per unit class. It is built once (usually from a JSON document),
//! never mutated afterwards, and shared by reference or `Arc` between every
//! component that needs terrain costs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal configuration problems: the catalog or unit tables do not cover
/// something the server sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no terrain specs for '{0}'")]
    UnknownTerrain(TerrainType),

    #[error("unknown unit type '{0}'")]
    UnknownUnitType(String),

    #[error("failed to read terrain catalog {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("failed to parse terrain catalog: {0}")]
    Malformed(String),
}

/// The kind of terrain on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    Plains,
    Water,
    Mountains,
    Desert,
    Woods,
    Swamp,
    Base,
    Harbour,
    RepairShop,
    Airfield,
}

/// All terrain variants, in declaration order.
pub const ALL_TERRAIN: [TerrainType; 10] = [
    TerrainType::Plains,
    TerrainType::Water,
    TerrainType::Mountains,
    TerrainType::Desert,
    TerrainType::Woods,
    TerrainType::Swamp,
    TerrainType::Base,
    TerrainType::Harbour,
    TerrainType::RepairShop,
    TerrainType::Airfield,
];

impl TerrainType {
    /// Whether a faction can take ownership of this terrain by capturing it.
    pub const fn is_capturable(self) -> bool {
        matches!(
            self,
            TerrainType::Base | TerrainType::Harbour | TerrainType::Airfield
        )
    }

    /// Returns the lowercase name used in catalogs and logs.
    pub const fn name(self) -> &'static str {
        match self {
            TerrainType::Plains => "plains",
            TerrainType::Water => "water",
            TerrainType::Mountains => "mountains",
            TerrainType::Desert => "desert",
            TerrainType::Woods => "woods",
            TerrainType::Swamp => "swamp",
            TerrainType::Base => "base",
            TerrainType::Harbour => "harbour",
            TerrainType::RepairShop => "repair_shop",
            TerrainType::Airfield => "airfield",
        }
    }
}

impl std::fmt::Display for TerrainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Movement and combat category of a unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    Soft,
    Hard,
    Amphibious,
}

/// Costs for each unit class. `None` means the class may not use the terrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCosts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amphibious: Option<u32>,
}

impl ClassCosts {
    /// The same cost for every class.
    pub const fn uniform(cost: u32) -> Self {
        ClassCosts {
            soft: Some(cost),
            hard: Some(cost),
            amphibious: Some(cost),
        }
    }

    /// Costs that forbid every class.
    pub const fn forbidden() -> Self {
        ClassCosts {
            soft: None,
            hard: None,
            amphibious: None,
        }
    }

    pub const fn get(&self, class: UnitClass) -> Option<u32> {
        match class {
            UnitClass::Soft => self.soft,
            UnitClass::Hard => self.hard,
            UnitClass::Amphibious => self.amphibious,
        }
    }

    /// Returns a copy with the cost for one class replaced.
    pub fn with(mut self, class: UnitClass, cost: Option<u32>) -> Self {
        match class {
            UnitClass::Soft => self.soft = cost,
            UnitClass::Hard => self.hard = cost,
            UnitClass::Amphibious => self.amphibious = cost,
        }
        self
    }
}

/// Attack, defense, and movement costs for one terrain kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainSpec {
    #[serde(default)]
    pub attack: ClassCosts,
    #[serde(default)]
    pub defense: ClassCosts,
    #[serde(default)]
    pub movement: ClassCosts,
}

impl TerrainSpec {
    /// A spec with neutral combat modifiers and the given movement costs.
    pub const fn movement(movement: ClassCosts) -> Self {
        TerrainSpec {
            attack: ClassCosts::uniform(0),
            defense: ClassCosts::uniform(0),
            movement,
        }
    }
}

/// The three costs of one terrain kind for one unit class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainCosts {
    pub attack: Option<u32>,
    pub defense: Option<u32>,
    pub movement: Option<u32>,
}

/// Immutable table of terrain specs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainCatalog {
    specs: HashMap<TerrainType, TerrainSpec>,
}

impl TerrainCatalog {
    /// Creates an empty catalog. Every lookup fails until specs are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the catalog with the spec for `terrain` set.
    pub fn with_spec(mut self, terrain: TerrainType, spec: TerrainSpec) -> Self {
        self.specs.insert(terrain, spec);
        self
    }

    /// Parses a catalog from its JSON document form.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Malformed(e.to_string()))
    }

    /// Loads a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let data = fs::read_to_string(path).map_err(|e| ConfigurationError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&data)
    }

    /// Returns the full spec for a terrain kind.
    pub fn spec(&self, terrain: TerrainType) -> Result<&TerrainSpec, ConfigurationError> {
        self.specs
            .get(&terrain)
            .ok_or(ConfigurationError::UnknownTerrain(terrain))
    }

    /// Looks up the costs of `terrain` for `class`.
    pub fn lookup(
        &self,
        terrain: TerrainType,
        class: UnitClass,
    ) -> Result<TerrainCosts, ConfigurationError> {
        let spec = self.spec(terrain)?;
        Ok(TerrainCosts {
            attack: spec.attack.get(class),
            defense: spec.defense.get(class),
            movement: spec.movement.get(class),
        })
    }

    /// Returns true if every terrain kind in `kinds` has a spec.
    pub fn covers<I: IntoIterator<Item = TerrainType>>(&self, kinds: I) -> bool {
        kinds.into_iter().all(|t| self.specs.contains_key(&t))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
