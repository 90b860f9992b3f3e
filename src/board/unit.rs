//! Unit types and units.
//!
//! A unit type fixes the unit class (and with it the terrain costs), whether
//! the unit can capture, its build price, and how fast it repairs. Units
//! themselves only carry faction, hit points, and turn flags; their position
//! lives in the snapshot's occupancy maps.

use std::fmt;

use super::faction::FactionId;
use super::terrain::{ConfigurationError, UnitClass};

/// Full strength of a unit, in hit points.
pub const MAX_HIT_POINTS: i32 = 10;

/// The type of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    Trooper,
    HeavyTrooper,
    Raider,
    AssaultArtillery,
    Tank,
    HeavyTank,
    Berserker,
    LightArtillery,
    HeavyArtillery,
    Dfa,
    Hovercraft,
}

pub const ALL_UNIT_TYPES: [UnitType; 11] = [
    UnitType::Trooper,
    UnitType::HeavyTrooper,
    UnitType::Raider,
    UnitType::AssaultArtillery,
    UnitType::Tank,
    UnitType::HeavyTank,
    UnitType::Berserker,
    UnitType::LightArtillery,
    UnitType::HeavyArtillery,
    UnitType::Dfa,
    UnitType::Hovercraft,
];

impl UnitType {
    /// The name the game server uses for this type.
    pub const fn server_name(self) -> &'static str {
        match self {
            UnitType::Trooper => "Trooper",
            UnitType::HeavyTrooper => "Heavy Trooper",
            UnitType::Raider => "Raider",
            UnitType::AssaultArtillery => "Assault Artillery",
            UnitType::Tank => "Tank",
            UnitType::HeavyTank => "Heavy Tank",
            UnitType::Berserker => "Berserker",
            UnitType::LightArtillery => "Light Artillery",
            UnitType::HeavyArtillery => "Heavy Artillery",
            UnitType::Dfa => "DFA",
            UnitType::Hovercraft => "Hovercraft",
        }
    }

    /// Short lowercase tag used in command notation.
    pub const fn tag(self) -> &'static str {
        match self {
            UnitType::Trooper => "linf",
            UnitType::HeavyTrooper => "hinf",
            UnitType::Raider => "raider",
            UnitType::AssaultArtillery => "aart",
            UnitType::Tank => "tank",
            UnitType::HeavyTank => "htank",
            UnitType::Berserker => "bers",
            UnitType::LightArtillery => "lart",
            UnitType::HeavyArtillery => "hart",
            UnitType::Dfa => "dfa",
            UnitType::Hovercraft => "hover",
        }
    }

    /// Parses a server unit name.
    pub fn from_server_name(name: &str) -> Result<UnitType, ConfigurationError> {
        ALL_UNIT_TYPES
            .iter()
            .copied()
            .find(|t| t.server_name() == name)
            .ok_or_else(|| ConfigurationError::UnknownUnitType(name.to_string()))
    }

    pub const fn class(self) -> UnitClass {
        match self {
            UnitType::Trooper | UnitType::HeavyTrooper => UnitClass::Soft,
            UnitType::Hovercraft => UnitClass::Amphibious,
            _ => UnitClass::Hard,
        }
    }

    /// Whether this type may capture bases, harbours, and airfields.
    pub const fn can_capture(self) -> bool {
        matches!(
            self,
            UnitType::Trooper | UnitType::HeavyTrooper | UnitType::Hovercraft
        )
    }

    /// Credits needed to build one unit of this type.
    pub const fn cost(self) -> u32 {
        match self {
            UnitType::Trooper => 75,
            UnitType::HeavyTrooper => 150,
            UnitType::Raider => 200,
            UnitType::AssaultArtillery => 450,
            UnitType::Tank => 300,
            UnitType::HeavyTank => 600,
            UnitType::Berserker => 900,
            UnitType::LightArtillery => 200,
            UnitType::HeavyArtillery => 600,
            UnitType::Dfa => 1200,
            UnitType::Hovercraft => 300,
        }
    }

    /// Hit points restored by one repair order.
    pub const fn repair_rate(self) -> i32 {
        match self {
            UnitType::Raider
            | UnitType::Tank
            | UnitType::Hovercraft
            | UnitType::HeavyTank
            | UnitType::AssaultArtillery => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Identifies a unit within a snapshot (and across refreshes, see
/// `GameSnapshot::rebuild`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub faction: FactionId,
    pub unit_type: UnitType,
    pub hit_points: i32,
    /// The unit cannot take further orders this turn.
    pub finished: bool,
    /// A capture is in progress on the unit's cell.
    pub capturing: bool,
}

impl Unit {
    pub fn class(&self) -> UnitClass {
        self.unit_type.class()
    }

    pub fn can_capture(&self) -> bool {
        self.unit_type.can_capture()
    }

    pub fn allied_with(&self, other: &Unit) -> bool {
        self.faction == other.faction
    }
}
