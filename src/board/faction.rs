//! Factions and players.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::unit::UnitType;

/// Index of a faction in the game's faction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub u8);

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faction {}", self.0)
    }
}

/// Whether a faction is still in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionState {
    Playing,
    Eliminated,
    Surrendered,
    #[serde(other)]
    Unknown,
}

/// One side in a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faction {
    pub id: FactionId,
    pub player_id: u32,
    pub player_name: String,
    pub credits: u32,
    /// It is this faction's turn.
    pub current: bool,
    pub state: FactionState,
}

impl Faction {
    pub fn is_playing(&self) -> bool {
        self.state == FactionState::Playing
    }

    /// Client-side check that a build of `unit_type` is affordable.
    pub fn can_afford(&self, unit_type: UnitType) -> bool {
        self.credits >= unit_type.cost()
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.player_name)
    }
}

/// A participant listed in the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub current: bool,
}
