//! Structured game-state data as delivered by a snapshot fetch.
//!
//! These types are the boundary between a transport (which owns the wire
//! format) and `GameSnapshot::from_data`. They deserialize from JSON so
//! fixtures and recorded games can be loaded directly.

use serde::{Deserialize, Serialize};

use crate::board::faction::FactionState;
use crate::board::hex::Coord;
use crate::board::state::GameStatus;
use crate::board::terrain::TerrainType;

/// A full game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameData {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub round: u32,
    pub status: GameStatus,
    #[serde(default)]
    pub players: Vec<PlayerData>,
    #[serde(default)]
    pub factions: Vec<FactionData>,
    pub map: MapData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    pub name: String,
    #[serde(default)]
    pub current: bool,
}

/// One faction with its units and owned capturable cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionData {
    pub player_id: u32,
    pub player_name: String,
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub current: bool,
    pub state: FactionState,
    #[serde(default)]
    pub units: Vec<UnitData>,
    /// Capturable cells owned by this faction.
    #[serde(default)]
    pub owned: Vec<Coord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitData {
    pub x: i32,
    pub y: i32,
    /// Server unit name, e.g. `"Heavy Trooper"`.
    #[serde(rename = "type")]
    pub unit_type: String,
    /// Remaining strength, reported as hit points.
    pub quantity: i32,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub capturing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    pub terrains: Vec<TerrainData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainData {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub terrain: TerrainType,
}

impl GameData {
    /// Parses a game state from JSON.
    pub fn from_json_str(json: &str) -> Result<GameData, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FactionData {
    /// A playing faction with no units or property.
    pub fn new(player_id: u32, player_name: &str, credits: u32) -> Self {
        FactionData {
            player_id,
            player_name: player_name.to_string(),
            credits,
            current: false,
            state: FactionState::Playing,
            units: Vec::new(),
            owned: Vec::new(),
        }
    }
}

impl UnitData {
    /// A full-strength, unfinished unit.
    pub fn new(x: i32, y: i32, unit_type: &str) -> Self {
        UnitData {
            x,
            y,
            unit_type: unit_type.to_string(),
            quantity: 10,
            finished: false,
            capturing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME_JSON: &str = r#"{
        "id": 34,
        "name": "AI test",
        "round": 1,
        "status": "running",
        "players": [{"name": "marshal", "current": true}],
        "factions": [{
            "player_id": 49,
            "player_name": "marshal",
            "credits": 400,
            "current": true,
            "state": "playing",
            "units": [{"x": 2, "y": 2, "type": "Trooper", "quantity": 10}],
            "owned": [{"x": 1, "y": 2}]
        }],
        "map": {
            "width": 3,
            "height": 3,
            "terrains": [
                {"x": 1, "y": 2, "type": "base"},
                {"x": 2, "y": 2, "type": "plains"}
            ]
        }
    }"#;

    #[test]
    fn parses_game_json() {
        let data = GameData::from_json_str(GAME_JSON).unwrap();
        assert_eq!(data.id, 34);
        assert_eq!(data.status, GameStatus::Running);
        assert_eq!(data.factions.len(), 1);

        let faction = &data.factions[0];
        assert_eq!(faction.credits, 400);
        assert_eq!(faction.owned, vec![Coord::new(1, 2)]);
        assert_eq!(faction.units[0].unit_type, "Trooper");
        assert!(!faction.units[0].finished);
        assert_eq!(data.map.terrains[0].terrain, TerrainType::Base);
    }
}
