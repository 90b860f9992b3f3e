//! Data exchanged with the outside world.
//!
//! Structured game-state data as a transport delivers it, the compact map
//! layout notation used for fixtures, and the command notation used in logs.

pub mod data;
pub mod layout;
pub mod notation;

pub use data::{FactionData, GameData, MapData, PlayerData, TerrainData, UnitData};
pub use layout::{encode_layout, parse_layout, random_layout, LayoutError};
pub use notation::{format_command, parse_command, NotationError};
