//! Board representation and game-state types.
//!
//! Contains the terrain catalog, the hex grid, units, factions, and the
//! snapshot that ties them together.

pub mod faction;
pub mod hex;
pub mod state;
pub mod terrain;
pub mod unit;

pub use faction::{Faction, FactionId, FactionState, Player};
pub use hex::{Cell, CellId, Coord, Direction, HexGrid, ALL_DIRECTIONS};
pub use state::{GameSnapshot, GameStatus, SnapshotError};
pub use terrain::{
    ClassCosts, ConfigurationError, TerrainCatalog, TerrainCosts, TerrainSpec, TerrainType,
    UnitClass, ALL_TERRAIN,
};
pub use unit::{Unit, UnitId, UnitType, ALL_UNIT_TYPES, MAX_HIT_POINTS};
