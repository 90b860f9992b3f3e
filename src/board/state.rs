//! Game state snapshot.
//!
//! The client's copy of one game at a point in time: the grid, the units,
//! factions and players, round and status. Cells and units are stored in
//! owning collections and linked by id; occupancy is a pair of maps
//! (`cell -> unit`, `unit -> cell`) that are always updated together.
//!
//! Only the sync session and the order composer mutate a snapshot, so the
//! mutating methods are crate-private.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::faction::{Faction, FactionId, Player};
use super::hex::{Cell, CellId, Coord, HexGrid};
use super::terrain::{ConfigurationError, TerrainCatalog, TerrainType};
use super::unit::{Unit, UnitId, UnitType};
use crate::protocol::data::GameData;

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Lobby,
    Running,
    Finished,
    #[serde(other)]
    Unknown,
}

/// Problems building or updating a snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("duplicate cell at ({0})")]
    DuplicateCell(Coord),

    #[error("no cell at ({0})")]
    NoSuchCell(Coord),

    #[error("cell ({0}) is already occupied")]
    Occupied(Coord),

    #[error("cell ({coord}) is {terrain} and cannot be owned")]
    NotOwnable { coord: Coord, terrain: TerrainType },

    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    #[error("no cell with id {0:?}")]
    UnknownCell(CellId),

    #[error("unknown {0}")]
    UnknownFaction(FactionId),

    #[error("too many factions: {0}")]
    TooManyFactions(usize),
}

/// One game's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    game_id: u32,
    round: u32,
    status: GameStatus,
    grid: HexGrid,
    units: BTreeMap<UnitId, Unit>,
    unit_cell: HashMap<UnitId, CellId>,
    cell_unit: HashMap<CellId, UnitId>,
    factions: Vec<Faction>,
    players: Vec<Player>,
    next_unit_id: u32,
}

impl GameSnapshot {
    /// Builds a snapshot from fetched game data.
    ///
    /// Every terrain kind on the map must have a catalog entry; a missing one
    /// is a `ConfigurationError`.
    pub fn from_data(data: &GameData, catalog: &TerrainCatalog) -> Result<Self, SnapshotError> {
        build(data, catalog, None)
    }

    /// Builds a replacement snapshot from freshly fetched data, carrying unit
    /// ids over from `self`.
    ///
    /// A unit keeps its id when a unit of the same faction and type stood on
    /// the same cell before. `relocated` names a unit whose move was just
    /// accepted and the cell it moved to, so it keeps its id too. All other
    /// state comes from `data` alone.
    pub fn rebuild(
        &self,
        data: &GameData,
        catalog: &TerrainCatalog,
        relocated: Option<(UnitId, Coord)>,
    ) -> Result<Self, SnapshotError> {
        build(data, catalog, Some((self, relocated)))
    }

    pub fn game_id(&self) -> u32 {
        self.game_id
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(id.0 as usize)
    }

    /// The faction whose turn it is.
    pub fn current_faction(&self) -> Option<&Faction> {
        self.factions.iter().find(|f| f.current)
    }

    /// The faction played by `name`.
    pub fn faction_of_player(&self, name: &str) -> Option<&Faction> {
        self.factions.iter().find(|f| f.player_name == name)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// All units in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values()
    }

    pub fn unit_cell(&self, id: UnitId) -> Option<CellId> {
        self.unit_cell.get(&id).copied()
    }

    pub fn unit_coord(&self, id: UnitId) -> Option<Coord> {
        self.unit_cell(id).map(|c| self.grid.coord(c))
    }

    /// The unit occupying `cell`, if any.
    pub fn unit_at(&self, cell: CellId) -> Option<&Unit> {
        self.cell_unit.get(&cell).and_then(|id| self.units.get(id))
    }

    pub fn unit_at_coord(&self, coord: Coord) -> Option<&Unit> {
        self.grid.id_of(coord).and_then(|c| self.unit_at(c))
    }

    pub fn is_occupied(&self, cell: CellId) -> bool {
        self.cell_unit.contains_key(&cell)
    }

    pub fn units_of(&self, faction: FactionId) -> Vec<&Unit> {
        self.units().filter(|u| u.faction == faction).collect()
    }

    /// Units that do not belong to `faction`.
    pub fn enemies_of(&self, faction: FactionId) -> Vec<&Unit> {
        self.units().filter(|u| u.faction != faction).collect()
    }

    /// All base cells.
    pub fn bases(&self) -> Vec<CellId> {
        self.grid
            .iter()
            .filter(|(_, c)| c.terrain == TerrainType::Base)
            .map(|(id, _)| id)
            .collect()
    }

    /// Capturable cells owned by `faction`.
    pub fn owned_by(&self, faction: FactionId) -> Vec<CellId> {
        self.grid
            .iter()
            .filter(|(_, c)| c.owner == Some(faction))
            .map(|(id, _)| id)
            .collect()
    }

    /// Capturable cells `faction` does not own yet.
    pub fn capture_targets(&self, faction: FactionId) -> Vec<CellId> {
        self.grid
            .ids()
            .filter(|&id| self.is_capturable_by(id, faction))
            .collect()
    }

    /// Whether `faction` could take `cell` by capturing it.
    pub fn is_capturable_by(&self, cell: CellId, faction: FactionId) -> bool {
        match self.grid.get(cell) {
            Some(c) => c.terrain.is_capturable() && c.owner != Some(faction),
            None => false,
        }
    }

    /// Checks that the occupancy maps mirror each other and every unit
    /// stands on an existing cell.
    pub fn is_consistent(&self) -> bool {
        if self.unit_cell.len() != self.units.len() || self.cell_unit.len() != self.units.len() {
            return false;
        }
        self.units.keys().all(|id| match self.unit_cell.get(id) {
            Some(cell) => {
                self.grid.get(*cell).is_some() && self.cell_unit.get(cell) == Some(id)
            }
            None => false,
        })
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit, SnapshotError> {
        self.units.get_mut(&id).ok_or(SnapshotError::UnknownUnit(id))
    }

    pub(crate) fn faction_mut(&mut self, id: FactionId) -> Result<&mut Faction, SnapshotError> {
        self.factions
            .get_mut(id.0 as usize)
            .ok_or(SnapshotError::UnknownFaction(id))
    }

    /// Moves a unit, updating both occupancy maps together.
    pub(crate) fn move_unit(&mut self, id: UnitId, to: CellId) -> Result<(), SnapshotError> {
        let from = self.unit_cell(id).ok_or(SnapshotError::UnknownUnit(id))?;
        if from == to {
            return Ok(());
        }
        let to_coord = self
            .grid
            .get(to)
            .map(|c| c.coord)
            .ok_or(SnapshotError::UnknownCell(to))?;
        if self.cell_unit.contains_key(&to) {
            return Err(SnapshotError::Occupied(to_coord));
        }
        self.cell_unit.remove(&from);
        self.cell_unit.insert(to, id);
        self.unit_cell.insert(id, to);
        Ok(())
    }

    /// Places a new unit on an empty cell and returns its id.
    pub(crate) fn place_unit(
        &mut self,
        faction: FactionId,
        unit_type: UnitType,
        cell: CellId,
        hit_points: i32,
        finished: bool,
    ) -> Result<UnitId, SnapshotError> {
        let id = UnitId(self.next_unit_id);
        self.insert_unit(
            Unit {
                id,
                faction,
                unit_type,
                hit_points,
                finished,
                capturing: false,
            },
            cell,
        )?;
        self.next_unit_id += 1;
        Ok(id)
    }

    pub(crate) fn set_owner(&mut self, cell: CellId, owner: Option<FactionId>) {
        if let Some(c) = self.grid.get_mut(cell) {
            if c.terrain.is_capturable() {
                c.owner = owner;
            }
        }
    }

    fn insert_unit(&mut self, unit: Unit, cell: CellId) -> Result<(), SnapshotError> {
        if self.cell_unit.contains_key(&cell) {
            return Err(SnapshotError::Occupied(self.grid.coord(cell)));
        }
        self.cell_unit.insert(cell, unit.id);
        self.unit_cell.insert(unit.id, cell);
        self.units.insert(unit.id, unit);
        Ok(())
    }
}

/// Picks the id for a unit found at `coord` in freshly fetched data.
fn carried_id(
    previous: Option<(&GameSnapshot, Option<(UnitId, Coord)>)>,
    claimed: &HashSet<UnitId>,
    faction: FactionId,
    unit_type: UnitType,
    coord: Coord,
) -> Option<UnitId> {
    let (prev, relocated) = previous?;
    let same_kind = |id: UnitId| {
        prev.unit(id)
            .is_some_and(|u| u.faction == faction && u.unit_type == unit_type)
            && !claimed.contains(&id)
    };

    if let Some((moved, to)) = relocated {
        if to == coord && same_kind(moved) {
            return Some(moved);
        }
    }
    let stayed = prev.unit_at_coord(coord)?.id;
    let moved_away = relocated.is_some_and(|(moved, _)| moved == stayed);
    if same_kind(stayed) && !moved_away {
        Some(stayed)
    } else {
        None
    }
}

fn build(
    data: &GameData,
    catalog: &TerrainCatalog,
    previous: Option<(&GameSnapshot, Option<(UnitId, Coord)>)>,
) -> Result<GameSnapshot, SnapshotError> {
    let mut cells = Vec::with_capacity(data.map.terrains.len());
    for t in &data.map.terrains {
        catalog.spec(t.terrain)?;
        cells.push(Cell::new(Coord::new(t.x, t.y), t.terrain));
    }
    let grid =
        HexGrid::new(data.map.width, data.map.height, cells).map_err(SnapshotError::DuplicateCell)?;

    if data.factions.len() > u8::MAX as usize + 1 {
        return Err(SnapshotError::TooManyFactions(data.factions.len()));
    }

    let mut snapshot = GameSnapshot {
        game_id: data.id,
        round: data.round,
        status: data.status,
        grid,
        units: BTreeMap::new(),
        unit_cell: HashMap::new(),
        cell_unit: HashMap::new(),
        factions: Vec::with_capacity(data.factions.len()),
        players: data
            .players
            .iter()
            .map(|p| Player {
                name: p.name.clone(),
                current: p.current,
            })
            .collect(),
        next_unit_id: previous.map_or(0, |(prev, _)| prev.next_unit_id),
    };

    let mut claimed = HashSet::new();
    for (i, fd) in data.factions.iter().enumerate() {
        let id = FactionId(i as u8);
        snapshot.factions.push(Faction {
            id,
            player_id: fd.player_id,
            player_name: fd.player_name.clone(),
            credits: fd.credits,
            current: fd.current,
            state: fd.state,
        });

        for &coord in &fd.owned {
            let cell = snapshot
                .grid
                .id_of(coord)
                .ok_or(SnapshotError::NoSuchCell(coord))?;
            let terrain = snapshot.grid.cell(cell).terrain;
            if !terrain.is_capturable() {
                return Err(SnapshotError::NotOwnable { coord, terrain });
            }
            snapshot.set_owner(cell, Some(id));
        }

        for ud in &fd.units {
            let unit_type = UnitType::from_server_name(&ud.unit_type)?;
            let coord = Coord::new(ud.x, ud.y);
            let cell = snapshot
                .grid
                .id_of(coord)
                .ok_or(SnapshotError::NoSuchCell(coord))?;

            let unit_id = match carried_id(previous, &claimed, id, unit_type, coord) {
                Some(carried) => carried,
                None => {
                    let fresh = UnitId(snapshot.next_unit_id);
                    snapshot.next_unit_id += 1;
                    fresh
                }
            };
            claimed.insert(unit_id);
            snapshot.insert_unit(
                Unit {
                    id: unit_id,
                    faction: id,
                    unit_type,
                    hit_points: ud.quantity,
                    finished: ud.finished,
                    capturing: ud.capturing,
                },
                cell,
            )?;
        }
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::terrain::{ClassCosts, TerrainSpec};
    use crate::protocol::data::{FactionData, UnitData};
    use crate::protocol::layout::parse_layout;

    fn catalog() -> TerrainCatalog {
        TerrainCatalog::new()
            .with_spec(TerrainType::Plains, TerrainSpec::movement(ClassCosts::uniform(1)))
            .with_spec(TerrainType::Base, TerrainSpec::movement(ClassCosts::uniform(1)))
    }

    fn game() -> GameData {
        let mut me = FactionData::new(1, "marshal", 300);
        me.current = true;
        me.units.push(UnitData::new(0, 0, "Trooper"));
        me.units.push(UnitData::new(1, 0, "Tank"));
        me.owned.push(Coord::new(2, 2));

        let mut them = FactionData::new(2, "rival", 300);
        them.units.push(UnitData::new(3, 3, "Heavy Trooper"));

        GameData {
            id: 7,
            name: String::new(),
            round: 3,
            status: GameStatus::Running,
            players: Vec::new(),
            factions: vec![me, them],
            map: parse_layout("pppp/pppp/ppbp/pppb").unwrap(),
        }
    }

    #[test]
    fn builds_from_data() {
        let snap = GameSnapshot::from_data(&game(), &catalog()).unwrap();
        assert_eq!(snap.round(), 3);
        assert_eq!(snap.grid().len(), 16);
        assert_eq!(snap.units().count(), 3);
        assert!(snap.is_consistent());

        let me = snap.current_faction().unwrap();
        assert_eq!(me.player_name, "marshal");
        assert_eq!(snap.units_of(me.id).len(), 2);
        assert_eq!(snap.enemies_of(me.id).len(), 1);

        let trooper = snap.unit_at_coord(Coord::new(0, 0)).unwrap();
        assert_eq!(trooper.unit_type, UnitType::Trooper);
        assert_eq!(snap.unit_coord(trooper.id), Some(Coord::new(0, 0)));
    }

    #[test]
    fn ownership_and_capture_targets() {
        let snap = GameSnapshot::from_data(&game(), &catalog()).unwrap();
        let me = FactionId(0);
        let own_base = snap.grid().cell_at(2, 2).unwrap();
        let free_base = snap.grid().cell_at(3, 3).unwrap();

        assert_eq!(snap.bases(), vec![own_base, free_base]);
        assert_eq!(snap.owned_by(me), vec![own_base]);
        assert_eq!(snap.capture_targets(me), vec![free_base]);
        assert!(snap.is_capturable_by(own_base, FactionId(1)));
        assert!(!snap.is_capturable_by(snap.grid().cell_at(0, 0).unwrap(), me));
    }

    #[test]
    fn missing_terrain_spec_is_configuration_error() {
        let catalog = TerrainCatalog::new()
            .with_spec(TerrainType::Plains, TerrainSpec::movement(ClassCosts::uniform(1)));
        let err = GameSnapshot::from_data(&game(), &catalog).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::Configuration(ConfigurationError::UnknownTerrain(TerrainType::Base))
        );
    }

    #[test]
    fn unknown_unit_type_is_configuration_error() {
        let mut data = game();
        data.factions[1].units.push(UnitData::new(2, 3, "Battleship"));
        let err = GameSnapshot::from_data(&data, &catalog()).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Configuration(ConfigurationError::UnknownUnitType(_))
        ));
    }

    #[test]
    fn rejects_units_off_map_and_stacked() {
        let mut data = game();
        data.factions[0].units.push(UnitData::new(9, 9, "Trooper"));
        assert_eq!(
            GameSnapshot::from_data(&data, &catalog()).unwrap_err(),
            SnapshotError::NoSuchCell(Coord::new(9, 9))
        );

        let mut data = game();
        data.factions[1].units.push(UnitData::new(0, 0, "Trooper"));
        assert_eq!(
            GameSnapshot::from_data(&data, &catalog()).unwrap_err(),
            SnapshotError::Occupied(Coord::new(0, 0))
        );
    }

    #[test]
    fn rejects_ownership_of_plain_terrain() {
        let mut data = game();
        data.factions[0].owned.push(Coord::new(0, 1));
        assert_eq!(
            GameSnapshot::from_data(&data, &catalog()).unwrap_err(),
            SnapshotError::NotOwnable {
                coord: Coord::new(0, 1),
                terrain: TerrainType::Plains
            }
        );
    }

    #[test]
    fn move_unit_keeps_back_references() {
        let mut snap = GameSnapshot::from_data(&game(), &catalog()).unwrap();
        let trooper = snap.unit_at_coord(Coord::new(0, 0)).unwrap().id;
        let from = snap.grid().cell_at(0, 0).unwrap();
        let to = snap.grid().cell_at(0, 1).unwrap();

        snap.move_unit(trooper, to).unwrap();
        assert!(snap.unit_at(from).is_none());
        assert_eq!(snap.unit_at(to).map(|u| u.id), Some(trooper));
        assert_eq!(snap.unit_cell(trooper), Some(to));
        assert!(snap.is_consistent());
    }

    #[test]
    fn move_onto_occupied_cell_fails_without_change() {
        let mut snap = GameSnapshot::from_data(&game(), &catalog()).unwrap();
        let trooper = snap.unit_at_coord(Coord::new(0, 0)).unwrap().id;
        let tank_cell = snap.grid().cell_at(1, 0).unwrap();

        let err = snap.move_unit(trooper, tank_cell).unwrap_err();
        assert_eq!(err, SnapshotError::Occupied(Coord::new(1, 0)));
        assert_eq!(snap.unit_coord(trooper), Some(Coord::new(0, 0)));
        assert!(snap.is_consistent());
    }

    #[test]
    fn rebuild_carries_ids_for_stationary_and_relocated_units() {
        let snap = GameSnapshot::from_data(&game(), &catalog()).unwrap();
        let trooper = snap.unit_at_coord(Coord::new(0, 0)).unwrap().id;
        let tank = snap.unit_at_coord(Coord::new(1, 0)).unwrap().id;
        let enemy = snap.unit_at_coord(Coord::new(3, 3)).unwrap().id;

        let mut data = game();
        data.factions[0].units[0].y = 2;
        data.factions[0].units[0].x = 0;
        data.factions[0].units.push(UnitData::new(0, 0, "Trooper"));
        let next = snap
            .rebuild(&data, &catalog(), Some((trooper, Coord::new(0, 2))))
            .unwrap();

        assert_eq!(next.unit_at_coord(Coord::new(0, 2)).map(|u| u.id), Some(trooper));
        assert_eq!(next.unit_at_coord(Coord::new(1, 0)).map(|u| u.id), Some(tank));
        assert_eq!(next.unit_at_coord(Coord::new(3, 3)).map(|u| u.id), Some(enemy));

        // The newcomer on the vacated cell gets a fresh id.
        let newcomer = next.unit_at_coord(Coord::new(0, 0)).unwrap().id;
        assert!(![trooper, tank, enemy].contains(&newcomer));
        assert!(next.is_consistent());
    }

    #[test]
    fn place_unit_assigns_fresh_ids() {
        let mut snap = GameSnapshot::from_data(&game(), &catalog()).unwrap();
        let base = snap.grid().cell_at(2, 2).unwrap();
        let id = snap
            .place_unit(FactionId(0), UnitType::Trooper, base, 10, true)
            .unwrap();
        assert!(snap.units().filter(|u| u.id == id).count() == 1);
        assert_eq!(snap.unit_at(base).map(|u| u.id), Some(id));
        assert!(snap
            .place_unit(FactionId(0), UnitType::Trooper, base, 10, true)
            .is_err());
    }
}
