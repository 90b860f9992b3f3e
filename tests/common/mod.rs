//! In-memory game server shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use hexmarshal::board::{Coord, GameStatus, TerrainCatalog};
use hexmarshal::config::{ReconcileStrategy, RetryPolicy, SyncConfig};
use hexmarshal::order::{CombatReport, Command, OrderResult};
use hexmarshal::protocol::{parse_layout, FactionData, GameData, UnitData};
use hexmarshal::sync::{GameId, GameServer, Session, TransportError};

pub const CATALOG_JSON: &str = r#"{
    "plains": {
        "attack": {"soft": 0, "hard": 0, "amphibious": 0},
        "defense": {"soft": 0, "hard": 0, "amphibious": 0},
        "movement": {"soft": 1, "hard": 1, "amphibious": 1}
    },
    "woods": {
        "defense": {"soft": 2, "hard": 1},
        "movement": {"soft": 2, "hard": 3, "amphibious": 3}
    },
    "water": {
        "movement": {"amphibious": 1}
    },
    "base": {
        "defense": {"soft": 2, "hard": 2, "amphibious": 2},
        "movement": {"soft": 1, "hard": 1, "amphibious": 1}
    }
}"#;

pub fn catalog() -> Arc<TerrainCatalog> {
    Arc::new(TerrainCatalog::from_json_str(CATALOG_JSON).unwrap())
}

/// Game with two factions; faction 0 ("marshal") is to move.
pub fn game(layout: &str, mine: &[(i32, i32, &str)], theirs: &[(i32, i32, &str)]) -> GameData {
    let mut me = FactionData::new(1, "marshal", 300);
    me.current = true;
    me.units = mine.iter().map(|&(x, y, t)| UnitData::new(x, y, t)).collect();
    let mut them = FactionData::new(2, "rival", 300);
    them.units = theirs.iter().map(|&(x, y, t)| UnitData::new(x, y, t)).collect();
    GameData {
        id: 34,
        name: "fixture".to_string(),
        round: 1,
        status: GameStatus::Running,
        players: Vec::new(),
        factions: vec![me, them],
        map: parse_layout(layout).unwrap(),
    }
}

/// Plays the server's side against a `GameData` it owns.
///
/// Movement and attack options come from tables keyed by coordinate; a unit
/// with no movement entry may go anywhere on the map. Accepted unit orders
/// are applied to the server's data so later fetches see them.
pub struct FakeServer {
    pub game: GameData,
    pub movement: HashMap<Coord, Vec<Coord>>,
    /// Attackable cells keyed by the origin being asked about.
    pub attacks: HashMap<Coord, Vec<Coord>>,
    /// Combat outcome reported for an attack on a given cell.
    pub combat: HashMap<Coord, CombatReport>,
    /// Canned answers for the next submissions, consumed in order.
    pub responses: VecDeque<Result<OrderResult, TransportError>>,
    /// Transient fetch failures still to be served.
    pub fetch_failures: u32,
    pub fetches: u32,
    pub submitted: Vec<Command>,
}

impl FakeServer {
    pub fn new(game: GameData) -> Self {
        FakeServer {
            game,
            movement: HashMap::new(),
            attacks: HashMap::new(),
            combat: HashMap::new(),
            responses: VecDeque::new(),
            fetch_failures: 0,
            fetches: 0,
            submitted: Vec::new(),
        }
    }

    pub fn unit_data(&mut self, at: Coord) -> Option<&mut UnitData> {
        self.game
            .factions
            .iter_mut()
            .flat_map(|f| f.units.iter_mut())
            .find(|u| u.x == at.x && u.y == at.y)
    }

    fn apply(&mut self, command: &Command) -> OrderResult {
        let Command::Unit(cmd) = command else {
            return OrderResult::accepted(false);
        };
        let mut at = cmd.at;
        if let Some(to) = cmd.move_to {
            if let Some(u) = self.unit_data(at) {
                u.x = to.x;
                u.y = to.y;
            }
            at = to;
        }
        let mut result = OrderResult::accepted(true);
        if let Some(target) = cmd.attack {
            if let Some(report) = self.combat.get(&target).copied() {
                if let Some(d) = self.unit_data(target) {
                    d.quantity -= report.damage_inflicted;
                }
                if let Some(a) = self.unit_data(at) {
                    a.quantity = report.remaining_quantity;
                }
                result = result.with_combat(report);
            }
        }
        if let Some(u) = self.unit_data(at) {
            u.finished = true;
            u.capturing = cmd.capture;
        }
        result
    }
}

impl GameServer for FakeServer {
    fn fetch_game(&mut self, _game: GameId) -> Result<GameData, TransportError> {
        self.fetches += 1;
        if self.fetch_failures > 0 {
            self.fetch_failures -= 1;
            return Err(TransportError::Transient("connection reset".to_string()));
        }
        Ok(self.game.clone())
    }

    fn movement_options(
        &mut self,
        _game: GameId,
        at: Coord,
        _unit_type: hexmarshal::board::UnitType,
    ) -> Result<Vec<Coord>, TransportError> {
        Ok(match self.movement.get(&at) {
            Some(cells) => cells.clone(),
            None => self
                .game
                .map
                .terrains
                .iter()
                .map(|t| Coord::new(t.x, t.y))
                .collect(),
        })
    }

    fn attack_options(
        &mut self,
        _game: GameId,
        _at: Coord,
        origin: Coord,
        _unit_type: hexmarshal::board::UnitType,
    ) -> Result<Vec<Coord>, TransportError> {
        Ok(self.attacks.get(&origin).cloned().unwrap_or_default())
    }

    fn submit(&mut self, _game: GameId, command: &Command) -> Result<OrderResult, TransportError> {
        self.submitted.push(*command);
        match self.responses.pop_front() {
            Some(Ok(result)) if !result.success => Ok(result),
            Some(Ok(result)) => {
                self.apply(command);
                Ok(result)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.apply(command)),
        }
    }
}

pub fn config(reconcile: ReconcileStrategy) -> SyncConfig {
    SyncConfig::default()
        .with_reconcile(reconcile)
        .with_retry(RetryPolicy::immediate(3))
}

pub fn open(server: FakeServer, reconcile: ReconcileStrategy) -> Session<FakeServer> {
    Session::open(server, 34, catalog(), config(reconcile)).unwrap()
}
