//! One game as seen from the client: the snapshot, the server it came from,
//! and the order loop that keeps the two in step.
//!
//! Reads (snapshot fetches, movement and attack options) retry transient
//! failures with linear backoff. Submissions are never retried: a transport
//! failure while submitting surfaces as `OrderError::AmbiguousMutation`.
//!
//! After an accepted order the snapshot is reconciled with exactly one
//! strategy, chosen by `SyncConfig::reconcile`:
//! - `Authoritative`: the game is re-fetched and the snapshot rebuilt.
//! - `Optimistic`: only the deltas in the `OrderResult` are applied.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::retry::with_retry;
use super::server::{GameId, GameServer, TransportError};
use crate::board::hex::{CellId, Coord};
use crate::board::state::{GameSnapshot, SnapshotError};
use crate::board::terrain::{ConfigurationError, TerrainCatalog, TerrainType};
use crate::board::unit::{UnitId, UnitType, MAX_HIT_POINTS};
use crate::config::{ReconcileStrategy, SyncConfig};
use crate::order::command::{Command, OrderResult, UnitCommand};
use crate::order::composer::{
    compose_move, MoveOptions, OrderPlan, RouteUnavailable, TurnQueries,
};
use crate::order::error::OrderError;
use crate::route::dijkstra::travel_cost;

/// Failures keeping the snapshot in sync with the server.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl SyncError {
    /// Whether the failure comes from a catalog or unit-type mismatch.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SyncError::Snapshot(SnapshotError::Configuration(_)))
    }
}

/// What happened to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Nothing was sent.
    NoOp { reason: Option<RouteUnavailable> },
    /// The server accepted the command.
    Applied(OrderResult),
}

impl OrderOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, OrderOutcome::NoOp { .. })
    }
}

pub struct Session<S: GameServer> {
    server: S,
    game_id: GameId,
    catalog: Arc<TerrainCatalog>,
    config: SyncConfig,
    snapshot: GameSnapshot,
    last_attacked: Option<UnitId>,
}

impl<S: GameServer> Session<S> {
    /// Fetches the game and builds the first snapshot.
    pub fn open(
        mut server: S,
        game_id: GameId,
        catalog: Arc<TerrainCatalog>,
        config: SyncConfig,
    ) -> Result<Self, SyncError> {
        let data = with_retry(&config.retry, "fetch_game", || server.fetch_game(game_id))?;
        let snapshot = GameSnapshot::from_data(&data, &catalog)?;
        info!(
            game = game_id,
            round = snapshot.round(),
            units = snapshot.units().count(),
            "session opened"
        );
        Ok(Session {
            server,
            game_id,
            catalog,
            config,
            snapshot,
            last_attacked: None,
        })
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    pub fn catalog(&self) -> &TerrainCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The unit most recently attacked through this session.
    pub fn last_attacked(&self) -> Option<UnitId> {
        self.last_attacked
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn server_mut(&mut self) -> &mut S {
        &mut self.server
    }

    pub fn into_server(self) -> S {
        self.server
    }

    /// Replaces the snapshot with a fresh copy of the server's state.
    pub fn refresh(&mut self) -> Result<&GameSnapshot, SyncError> {
        self.snapshot = self.fetch_snapshot(None)?;
        debug!(game = self.game_id, round = self.snapshot.round(), "refreshed");
        Ok(&self.snapshot)
    }

    /// Sends one command without touching the snapshot.
    ///
    /// A declined command is `OrderError::Rejected`; a transport failure is
    /// `OrderError::AmbiguousMutation` and is not retried.
    pub fn submit(&mut self, command: Command) -> Result<OrderResult, OrderError> {
        info!(game = self.game_id, command = %command, "submitting order");
        let result = match self.server.submit(self.game_id, &command) {
            Ok(result) => result,
            Err(source) => {
                warn!(command = %command, error = %source, "order outcome unknown");
                return Err(OrderError::AmbiguousMutation { command, source });
            }
        };
        if !result.success {
            let reason = result.reason();
            warn!(command = %command, reason = %reason, "order rejected");
            return Err(OrderError::Rejected { command, reason });
        }
        debug!(command = %command, finished = result.finished, "order accepted");
        Ok(result)
    }

    /// Composes a move without sending it.
    pub fn plan_move(
        &mut self,
        unit: UnitId,
        destination: CellId,
        options: &MoveOptions,
    ) -> Result<OrderPlan, OrderError> {
        let mut queries = ServerQueries {
            server: &mut self.server,
            game: self.game_id,
            config: &self.config,
        };
        compose_move(
            &self.snapshot,
            &self.catalog,
            &mut queries,
            unit,
            destination,
            options,
        )
    }

    /// Moves `unit` toward `destination`, attacking and capturing on the way
    /// as `options` allow.
    pub fn move_to(
        &mut self,
        unit: UnitId,
        destination: CellId,
        options: &MoveOptions,
    ) -> Result<OrderOutcome, OrderError> {
        let plan = self.plan_move(unit, destination, options)?;
        self.execute(plan)
    }

    /// Submits a plan and reconciles the snapshot with the result.
    pub fn execute(&mut self, plan: OrderPlan) -> Result<OrderOutcome, OrderError> {
        let Some(command) = plan.command else {
            debug!(unit = %plan.unit, reason = ?plan.route_unavailable, "nothing to order");
            return Ok(OrderOutcome::NoOp {
                reason: plan.route_unavailable,
            });
        };

        // Resolve everything that depends on the old snapshot before submitting.
        let grid = self.snapshot.grid();
        let stop = match plan.stop {
            Some(c) => Some(
                grid.get(c)
                    .map(|cell| cell.coord)
                    .ok_or(SnapshotError::UnknownCell(c))?,
            ),
            None => None,
        };
        let combat_target = plan.target.and_then(|t| self.snapshot.unit_coord(t));

        let result = self.submit(command)?;
        match self.config.reconcile {
            ReconcileStrategy::Authoritative => {
                self.resync(command, stop.map(|to| (plan.unit, to)))?;
                if plan.target.is_some() {
                    self.last_attacked = combat_target
                        .and_then(|c| self.snapshot.unit_at_coord(c))
                        .map(|u| u.id)
                        .or(plan.target);
                }
            }
            ReconcileStrategy::Optimistic => self.apply_unit_result(&plan, command, &result)?,
        }
        Ok(OrderOutcome::Applied(result))
    }

    /// Attacks `target` without moving.
    pub fn attack(&mut self, unit: UnitId, target: UnitId) -> Result<OrderOutcome, OrderError> {
        let origin = self
            .snapshot
            .unit_cell(unit)
            .ok_or(SnapshotError::UnknownUnit(unit))?;
        let target_at = self
            .snapshot
            .unit_coord(target)
            .ok_or(SnapshotError::UnknownUnit(target))?;

        let mut cmd = UnitCommand::new(self.snapshot.grid().coord(origin));
        cmd.attack = Some(target_at);
        self.execute(OrderPlan {
            unit,
            origin,
            stop: None,
            target: Some(target),
            capture: false,
            command: Some(cmd.into()),
            route_unavailable: None,
        })
    }

    /// Repairs `unit` in place.
    pub fn repair(&mut self, unit: UnitId) -> Result<OrderResult, OrderError> {
        let at = self
            .snapshot
            .unit_coord(unit)
            .ok_or(SnapshotError::UnknownUnit(unit))?;
        let command = Command::Repair { at };
        let result = self.submit(command)?;

        match self.config.reconcile {
            ReconcileStrategy::Authoritative => self.resync(command, None)?,
            ReconcileStrategy::Optimistic => {
                let u = self.snapshot.unit_mut(unit)?;
                u.hit_points = (u.hit_points + u.unit_type.repair_rate()).min(MAX_HIT_POINTS);
                u.finished = result.finished;
            }
        }
        Ok(result)
    }

    /// Builds a unit on a base owned by the current faction.
    ///
    /// The base must be empty and the faction must afford the unit; both are
    /// checked before anything is sent.
    pub fn build(&mut self, at: CellId, unit_type: UnitType) -> Result<OrderResult, OrderError> {
        let cell = self
            .snapshot
            .grid()
            .get(at)
            .ok_or(SnapshotError::UnknownCell(at))?;
        let coord = cell.coord;
        let faction = self
            .snapshot
            .current_faction()
            .ok_or(OrderError::NotBuildable(coord))?;
        let faction_id = faction.id;

        if cell.terrain != TerrainType::Base
            || cell.owner != Some(faction_id)
            || self.snapshot.is_occupied(at)
        {
            return Err(OrderError::NotBuildable(coord));
        }
        if !faction.can_afford(unit_type) {
            return Err(OrderError::InsufficientCredits {
                unit_type,
                credits: faction.credits,
                cost: unit_type.cost(),
            });
        }

        let command = Command::Build { at: coord, unit_type };
        let result = self.submit(command)?;

        match self.config.reconcile {
            ReconcileStrategy::Authoritative => self.resync(command, None)?,
            ReconcileStrategy::Optimistic => {
                self.snapshot
                    .place_unit(faction_id, unit_type, at, MAX_HIT_POINTS, true)?;
                let faction = self.snapshot.faction_mut(faction_id)?;
                faction.credits = faction.credits.saturating_sub(unit_type.cost());
            }
        }
        Ok(result)
    }

    /// Ends the current faction's turn.
    pub fn finish_turn(&mut self) -> Result<OrderResult, OrderError> {
        let command = Command::EndTurn;
        let acting = self.snapshot.current_faction().map(|f| f.id);
        let result = self.submit(command)?;

        match self.config.reconcile {
            ReconcileStrategy::Authoritative => self.resync(command, None)?,
            ReconcileStrategy::Optimistic => {
                if let Some(faction) = acting {
                    let own: Vec<UnitId> =
                        self.snapshot.units_of(faction).iter().map(|u| u.id).collect();
                    for id in own {
                        self.snapshot.unit_mut(id)?.finished = true;
                    }
                    self.snapshot.faction_mut(faction)?.current = false;
                }
            }
        }
        info!(game = self.game_id, "turn finished");
        Ok(result)
    }

    /// Cells `unit` can reach this turn, per the server.
    pub fn reachable_cells(&mut self, unit: UnitId) -> Result<HashSet<CellId>, SyncError> {
        let mut queries = ServerQueries {
            server: &mut self.server,
            game: self.game_id,
            config: &self.config,
        };
        queries.reachable_cells(&self.snapshot, unit)
    }

    /// Enemies `unit` could attack from `origin`, per the server.
    pub fn attackable_units(
        &mut self,
        unit: UnitId,
        origin: CellId,
    ) -> Result<Vec<UnitId>, SyncError> {
        let mut queries = ServerQueries {
            server: &mut self.server,
            game: self.game_id,
            config: &self.config,
        };
        queries.attackable_units(&self.snapshot, unit, origin)
    }

    pub fn can_reach(&mut self, unit: UnitId, cell: CellId) -> Result<bool, SyncError> {
        Ok(self.reachable_cells(unit)?.contains(&cell))
    }

    /// Whether `unit` can attack `target` from where it stands. Always false
    /// once the unit has finished.
    pub fn can_attack(&mut self, unit: UnitId, target: UnitId) -> Result<bool, SyncError> {
        let Some(u) = self.snapshot.unit(unit) else {
            return Err(SnapshotError::UnknownUnit(unit).into());
        };
        if u.finished {
            return Ok(false);
        }
        let origin = self
            .snapshot
            .unit_cell(unit)
            .ok_or(SnapshotError::UnknownUnit(unit))?;
        Ok(self.attackable_units(unit, origin)?.contains(&target))
    }

    /// Movement cost for `unit` to reach `dest`, ignoring turn limits.
    pub fn travel_cost(
        &self,
        unit: UnitId,
        dest: CellId,
    ) -> Result<Option<u32>, ConfigurationError> {
        travel_cost(&self.snapshot, &self.catalog, unit, dest)
    }

    fn fetch_snapshot(
        &mut self,
        relocated: Option<(UnitId, Coord)>,
    ) -> Result<GameSnapshot, SyncError> {
        let game = self.game_id;
        let server = &mut self.server;
        let data = with_retry(&self.config.retry, "fetch_game", || server.fetch_game(game))?;
        Ok(self.snapshot.rebuild(&data, &self.catalog, relocated)?)
    }

    /// Authoritative reconciliation after an accepted command.
    fn resync(
        &mut self,
        command: Command,
        relocated: Option<(UnitId, Coord)>,
    ) -> Result<(), OrderError> {
        match self.fetch_snapshot(relocated) {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                Ok(())
            }
            Err(source) => {
                warn!(command = %command, error = %source, "refresh after order failed");
                Err(OrderError::RefreshAfterOrder { command, source })
            }
        }
    }

    /// Optimistic reconciliation: move, finished flag, then combat deltas.
    /// Damage is taken from the report, never recomputed.
    fn apply_unit_result(
        &mut self,
        plan: &OrderPlan,
        command: Command,
        result: &OrderResult,
    ) -> Result<(), OrderError> {
        if let Some(stop) = plan.stop {
            self.snapshot.move_unit(plan.unit, stop)?;
        }
        let actor = self.snapshot.unit_mut(plan.unit)?;
        actor.finished = result.finished;
        if plan.capture {
            actor.capturing = true;
        }

        let Some(report) = result.combat else {
            return Ok(());
        };
        let Some(target) = self
            .snapshot
            .unit_at_coord(report.target)
            .map(|u| u.id)
            .filter(|&id| id != plan.unit)
        else {
            warn!(command = %command, target = %report.target, "combat target not in snapshot");
            return Err(OrderError::UnknownCombatTarget {
                command,
                target: report.target,
            });
        };
        self.snapshot.unit_mut(target)?.hit_points -= report.damage_inflicted;
        self.snapshot.unit_mut(plan.unit)?.hit_points = report.remaining_quantity;
        self.last_attacked = Some(target);
        debug!(
            unit = %plan.unit,
            target = %target,
            inflicted = report.damage_inflicted,
            received = report.damage_received,
            "combat applied"
        );
        Ok(())
    }
}

/// Turn queries answered by the server, with read retries.
struct ServerQueries<'a, S: GameServer> {
    server: &'a mut S,
    game: GameId,
    config: &'a SyncConfig,
}

impl<S: GameServer> TurnQueries for ServerQueries<'_, S> {
    fn reachable_cells(
        &mut self,
        snapshot: &GameSnapshot,
        unit: UnitId,
    ) -> Result<HashSet<CellId>, SyncError> {
        let u = snapshot.unit(unit).ok_or(SnapshotError::UnknownUnit(unit))?;
        let at = snapshot
            .unit_coord(unit)
            .ok_or(SnapshotError::UnknownUnit(unit))?;
        let (game, unit_type) = (self.game, u.unit_type);
        let server = &mut *self.server;
        let coords = with_retry(&self.config.retry, "movement_options", || {
            server.movement_options(game, at, unit_type)
        })?;
        Ok(coords
            .into_iter()
            .filter_map(|c| snapshot.grid().id_of(c))
            .collect())
    }

    fn attackable_units(
        &mut self,
        snapshot: &GameSnapshot,
        unit: UnitId,
        origin: CellId,
    ) -> Result<Vec<UnitId>, SyncError> {
        let u = snapshot.unit(unit).ok_or(SnapshotError::UnknownUnit(unit))?;
        let at = snapshot
            .unit_coord(unit)
            .ok_or(SnapshotError::UnknownUnit(unit))?;
        let from = snapshot
            .grid()
            .get(origin)
            .map(|c| c.coord)
            .ok_or(SnapshotError::UnknownCell(origin))?;
        let (game, unit_type, faction) = (self.game, u.unit_type, u.faction);
        let server = &mut *self.server;
        let coords = with_retry(&self.config.retry, "attack_options", || {
            server.attack_options(game, at, from, unit_type)
        })?;
        Ok(coords
            .into_iter()
            .filter_map(|c| snapshot.unit_at_coord(c))
            .filter(|target| target.faction != faction)
            .map(|target| target.id)
            .collect())
    }
}
