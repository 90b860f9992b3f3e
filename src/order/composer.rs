//! Composite move/attack/capture orders.
//!
//! `compose_move` turns "send this unit toward that cell" into at most one
//! command holding a move, an attack, and a capture:
//!
//! 1. Route: cheapest path from the unit's cell to the destination under
//!    the unit's class, avoiding the exclusion set.
//! 2. Trim: walk back from the destination to the last path cell the server
//!    says the unit can reach this turn.
//! 3. Allies: if a friendly unit stands on that cell, exclude it and route
//!    again. Each retry grows the exclusion set, and the number of retries
//!    is capped at the grid's cell count.
//! 4. Attack: the first enemy in the caller's preference list that the
//!    server says is attackable from the post-move cell.
//! 5. Capture: only if allowed, the unit can capture, it stops exactly on
//!    the destination, and the cell is capturable by its faction.
//!
//! Nothing is sent from here; `Session::execute` submits the plan.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::command::{Command, UnitCommand};
use super::error::OrderError;
use crate::board::hex::CellId;
use crate::board::state::{GameSnapshot, SnapshotError};
use crate::board::terrain::TerrainCatalog;
use crate::board::unit::UnitId;
use crate::route::cost::CostTable;
use crate::route::dijkstra::shortest_paths_with;
use crate::sync::session::SyncError;

/// Server-computed turn limits the composer has to respect.
pub trait TurnQueries {
    /// Cells `unit` can reach this turn.
    fn reachable_cells(
        &mut self,
        snapshot: &GameSnapshot,
        unit: UnitId,
    ) -> Result<HashSet<CellId>, SyncError>;

    /// Enemy units `unit` could attack if it stood on `origin`.
    fn attackable_units(
        &mut self,
        snapshot: &GameSnapshot,
        unit: UnitId,
        origin: CellId,
    ) -> Result<Vec<UnitId>, SyncError>;
}

/// Caller preferences for one move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Enemies to attack after moving, highest priority first.
    pub also_attack: Vec<UnitId>,
    /// Cells the route must not enter.
    pub exclusions: HashSet<CellId>,
    pub no_capture: bool,
}

impl MoveOptions {
    pub fn new() -> Self {
        MoveOptions::default()
    }

    pub fn attacking(mut self, targets: impl IntoIterator<Item = UnitId>) -> Self {
        self.also_attack.extend(targets);
        self
    }

    pub fn excluding(mut self, cells: impl IntoIterator<Item = CellId>) -> Self {
        self.exclusions.extend(cells);
        self
    }

    pub fn without_capture(mut self) -> Self {
        self.no_capture = true;
        self
    }
}

/// Why a move could not be made. Not an error: attack and capture are still
/// evaluated from the unit's current cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteUnavailable {
    /// No path to the destination exists.
    NoPath,
    /// No cell on the path is reachable this turn.
    NotReachableThisTurn,
    /// Every reachable stop is held by an ally.
    BlockedByAllies,
}

/// The outcome of composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    pub unit: UnitId,
    pub origin: CellId,
    /// The cell the unit moves to, if it moves.
    pub stop: Option<CellId>,
    pub target: Option<UnitId>,
    pub capture: bool,
    /// `None` when nothing was selected.
    pub command: Option<Command>,
    pub route_unavailable: Option<RouteUnavailable>,
}

impl OrderPlan {
    /// Where the unit stands once the plan is carried out.
    pub fn final_cell(&self) -> CellId {
        self.stop.unwrap_or(self.origin)
    }

    pub fn is_noop(&self) -> bool {
        self.command.is_none()
    }
}

/// Plans a move of `unit` toward `destination`. See the module docs.
pub fn compose_move<Q: TurnQueries + ?Sized>(
    snapshot: &GameSnapshot,
    catalog: &TerrainCatalog,
    queries: &mut Q,
    unit: UnitId,
    destination: CellId,
    options: &MoveOptions,
) -> Result<OrderPlan, OrderError> {
    let actor = snapshot.unit(unit).ok_or(SnapshotError::UnknownUnit(unit))?;
    let origin = snapshot
        .unit_cell(unit)
        .ok_or(SnapshotError::UnknownUnit(unit))?;
    let grid = snapshot.grid();
    if grid.get(destination).is_none() {
        return Err(SnapshotError::UnknownCell(destination).into());
    }

    let (stop, route_unavailable) = if destination == origin {
        (None, None)
    } else {
        select_stop(snapshot, catalog, queries, unit, origin, destination, options)?
    };
    let after_move = stop.unwrap_or(origin);

    let mut target = None;
    if !options.also_attack.is_empty() {
        let attackable = queries
            .attackable_units(snapshot, unit, after_move)
            .map_err(OrderError::Query)?;
        target = options
            .also_attack
            .iter()
            .copied()
            .find(|t| attackable.contains(t));
        match target {
            Some(t) => debug!(unit = %unit, target = %t, "attack target selected"),
            None => debug!(unit = %unit, "no preferred target in range"),
        }
    }

    let capture = !options.no_capture
        && actor.can_capture()
        && after_move == destination
        && snapshot.is_capturable_by(after_move, actor.faction);
    if capture {
        info!(unit = %unit, cell = %grid.coord(after_move), "capture appended");
    }

    let mut cmd = UnitCommand::new(grid.coord(origin));
    cmd.move_to = stop.map(|c| grid.coord(c));
    cmd.attack = target.and_then(|t| snapshot.unit_coord(t));
    cmd.capture = capture;
    let command = if cmd.is_empty() {
        None
    } else {
        Some(Command::Unit(cmd))
    };

    Ok(OrderPlan {
        unit,
        origin,
        stop,
        target,
        capture,
        command,
        route_unavailable,
    })
}

/// Steps 1-3: the cell the unit should stop on this turn.
fn select_stop<Q: TurnQueries + ?Sized>(
    snapshot: &GameSnapshot,
    catalog: &TerrainCatalog,
    queries: &mut Q,
    unit: UnitId,
    origin: CellId,
    destination: CellId,
    options: &MoveOptions,
) -> Result<(Option<CellId>, Option<RouteUnavailable>), OrderError> {
    let grid = snapshot.grid();
    let Some(actor) = snapshot.unit(unit) else {
        return Err(SnapshotError::UnknownUnit(unit).into());
    };
    let costs = CostTable::build(grid, catalog, actor.class())?;
    let mut exclusions = options.exclusions.clone();
    let mut reachable: Option<HashSet<CellId>> = None;
    let mut blocked_by_ally = false;

    for _ in 0..grid.len() {
        let path = shortest_paths_with(grid, &costs, origin, &exclusions).path_to(destination);
        if path.is_empty() {
            let reason = if blocked_by_ally {
                RouteUnavailable::BlockedByAllies
            } else {
                RouteUnavailable::NoPath
            };
            debug!(unit = %unit, to = %grid.coord(destination), ?reason, "no path");
            return Ok((None, Some(reason)));
        }

        let reach: &HashSet<CellId> = match reachable {
            Some(ref r) => r,
            None => reachable.insert(
                queries
                    .reachable_cells(snapshot, unit)
                    .map_err(OrderError::Query)?,
            ),
        };
        let Some(stop) = path.iter().rev().copied().find(|c| reach.contains(c)) else {
            let reason = if blocked_by_ally {
                RouteUnavailable::BlockedByAllies
            } else {
                RouteUnavailable::NotReachableThisTurn
            };
            debug!(unit = %unit, to = %grid.coord(destination), ?reason, "cannot move this turn");
            return Ok((None, Some(reason)));
        };

        match snapshot.unit_at(stop) {
            Some(other) if other.faction == actor.faction => {
                debug!(unit = %unit, blocked = %grid.coord(stop), "ally in the way, rerouting");
                exclusions.insert(stop);
                blocked_by_ally = true;
            }
            _ => return Ok((Some(stop), None)),
        }
    }

    warn!(unit = %unit, to = %grid.coord(destination), "reroute limit reached");
    Ok((None, Some(RouteUnavailable::BlockedByAllies)))
}
