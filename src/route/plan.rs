//! Nearest-destination assignment for many units at once.
//!
//! Each unit runs its own Dijkstra search, so the units are spread over the
//! rayon pool. Only the snapshot and catalog are read; cost tables are built
//! once per unit class before the parallel section.

use std::collections::HashSet;

use rayon::prelude::*;

use super::cost::CostTable;
use super::dijkstra::shortest_paths_with;
use crate::board::hex::CellId;
use crate::board::state::GameSnapshot;
use crate::board::terrain::{ConfigurationError, TerrainCatalog, UnitClass};
use crate::board::unit::UnitId;

/// The cheapest candidate a unit can travel to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub unit: UnitId,
    pub destination: CellId,
    pub cost: u32,
}

/// Picks, for every unit in `units`, the candidate cell it can reach most
/// cheaply. Ties go to the lowest cell id.
///
/// The result is in input order; an entry is `None` when the unit is not on
/// the board or reaches no candidate. Cells in `excluded` are not entered by
/// any route.
pub fn nearest_destinations(
    snapshot: &GameSnapshot,
    catalog: &TerrainCatalog,
    units: &[UnitId],
    candidates: &[CellId],
    excluded: &HashSet<CellId>,
) -> Result<Vec<Option<Assignment>>, ConfigurationError> {
    let grid = snapshot.grid();
    let mut tables: Vec<CostTable> = Vec::with_capacity(3);
    for unit in units.iter().filter_map(|&id| snapshot.unit(id)) {
        let class = unit.class();
        if !tables.iter().any(|t| t.class() == class) {
            tables.push(CostTable::build(grid, catalog, class)?);
        }
    }
    let table_for = |class: UnitClass| tables.iter().find(|t| t.class() == class);

    let assignments = units
        .par_iter()
        .map(|&id| {
            let unit = snapshot.unit(id)?;
            let from = snapshot.unit_cell(id)?;
            let costs = table_for(unit.class())?;
            let paths = shortest_paths_with(grid, costs, from, excluded);
            candidates
                .iter()
                .filter_map(|&dest| paths.distance(dest).map(|cost| (cost, dest)))
                .min()
                .map(|(cost, destination)| Assignment {
                    unit: id,
                    destination,
                    cost,
                })
        })
        .collect();

    Ok(assignments)
}
