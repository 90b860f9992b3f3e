//! Least-cost routes on the weighted hex graph.
//!
//! Plain Dijkstra over `CellId`-indexed vectors with a `BinaryHeap` min-heap.
//! Excluded cells and cells with no entrance cost are never relaxed, so no
//! route ever enters them. The source itself is always the root of the
//! search, even if it appears in the exclusion set.
//!
//! Ties between equal-cost routes fall out of heap order; callers must not
//! rely on which of several cheapest paths is returned.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use super::cost::CostTable;
use crate::board::hex::{CellId, HexGrid};
use crate::board::state::GameSnapshot;
use crate::board::terrain::{ConfigurationError, TerrainCatalog, UnitClass};
use crate::board::unit::UnitId;

/// Heap entry; reversed ordering turns `BinaryHeap` into a min-heap.
#[derive(Debug, PartialEq, Eq)]
struct Frontier {
    cell: CellId,
    dist: u32,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .cmp(&self.dist)
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a single-source search: final distances and the predecessor
/// of every reached cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    source: CellId,
    dist: Vec<Option<u32>>,
    prev: Vec<Option<CellId>>,
}

impl ShortestPaths {
    pub fn source(&self) -> CellId {
        self.source
    }

    /// Cheapest cost from the source to `cell`; `None` if unreached.
    pub fn distance(&self, cell: CellId) -> Option<u32> {
        self.dist.get(cell.index()).copied().flatten()
    }

    pub fn predecessor(&self, cell: CellId) -> Option<CellId> {
        self.prev.get(cell.index()).copied().flatten()
    }

    pub fn is_reached(&self, cell: CellId) -> bool {
        self.distance(cell).is_some()
    }

    /// Reached cells with their distances, in arena order. Includes the source.
    pub fn reached(&self) -> impl Iterator<Item = (CellId, u32)> + '_ {
        self.dist
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.map(|d| (CellId(i as u32), d)))
    }

    /// Walks predecessors back from `dest`.
    ///
    /// The path excludes the source and ends with `dest`. It is empty when
    /// `dest` is the source or was never reached.
    pub fn path_to(&self, dest: CellId) -> Vec<CellId> {
        if dest == self.source || !self.is_reached(dest) {
            return Vec::new();
        }
        let mut path = Vec::new();
        let mut current = dest;
        while current != self.source {
            path.push(current);
            // A chain longer than the grid would mean a cycle; give up.
            if path.len() > self.dist.len() {
                return Vec::new();
            }
            match self.predecessor(current) {
                Some(prev) => current = prev,
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }
}

/// Dijkstra from `source` with precomputed entrance costs.
pub fn shortest_paths_with(
    grid: &HexGrid,
    costs: &CostTable,
    source: CellId,
    excluded: &HashSet<CellId>,
) -> ShortestPaths {
    let n = grid.len();
    let mut dist: Vec<Option<u32>> = vec![None; n];
    let mut prev: Vec<Option<CellId>> = vec![None; n];
    let mut done = vec![false; n];

    if source.index() >= n {
        return ShortestPaths { source, dist, prev };
    }
    dist[source.index()] = Some(0);

    let mut open = BinaryHeap::new();
    open.push(Frontier {
        cell: source,
        dist: 0,
    });

    while let Some(Frontier { cell, dist: d }) = open.pop() {
        let ci = cell.index();
        if done[ci] {
            continue;
        }
        done[ci] = true;

        for next in grid.neighbors(cell) {
            let ni = next.index();
            if done[ni] || excluded.contains(&next) {
                continue;
            }
            let Some(step) = costs.get(next) else {
                continue;
            };
            // A sum past u32::MAX is treated as unreachable.
            let Some(candidate) = d.checked_add(step) else {
                continue;
            };
            if dist[ni].map_or(true, |known| candidate < known) {
                dist[ni] = Some(candidate);
                prev[ni] = Some(cell);
                open.push(Frontier {
                    cell: next,
                    dist: candidate,
                });
            }
        }
    }

    ShortestPaths { source, dist, prev }
}

/// Dijkstra from `source` for one unit class.
pub fn shortest_paths(
    grid: &HexGrid,
    catalog: &TerrainCatalog,
    class: UnitClass,
    source: CellId,
    excluded: &HashSet<CellId>,
) -> Result<ShortestPaths, ConfigurationError> {
    let costs = CostTable::build(grid, catalog, class)?;
    Ok(shortest_paths_with(grid, &costs, source, excluded))
}

/// The cheapest path from `source` to `dest`, excluding the source.
///
/// Empty if `dest` is the source or cannot be reached.
pub fn shortest_path(
    grid: &HexGrid,
    catalog: &TerrainCatalog,
    class: UnitClass,
    source: CellId,
    dest: CellId,
    excluded: &HashSet<CellId>,
) -> Result<Vec<CellId>, ConfigurationError> {
    Ok(shortest_paths(grid, catalog, class, source, excluded)?.path_to(dest))
}

/// Movement cost for `unit` to travel to `dest`, ignoring occupancy and
/// turn limits. `None` if the unit is unknown or `dest` is unreachable.
pub fn travel_cost(
    snapshot: &GameSnapshot,
    catalog: &TerrainCatalog,
    unit: UnitId,
    dest: CellId,
) -> Result<Option<u32>, ConfigurationError> {
    let (Some(u), Some(from)) = (snapshot.unit(unit), snapshot.unit_cell(unit)) else {
        return Ok(None);
    };
    let paths = shortest_paths(snapshot.grid(), catalog, u.class(), from, &HashSet::new())?;
    Ok(paths.distance(dest))
}
