//! Property tests for the path finder on small random maps.

use std::collections::HashSet;

use hexmarshal::board::{
    Cell, CellId, ClassCosts, Coord, HexGrid, TerrainCatalog, TerrainSpec, TerrainType, UnitClass,
};
use hexmarshal::route::{entrance_cost, path_cost, shortest_paths};
use proptest::prelude::*;

const TERRAIN: [TerrainType; 4] = [
    TerrainType::Plains,
    TerrainType::Woods,
    TerrainType::Mountains,
    TerrainType::Water,
];

const CLASSES: [UnitClass; 3] = [UnitClass::Soft, UnitClass::Hard, UnitClass::Amphibious];

fn catalog() -> TerrainCatalog {
    TerrainCatalog::new()
        .with_spec(TerrainType::Plains, TerrainSpec::movement(ClassCosts::uniform(1)))
        .with_spec(TerrainType::Woods, TerrainSpec::movement(ClassCosts::uniform(2)))
        .with_spec(
            TerrainType::Mountains,
            TerrainSpec::movement(ClassCosts::forbidden().with(UnitClass::Soft, Some(3))),
        )
        .with_spec(
            TerrainType::Water,
            TerrainSpec::movement(ClassCosts::forbidden().with(UnitClass::Amphibious, Some(1))),
        )
}

#[derive(Debug, Clone)]
struct Case {
    grid: HexGrid,
    class: UnitClass,
    source: CellId,
    dest: CellId,
    excluded: HashSet<CellId>,
}

fn case(max_w: u32, max_h: u32) -> impl Strategy<Value = Case> {
    (1..=max_w, 1..=max_h)
        .prop_flat_map(|(w, h)| {
            let n = (w * h) as usize;
            (
                Just((w, h)),
                prop::collection::vec(0..TERRAIN.len(), n),
                prop::collection::vec(prop::bool::weighted(0.15), n),
                0..CLASSES.len(),
                0..n,
                0..n,
            )
        })
        .prop_map(|((w, h), terrain, excluded, class, source, dest)| {
            let mut cells = Vec::with_capacity(terrain.len());
            for y in 0..h as i32 {
                for x in 0..w as i32 {
                    let i = (y as u32 * w + x as u32) as usize;
                    cells.push(Cell::new(Coord::new(x, y), TERRAIN[terrain[i]]));
                }
            }
            let grid = HexGrid::new(w, h, cells).unwrap();
            let excluded = excluded
                .iter()
                .enumerate()
                .filter(|(_, x)| **x)
                .map(|(i, _)| CellId(i as u32))
                .collect();
            Case {
                grid,
                class: CLASSES[class],
                source: CellId(source as u32),
                dest: CellId(dest as u32),
                excluded,
            }
        })
}

/// Cheapest simple path by exhaustive search, for cross-checking.
fn brute_force(case: &Case, catalog: &TerrainCatalog) -> Option<u32> {
    fn walk(
        case: &Case,
        catalog: &TerrainCatalog,
        at: CellId,
        spent: u32,
        seen: &mut Vec<CellId>,
        best: &mut Option<u32>,
    ) {
        if at == case.dest {
            *best = Some(best.map_or(spent, |b| b.min(spent)));
            return;
        }
        for next in case.grid.neighbors(at) {
            if seen.contains(&next) || case.excluded.contains(&next) {
                continue;
            }
            let Ok(Some(step)) = entrance_cost(catalog, case.class, case.grid.get(next)) else {
                continue;
            };
            seen.push(next);
            walk(case, catalog, next, spent + step, seen, best);
            seen.pop();
        }
    }

    let mut best = None;
    walk(case, catalog, case.source, 0, &mut vec![case.source], &mut best);
    best
}

proptest! {
    #[test]
    fn path_cost_matches_distance(case in case(6, 6)) {
        let catalog = catalog();
        let paths = shortest_paths(&case.grid, &catalog, case.class, case.source, &case.excluded)
            .unwrap();
        let path = paths.path_to(case.dest);

        match paths.distance(case.dest) {
            Some(d) => {
                prop_assert_eq!(
                    path_cost(&case.grid, &catalog, case.class, &path).unwrap(),
                    Some(d)
                );
                if case.dest != case.source {
                    prop_assert_eq!(path.last(), Some(&case.dest));
                    prop_assert!(!path.contains(&case.source));
                }
            }
            None => prop_assert!(path.is_empty()),
        }
    }

    #[test]
    fn path_is_a_chain_of_neighbours(case in case(6, 6)) {
        let catalog = catalog();
        let path = shortest_paths(&case.grid, &catalog, case.class, case.source, &case.excluded)
            .unwrap()
            .path_to(case.dest);
        let mut prev = case.source;
        for &c in &path {
            prop_assert!(case.grid.are_adjacent(prev, c));
            prev = c;
        }
    }

    #[test]
    fn distance_is_minimal_over_simple_paths(case in case(3, 3)) {
        let catalog = catalog();
        let paths = shortest_paths(&case.grid, &catalog, case.class, case.source, &case.excluded)
            .unwrap();
        prop_assert_eq!(paths.distance(case.dest), brute_force(&case, &catalog));
    }

    #[test]
    fn excluded_cells_are_never_entered(case in case(6, 6)) {
        let catalog = catalog();
        let path = shortest_paths(&case.grid, &catalog, case.class, case.source, &case.excluded)
            .unwrap()
            .path_to(case.dest);
        prop_assert!(path.iter().all(|c| !case.excluded.contains(c)));
    }

    #[test]
    fn forbidden_terrain_is_never_traversed(case in case(6, 6)) {
        let catalog = catalog();
        let path = shortest_paths(&case.grid, &catalog, case.class, case.source, &case.excluded)
            .unwrap()
            .path_to(case.dest);
        for &c in &path {
            let cost = entrance_cost(&catalog, case.class, case.grid.get(c)).unwrap();
            prop_assert!(cost.is_some());
        }
    }

    #[test]
    fn source_to_itself_is_free(case in case(6, 6)) {
        let catalog = catalog();
        let paths = shortest_paths(&case.grid, &catalog, case.class, case.source, &case.excluded)
            .unwrap();
        prop_assert!(paths.path_to(case.source).is_empty());
        prop_assert_eq!(paths.distance(case.source), Some(0));
        prop_assert_eq!(path_cost(&case.grid, &catalog, case.class, &[]).unwrap(), Some(0));
    }
}
