//! Movement cost model.
//!
//! The entrance cost of a cell is the movement cost of its terrain for the
//! unit class, straight from the catalog. A forbidden terrain has no cost
//! (`None`), which the path finder treats as impassable, never as free.

use crate::board::hex::{Cell, CellId, HexGrid};
use crate::board::terrain::{ConfigurationError, TerrainCatalog, UnitClass};

/// Movement points `class` spends to enter `cell`.
///
/// Returns `Ok(None)` for a missing cell or a terrain the class cannot enter.
/// Fails only when the cell's terrain has no catalog entry.
pub fn entrance_cost(
    catalog: &TerrainCatalog,
    class: UnitClass,
    cell: Option<&Cell>,
) -> Result<Option<u32>, ConfigurationError> {
    match cell {
        Some(cell) => Ok(catalog.lookup(cell.terrain, class)?.movement),
        None => Ok(None),
    }
}

/// Entrance costs of every cell of one grid for one unit class, resolved
/// up front so the search loop never touches the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostTable {
    class: UnitClass,
    costs: Vec<Option<u32>>,
}

impl CostTable {
    pub fn build(
        grid: &HexGrid,
        catalog: &TerrainCatalog,
        class: UnitClass,
    ) -> Result<Self, ConfigurationError> {
        let costs = grid
            .iter()
            .map(|(_, cell)| entrance_cost(catalog, class, Some(cell)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CostTable { class, costs })
    }

    pub fn class(&self) -> UnitClass {
        self.class
    }

    /// Entrance cost of `cell`; `None` if forbidden or not in the grid.
    #[inline]
    pub fn get(&self, cell: CellId) -> Option<u32> {
        self.costs.get(cell.index()).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

/// Sum of entrance costs along `path` (the starting cell is not part of a
/// path). `None` if any cell on it is forbidden for `class` or the sum
/// overflows.
pub fn path_cost(
    grid: &HexGrid,
    catalog: &TerrainCatalog,
    class: UnitClass,
    path: &[CellId],
) -> Result<Option<u32>, ConfigurationError> {
    let mut total = 0u32;
    for &id in path {
        match entrance_cost(catalog, class, grid.get(id))? {
            Some(cost) => match total.checked_add(cost) {
                Some(sum) => total = sum,
                None => return Ok(None),
            },
            None => return Ok(None),
        }
    }
    Ok(Some(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::hex::Coord;
    use crate::board::terrain::{ClassCosts, TerrainSpec, TerrainType};

    fn catalog() -> TerrainCatalog {
        TerrainCatalog::new()
            .with_spec(TerrainType::Plains, TerrainSpec::movement(ClassCosts::uniform(1)))
            .with_spec(
                TerrainType::Mountains,
                TerrainSpec::movement(ClassCosts::forbidden().with(UnitClass::Soft, Some(3))),
            )
    }

    #[test]
    fn cost_by_class() {
        let catalog = catalog();
        let mountain = Cell::new(Coord::new(0, 0), TerrainType::Mountains);
        assert_eq!(
            entrance_cost(&catalog, UnitClass::Soft, Some(&mountain)),
            Ok(Some(3))
        );
        assert_eq!(
            entrance_cost(&catalog, UnitClass::Hard, Some(&mountain)),
            Ok(None)
        );
    }

    #[test]
    fn missing_cell_has_no_cost() {
        assert_eq!(entrance_cost(&catalog(), UnitClass::Soft, None), Ok(None));
    }

    #[test]
    fn unknown_terrain_fails() {
        let swamp = Cell::new(Coord::new(0, 0), TerrainType::Swamp);
        assert_eq!(
            entrance_cost(&catalog(), UnitClass::Soft, Some(&swamp)),
            Err(ConfigurationError::UnknownTerrain(TerrainType::Swamp))
        );
    }

    #[test]
    fn path_cost_sums_and_propagates_forbidden() {
        let catalog = catalog();
        let cells = vec![
            Cell::new(Coord::new(0, 0), TerrainType::Plains),
            Cell::new(Coord::new(1, 0), TerrainType::Mountains),
            Cell::new(Coord::new(2, 0), TerrainType::Plains),
        ];
        let grid = HexGrid::new(3, 1, cells).unwrap();
        let path: Vec<CellId> = vec![grid.cell_at(1, 0).unwrap(), grid.cell_at(2, 0).unwrap()];

        assert_eq!(path_cost(&grid, &catalog, UnitClass::Soft, &path), Ok(Some(4)));
        assert_eq!(path_cost(&grid, &catalog, UnitClass::Hard, &path), Ok(None));
        assert_eq!(path_cost(&grid, &catalog, UnitClass::Hard, &[]), Ok(Some(0)));

        let table = CostTable::build(&grid, &catalog, UnitClass::Hard).unwrap();
        assert_eq!(table.get(path[0]), None);
        assert_eq!(table.get(path[1]), Some(1));
        assert_eq!(table.get(CellId(99)), None);
    }

    #[test]
    fn path_cost_overflow_is_impassable() {
        let catalog = TerrainCatalog::new().with_spec(
            TerrainType::Plains,
            TerrainSpec::movement(ClassCosts::uniform(u32::MAX)),
        );
        let grid = HexGrid::filled(3, 1, TerrainType::Plains);
        let one = vec![grid.cell_at(1, 0).unwrap()];
        let two = vec![grid.cell_at(1, 0).unwrap(), grid.cell_at(2, 0).unwrap()];

        assert_eq!(path_cost(&grid, &catalog, UnitClass::Soft, &one), Ok(Some(u32::MAX)));
        assert_eq!(path_cost(&grid, &catalog, UnitClass::Soft, &two), Ok(None));
    }
}
