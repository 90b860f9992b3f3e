//! Hex cells and the sparse offset-row hex grid.
//!
//! Cells live in an arena indexed by `CellId`; a coordinate index maps
//! `(x, y)` to ids. Odd rows are shifted half a cell to the right, so the
//! neighbour offsets depend on the parity of `y`. Only cells the server
//! defined exist: neighbours that fall outside the mapping are dropped.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::faction::FactionId;
use super::terrain::TerrainType;

/// Offset-row coordinates of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Returns the coordinate one step away in `dir`, or `None` if it lies
    /// outside the `i32` range.
    pub const fn step(self, dir: Direction) -> Option<Coord> {
        let (dx, dy) = dir.offset(self.y);
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Coord { x, y }),
            _ => None,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// The six neighbour directions, in the order `neighbors` reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    NorthEast,
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
}

pub const ALL_DIRECTIONS: [Direction; 6] = [
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
];

impl Direction {
    /// The `(dx, dy)` offset of this direction from a cell on row `y`.
    pub const fn offset(self, y: i32) -> (i32, i32) {
        let odd = y.rem_euclid(2) == 1;
        match (self, odd) {
            (Direction::NorthEast, false) => (0, -1),
            (Direction::East, false) => (1, 0),
            (Direction::SouthEast, false) => (0, 1),
            (Direction::SouthWest, false) => (-1, 1),
            (Direction::West, false) => (-1, 0),
            (Direction::NorthWest, false) => (-1, -1),
            (Direction::NorthEast, true) => (1, -1),
            (Direction::East, true) => (1, 0),
            (Direction::SouthEast, true) => (1, 1),
            (Direction::SouthWest, true) => (0, 1),
            (Direction::West, true) => (-1, 0),
            (Direction::NorthWest, true) => (0, -1),
        }
    }
}

/// Index of a cell in its grid's arena. Only meaningful for the grid that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u32);

impl CellId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One location on the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub coord: Coord,
    pub terrain: TerrainType,
    /// Owner of a capturable cell; always `None` for other terrain.
    pub owner: Option<FactionId>,
}

impl Cell {
    pub fn new(coord: Coord, terrain: TerrainType) -> Self {
        Cell {
            coord,
            terrain,
            owner: None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ ({})", self.terrain, self.coord)
    }
}

/// A sparse hex grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    index: HashMap<Coord, CellId>,
}

impl HexGrid {
    /// Builds a grid from its cells. Cells are stored in row-major coordinate
    /// order so ids are stable for the same map. Returns the first duplicated
    /// coordinate as an error.
    pub fn new(width: u32, height: u32, mut cells: Vec<Cell>) -> Result<Self, Coord> {
        cells.sort_by_key(|c| (c.coord.y, c.coord.x));
        let mut index = HashMap::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            if index.insert(cell.coord, CellId(i as u32)).is_some() {
                return Err(cell.coord);
            }
        }
        Ok(HexGrid {
            width,
            height,
            cells,
            index,
        })
    }

    /// A dense `width` x `height` grid of one terrain kind.
    pub fn filled(width: u32, height: u32, terrain: TerrainType) -> Self {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(Cell::new(Coord::new(x, y), terrain));
            }
        }
        // Coordinates are unique by construction.
        match HexGrid::new(width, height, cells) {
            Ok(grid) => grid,
            Err(_) => unreachable!("dense grid has unique coordinates"),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of defined cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the id of the cell at `(x, y)`, if it exists.
    pub fn cell_at(&self, x: i32, y: i32) -> Option<CellId> {
        self.index.get(&Coord::new(x, y)).copied()
    }

    pub fn id_of(&self, coord: Coord) -> Option<CellId> {
        self.index.get(&coord).copied()
    }

    /// Returns the cell for an id issued by this grid.
    ///
    /// # Panics
    /// Panics if `id` came from a different, larger grid.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id.index())
    }

    /// Returns the coordinate of a cell issued by this grid.
    ///
    /// # Panics
    /// Panics if `id` came from a different, larger grid. Use [`HexGrid::get`]
    /// for ids of unknown origin.
    pub fn coord(&self, id: CellId) -> Coord {
        self.cells[id.index()].coord
    }

    /// Returns the existing neighbours of a cell in NE, E, SE, SW, W, NW order.
    /// Empty for an id this grid did not issue.
    pub fn neighbors(&self, id: CellId) -> Vec<CellId> {
        let Some(cell) = self.get(id) else {
            return Vec::new();
        };
        let coord = cell.coord;
        ALL_DIRECTIONS
            .iter()
            .filter_map(|&dir| coord.step(dir).and_then(|c| self.id_of(c)))
            .collect()
    }

    /// Whether two cells share an edge.
    pub fn are_adjacent(&self, a: CellId, b: CellId) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Iterates over all cell ids in arena order.
    pub fn ids(&self) -> impl Iterator<Item = CellId> + '_ {
        (0..self.cells.len() as u32).map(CellId)
    }

    /// Iterates over `(id, cell)` pairs in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (CellId(i as u32), c))
    }
}
