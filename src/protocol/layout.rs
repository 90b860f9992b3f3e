//! Compact text notation for map layouts.
//!
//! One character per cell, rows separated by `/` (or newlines), row 0 first.
//! A `.` marks a coordinate with no cell, so sparse maps can be written too.
//!
//! | char | terrain     |
//! |------|-------------|
//! | `p`  | plains      |
//! | `w`  | water       |
//! | `m`  | mountains   |
//! | `d`  | desert      |
//! | `f`  | woods       |
//! | `s`  | swamp       |
//! | `b`  | base        |
//! | `h`  | harbour     |
//! | `r`  | repair shop |
//! | `a`  | airfield    |
//!
//! Example: `ppp/pmp/ppb` is a 3x3 map with a mountain in the middle and a
//! base in the bottom-right corner.

use std::collections::HashMap;

use rand::Rng;
use thiserror::Error;

use super::data::{MapData, TerrainData};
use crate::board::terrain::TerrainType;

/// Errors that can occur while parsing a layout string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("empty layout")]
    Empty,

    #[error("invalid terrain character '{ch}' at ({x},{y})")]
    InvalidTerrain { ch: char, x: i32, y: i32 },
}

/// Returns the terrain for a layout character. `None` for unknown characters.
pub fn terrain_from_char(c: char) -> Option<TerrainType> {
    match c {
        'p' => Some(TerrainType::Plains),
        'w' => Some(TerrainType::Water),
        'm' => Some(TerrainType::Mountains),
        'd' => Some(TerrainType::Desert),
        'f' => Some(TerrainType::Woods),
        's' => Some(TerrainType::Swamp),
        'b' => Some(TerrainType::Base),
        'h' => Some(TerrainType::Harbour),
        'r' => Some(TerrainType::RepairShop),
        'a' => Some(TerrainType::Airfield),
        _ => None,
    }
}

/// Returns the layout character for a terrain kind.
pub const fn terrain_char(t: TerrainType) -> char {
    match t {
        TerrainType::Plains => 'p',
        TerrainType::Water => 'w',
        TerrainType::Mountains => 'm',
        TerrainType::Desert => 'd',
        TerrainType::Woods => 'f',
        TerrainType::Swamp => 's',
        TerrainType::Base => 'b',
        TerrainType::Harbour => 'h',
        TerrainType::RepairShop => 'r',
        TerrainType::Airfield => 'a',
    }
}

/// Parses a layout string into map data.
///
/// Width is the length of the longest row, height the number of rows.
pub fn parse_layout(s: &str) -> Result<MapData, LayoutError> {
    let rows: Vec<&str> = s
        .split(&['/', '\n'][..])
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect();
    if rows.is_empty() {
        return Err(LayoutError::Empty);
    }

    let mut terrains = Vec::new();
    let mut width: u32 = 0;
    for (y, row) in rows.iter().enumerate() {
        let y = y as i32;
        let mut len: u32 = 0;
        for (x, ch) in row.chars().enumerate() {
            let x = x as i32;
            len += 1;
            if ch == '.' {
                continue;
            }
            let terrain = terrain_from_char(ch).ok_or(LayoutError::InvalidTerrain { ch, x, y })?;
            terrains.push(TerrainData { x, y, terrain });
        }
        width = width.max(len);
    }

    Ok(MapData {
        width,
        height: rows.len() as u32,
        terrains,
    })
}

/// Encodes map data in layout notation, rows joined by `/`.
pub fn encode_layout(map: &MapData) -> String {
    let by_coord: HashMap<(i32, i32), TerrainType> = map
        .terrains
        .iter()
        .map(|t| ((t.x, t.y), t.terrain))
        .collect();

    let mut rows = Vec::with_capacity(map.height as usize);
    for y in 0..map.height as i32 {
        let row: String = (0..map.width as i32)
            .map(|x| by_coord.get(&(x, y)).map_or('.', |&t| terrain_char(t)))
            .collect();
        rows.push(row);
    }
    rows.join("/")
}

/// Relative weights for random terrain generation.
const RANDOM_TERRAIN: [(TerrainType, u32); 6] = [
    (TerrainType::Plains, 10),
    (TerrainType::Woods, 3),
    (TerrainType::Mountains, 2),
    (TerrainType::Swamp, 1),
    (TerrainType::Desert, 1),
    (TerrainType::Water, 2),
];

/// Generates a dense random map. Bases are scattered with probability
/// `base_ratio`.
pub fn random_layout(width: u32, height: u32, base_ratio: f64, rng: &mut impl Rng) -> MapData {
    let total: u32 = RANDOM_TERRAIN.iter().map(|(_, w)| w).sum();
    let mut terrains = Vec::with_capacity((width * height) as usize);

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let terrain = if rng.gen_bool(base_ratio.clamp(0.0, 1.0)) {
                TerrainType::Base
            } else {
                let mut roll = rng.gen_range(0..total);
                let mut chosen = TerrainType::Plains;
                for &(t, w) in &RANDOM_TERRAIN {
                    if roll < w {
                        chosen = t;
                        break;
                    }
                    roll -= w;
                }
                chosen
            };
            terrains.push(TerrainData { x, y, terrain });
        }
    }

    MapData {
        width,
        height,
        terrains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn parses_dense_layout() {
        let map = parse_layout("ppp/pmp/ppb").unwrap();
        assert_eq!((map.width, map.height), (3, 3));
        assert_eq!(map.terrains.len(), 9);
        assert!(map.terrains.contains(&TerrainData {
            x: 1,
            y: 1,
            terrain: TerrainType::Mountains
        }));
        assert!(map.terrains.contains(&TerrainData {
            x: 2,
            y: 2,
            terrain: TerrainType::Base
        }));
    }

    #[test]
    fn newlines_and_holes() {
        let map = parse_layout("\n  pw.\n  .hp\n").unwrap();
        assert_eq!((map.width, map.height), (3, 2));
        assert_eq!(map.terrains.len(), 4);
        assert_eq!(encode_layout(&map), "pw./.hp");
    }

    #[test]
    fn rejects_bad_characters() {
        assert_eq!(
            parse_layout("pp/pz"),
            Err(LayoutError::InvalidTerrain { ch: 'z', x: 1, y: 1 })
        );
        assert_eq!(parse_layout("  / "), Err(LayoutError::Empty));
    }

    #[test]
    fn random_layout_is_dense_and_seeded() {
        let a = random_layout(8, 6, 0.1, &mut SmallRng::seed_from_u64(7));
        let b = random_layout(8, 6, 0.1, &mut SmallRng::seed_from_u64(7));
        assert_eq!(a.terrains.len(), 48);
        assert_eq!(a, b);
        assert!(!encode_layout(&a).contains('.'));
    }
}
