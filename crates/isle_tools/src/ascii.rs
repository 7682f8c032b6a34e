//! Top-down ASCII previews of generated maps.
//!
//! One character per tile: `#` land, `~` water, and the last digit of a
//! unit's id where a unit stands. No isometric skew, rows run north to
//! south.

use std::fmt;

use serde::Serialize;

use isle_core::map_generation::TileGrid;
use isle_core::units::Unit;

/// Character for a land tile.
pub const LAND_CHAR: char = '#';
/// Character for a water tile.
pub const WATER_CHAR: char = '~';

/// Summary numbers printed under a preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapStats {
    /// Map seed.
    pub seed: u32,
    /// Width in tiles.
    pub cols: u32,
    /// Height in tiles.
    pub rows: u32,
    /// Land tile count.
    pub land_tiles: usize,
    /// Water tile count.
    pub water_tiles: usize,
    /// Water as a percentage of all tiles.
    pub water_percent: f64,
    /// Units placed.
    pub units: usize,
}

impl MapStats {
    /// Measure a grid and its units.
    #[must_use]
    pub fn measure(grid: &TileGrid, units: &[Unit]) -> Self {
        Self {
            seed: grid.seed(),
            cols: grid.cols(),
            rows: grid.rows(),
            land_tiles: grid.land_count(),
            water_tiles: grid.water_count(),
            water_percent: grid.water_ratio() * 100.0,
            units: units.len(),
        }
    }
}

impl fmt::Display for MapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seed {} | {}x{} | land {} | water {} ({:.1}%) | units {}",
            self.seed,
            self.cols,
            self.rows,
            self.land_tiles,
            self.water_tiles,
            self.water_percent,
            self.units
        )
    }
}

fn unit_char(unit: &Unit) -> char {
    char::from_digit(unit.id.0 % 10, 10).unwrap_or('?')
}

/// Render the grid with units overlaid.
///
/// Units outside the grid are skipped. When two units share a tile the
/// later one in `units` is shown.
#[must_use]
pub fn render_map(grid: &TileGrid, units: &[Unit]) -> String {
    let cols = grid.cols() as usize;
    let mut cells: Vec<Vec<char>> = (0..grid.rows())
        .map(|y| {
            grid.row(y)
                .unwrap_or_default()
                .iter()
                .map(|t| if t.terrain.is_land() { LAND_CHAR } else { WATER_CHAR })
                .collect()
        })
        .collect();

    for unit in units {
        let (x, y) = unit.position.tile_index();
        if grid.in_bounds(x, y) {
            cells[y as usize][x as usize] = unit_char(unit);
        }
    }

    let mut out = String::with_capacity((cols + 1) * cells.len());
    for row in cells {
        out.extend(row);
        out.push('\n');
    }
    out
}
