//! Test fixtures and helpers.
//!
//! Hand-authored grids, generated reference maps and unit builders for
//! consistent testing.

use isle_core::config::GameConfig;
use isle_core::map_generation::{generate_map_with, MapConfig, Terrain, Tile, TileGrid};
use isle_core::math::Vec2;
use isle_core::rng::Mulberry32;
use isle_core::simulation::Simulation;
use isle_core::units::{Unit, UnitId, UnitSettings};

/// Seed used by the reference scenarios.
pub const REFERENCE_SEED: u32 = 12345;

/// Build a grid from ASCII rows: `#` is land, anything else is water.
///
/// Leading and trailing blank lines and per-line indentation are ignored,
/// so fixtures can be written as indented raw strings. Short rows are
/// padded with water.
///
/// ```
/// use isle_test_utils::fixtures::grid_from_ascii;
///
/// let grid = grid_from_ascii(
///     "
///     ~~~~
///     ~##~
///     ~~~~
///     ",
/// );
/// assert_eq!((grid.cols(), grid.rows()), (4, 3));
/// assert_eq!(grid.land_count(), 2);
/// ```
#[must_use]
pub fn grid_from_ascii(ascii: &str) -> TileGrid {
    let lines: Vec<&str> = ascii
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let rows = lines.len() as u32;
    let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;

    TileGrid::from_fn(cols, rows, |x, y| {
        let land = lines[y as usize].chars().nth(x as usize) == Some('#');
        if land {
            Tile::new(Terrain::Land, 1.0)
        } else {
            Tile::new(Terrain::Water, 0.0)
        }
    })
}

/// Render a grid back to `#`/`~` rows.
#[must_use]
pub fn grid_to_ascii(grid: &TileGrid) -> String {
    let mut out = String::with_capacity((grid.cols() as usize + 1) * grid.rows() as usize);
    for y in 0..grid.rows() {
        if let Some(row) = grid.row(y) {
            out.extend(row.iter().map(|t| if t.terrain.is_land() { '#' } else { '~' }));
        }
        out.push('\n');
    }
    out
}

/// All-land grid.
#[must_use]
pub fn open_field(cols: u32, rows: u32) -> TileGrid {
    TileGrid::from_fn(cols, rows, |_, _| Tile::new(Terrain::Land, 1.0))
}

/// Generate a map with default tuning and a freshly seeded generator.
#[must_use]
pub fn generated_map(cols: u32, rows: u32, seed: u32) -> TileGrid {
    let mut rng = Mulberry32::new(seed);
    generate_map_with(&MapConfig::new(cols, rows).with_seed(seed), &mut rng)
}

/// The 72×72 reference map for [`REFERENCE_SEED`].
#[must_use]
pub fn reference_map() -> TileGrid {
    generated_map(72, 72, REFERENCE_SEED)
}

/// Idle unit with default stats at `(x, y)`.
#[must_use]
pub fn unit_at(id: u32, x: f64, y: f64) -> Unit {
    Unit::new(UnitId(id), Vec2::new(x, y), &UnitSettings::default())
}

/// Simulation on the reference seed with default config.
///
/// # Panics
///
/// Panics if the default config fails validation.
#[must_use]
pub fn reference_simulation() -> Simulation {
    Simulation::new(GameConfig::default()).expect("default config is valid")
}

/// Simulation on a hand-built grid, spawning with `seed`.
///
/// # Panics
///
/// Panics if the default config fails validation.
#[must_use]
pub fn simulation_on(grid: TileGrid, seed: u32) -> Simulation {
    let mut rng = Mulberry32::new(seed);
    Simulation::with_grid(GameConfig::default(), grid, &mut rng).expect("default config is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_round_trip() {
        let text = "~#~\n###\n~#~\n";
        assert_eq!(grid_to_ascii(&grid_from_ascii(text)), text);
    }

    #[test]
    fn test_ascii_pads_short_rows() {
        let grid = grid_from_ascii("###\n#\n");
        assert_eq!(grid.cols(), 3);
        assert!(!grid.is_land(2, 1));
    }

    #[test]
    fn test_reference_map_size() {
        let grid = reference_map();
        assert_eq!(grid.seed(), REFERENCE_SEED);
        assert_eq!(grid.tiles().len(), 72 * 72);
    }
}
