//! Independent checks of generated-map guarantees.
//!
//! The connectivity check walks the grid with its own depth-first stack
//! rather than the generator's flood fill, so a bug there cannot hide
//! itself.

use isle_core::map_generation::TileGrid;

/// Measured map properties.
#[derive(Debug, Clone, PartialEq)]
pub struct MapReport {
    /// Water tiles / all tiles.
    pub water_ratio: f64,
    /// Land tiles not 4-connected to the centre tile.
    pub unreachable_land: usize,
    /// Whether the centre tile is land.
    pub center_is_land: bool,
    /// Allowed ratio error: two tiles' worth.
    pub ratio_tolerance: f64,
    /// Target ratio the map was generated for.
    pub target_ratio: f64,
}

impl MapReport {
    /// Problems found, empty when every guarantee holds.
    #[must_use]
    pub fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.center_is_land {
            out.push("centre tile is water".to_string());
        }
        if self.unreachable_land > 0 {
            out.push(format!(
                "{} land tiles unreachable from centre",
                self.unreachable_land
            ));
        }
        let error = (self.water_ratio - self.target_ratio).abs();
        if error >= self.ratio_tolerance {
            out.push(format!(
                "water ratio {:.4} off target {:.4} by {error:.5}",
                self.water_ratio, self.target_ratio
            ));
        }
        out
    }

    /// Panic with every violation listed.
    ///
    /// # Panics
    ///
    /// Panics if any guarantee is broken.
    pub fn assert_ok(&self) {
        let violations = self.violations();
        assert!(violations.is_empty(), "map invariants broken: {violations:?}");
    }
}

/// Count land tiles reachable from `(sx, sy)` through 4-neighbour land.
#[must_use]
pub fn reachable_land(grid: &TileGrid, sx: i64, sy: i64) -> usize {
    if !grid.is_land(sx, sy) {
        return 0;
    }
    let cols = i64::from(grid.cols());
    let mut seen = vec![false; grid.tiles().len()];
    let mut stack = vec![(sx, sy)];
    seen[(sy * cols + sx) as usize] = true;
    let mut count = 0;

    while let Some((x, y)) = stack.pop() {
        count += 1;
        for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
            if grid.is_land(nx, ny) {
                let idx = (ny * cols + nx) as usize;
                if !seen[idx] {
                    seen[idx] = true;
                    stack.push((nx, ny));
                }
            }
        }
    }
    count
}

/// Measure a grid against the generator's guarantees.
#[must_use]
pub fn check_map(grid: &TileGrid, target_ratio: f64) -> MapReport {
    let (cx, cy) = grid.center();
    let (cx, cy) = (i64::from(cx), i64::from(cy));
    let total = grid.tiles().len().max(1) as f64;
    MapReport {
        water_ratio: grid.water_ratio(),
        unreachable_land: grid.land_count() - reachable_land(grid, cx, cy),
        center_is_land: grid.is_land(cx, cy),
        ratio_tolerance: 2.0 / total,
        target_ratio,
    }
}
