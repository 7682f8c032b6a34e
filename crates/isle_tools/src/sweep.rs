//! Parallel seed sweeps over the map generator.
//!
//! Each seed is generated on a rayon worker and checked for the three
//! generator guarantees: the water count matches the target, every land
//! tile is reachable from the centre, and the centre tile is land.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use isle_core::map_generation::{generate_map_with, MapConfig, TileGrid};
use isle_core::rng::Mulberry32;

/// Result of checking one seed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedReport {
    /// Seed checked.
    pub seed: u32,
    /// Measured water ratio.
    pub water_ratio: f64,
    /// Water tiles produced.
    pub water_tiles: usize,
    /// Water tiles the config asked for.
    pub target_water_tiles: usize,
    /// Land tiles not connected to the centre.
    pub unreachable_land: usize,
    /// Whether the centre tile is land.
    pub center_is_land: bool,
    /// Broken guarantees, empty when the map is good.
    pub violations: Vec<String>,
}

impl SeedReport {
    /// Check a generated grid against `config`.
    #[must_use]
    pub fn check(grid: &TileGrid, config: &MapConfig) -> Self {
        let (cx, cy) = grid.center();
        let (cx, cy) = (i64::from(cx), i64::from(cy));
        let reached = grid.connected_land(cx, cy).iter().filter(|r| **r).count();
        let unreachable_land = grid.land_count() - reached;
        let center_is_land = grid.is_land(cx, cy);
        let water_tiles = grid.water_count();
        let target_water_tiles = config.target_water_tiles();

        let mut violations = Vec::new();
        if !center_is_land {
            violations.push("centre tile is water".to_string());
        }
        if unreachable_land > 0 {
            violations.push(format!("{unreachable_land} land tiles cut off from centre"));
        }
        if water_tiles != target_water_tiles {
            violations.push(format!(
                "{water_tiles} water tiles, expected {target_water_tiles}"
            ));
        }

        Self {
            seed: grid.seed(),
            water_ratio: grid.water_ratio(),
            water_tiles,
            target_water_tiles,
            unreachable_land,
            center_is_land,
            violations,
        }
    }

    /// True when no guarantee is broken.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Aggregate over a sweep, printed as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    /// Map width.
    pub cols: u32,
    /// Map height.
    pub rows: u32,
    /// First seed.
    pub start_seed: u32,
    /// Maps generated.
    pub maps: usize,
    /// Maps with a violation.
    pub failures: usize,
    /// Lowest measured water ratio.
    pub min_water_ratio: f64,
    /// Highest measured water ratio.
    pub max_water_ratio: f64,
    /// Wall time for the whole sweep.
    pub duration_ms: u128,
    /// Reports for failing seeds only.
    pub failed: Vec<SeedReport>,
}

impl SweepSummary {
    /// True when every map passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures == 0
    }
}

/// Generate and check `count` consecutive seeds starting at `start_seed`.
///
/// `base` supplies dimensions and tuning; its seed is replaced per map.
/// Seeds wrap around `u32::MAX`.
#[must_use]
pub fn run_sweep(base: &MapConfig, start_seed: u32, count: u32) -> SweepSummary {
    let start = Instant::now();
    info!(
        start_seed,
        count,
        cols = base.cols,
        rows = base.rows,
        "Starting seed sweep"
    );

    let reports: Vec<SeedReport> = (0..count)
        .into_par_iter()
        .map(|i| {
            let seed = start_seed.wrapping_add(i);
            let config = base.clone().with_seed(seed);
            let mut rng = Mulberry32::new(seed);
            let grid = generate_map_with(&config, &mut rng);
            let report = SeedReport::check(&grid, &config);
            if report.passed() {
                debug!(seed, water_ratio = report.water_ratio, "Seed passed");
            } else {
                warn!(seed, violations = ?report.violations, "Seed failed");
            }
            report
        })
        .collect();

    let (min_water_ratio, max_water_ratio) = reports.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), r| (lo.min(r.water_ratio), hi.max(r.water_ratio)),
    );
    let failed: Vec<SeedReport> = reports.iter().filter(|r| !r.passed()).cloned().collect();

    let summary = SweepSummary {
        cols: base.cols,
        rows: base.rows,
        start_seed,
        maps: reports.len(),
        failures: failed.len(),
        min_water_ratio: if reports.is_empty() { 0.0 } else { min_water_ratio },
        max_water_ratio: if reports.is_empty() { 0.0 } else { max_water_ratio },
        duration_ms: start.elapsed().as_millis(),
        failed,
    };

    info!(
        maps = summary.maps,
        failures = summary.failures,
        duration_ms = summary.duration_ms,
        "Sweep complete"
    );
    summary
}
