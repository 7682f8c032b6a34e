//! Procedural island generation.
//!
//! Generates a single landmass with:
//! - A noise-perturbed radial heightfield that sinks toward the border
//! - A land/water split at a configurable water ratio
//! - A protected land disc around the map centre for spawning
//! - Every land tile 4-connected to the centre tile
//!
//! # Pipeline
//!
//! 1. Heightfield synthesis (island falloff, coastline + ridge fbm, edge falloff)
//! 2. Threshold at the water-ratio percentile of sorted elevations
//! 3. Force land inside the protected radius
//! 4. Drop land not reachable from the centre (BFS)
//! 5. Balance the water count toward the target
//! 6. Force the centre tile to land
//!
//! The random source is consumed only for the four noise phase offsets, so
//! the same seed and the same seeded [`RandomSource`] give a bit-identical grid.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::math::Vec2;
use crate::noise::fbm;
use crate::rng::RandomSource;

/// Map configuration for procedural generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map width in tiles.
    pub cols: u32,
    /// Map height in tiles.
    pub rows: u32,
    /// Seed fed to the noise hash.
    pub seed: u32,
    /// Fraction of tiles that should end up as water.
    pub target_water_ratio: f64,
    /// Radius (tiles) around the centre that is always land.
    pub protected_radius: f64,
    /// Extra radius beyond `protected_radius` that balancing never floods.
    pub balance_buffer: f64,
    /// Sampling frequency of the coarse coastline noise.
    pub coastline_frequency: f64,
    /// Sampling frequency of the finer ridge noise.
    pub ridge_frequency: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cols: 72,
            rows: 72,
            seed: 12345,
            target_water_ratio: 0.5,
            protected_radius: 7.0,
            balance_buffer: 3.0,
            coastline_frequency: 0.09,
            ridge_frequency: 0.21,
        }
    }
}

impl MapConfig {
    /// Create a config with the given dimensions and default tuning.
    #[must_use]
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            ..Default::default()
        }
    }

    /// Create a small map (48x48 tiles).
    #[must_use]
    pub fn small() -> Self {
        Self::new(48, 48)
    }

    /// Create a medium map (72x72 tiles).
    #[must_use]
    pub fn medium() -> Self {
        Self::new(72, 72)
    }

    /// Create a large map (128x128 tiles).
    #[must_use]
    pub fn large() -> Self {
        Self::new(128, 128)
    }

    /// Set the noise seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Set the target water ratio.
    #[must_use]
    pub fn with_water_ratio(mut self, ratio: f64) -> Self {
        self.target_water_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Total tile count.
    #[must_use]
    pub const fn tile_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Number of water tiles the balancing pass aims for.
    #[must_use]
    pub fn target_water_tiles(&self) -> usize {
        (self.tile_count() as f64 * self.target_water_ratio).floor() as usize
    }

    /// Validate dimensions and tuning values.
    ///
    /// Returns a list of human-readable problems (empty when valid). The
    /// generator itself never checks these.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.cols == 0 || self.rows == 0 {
            errors.push(format!(
                "map dimensions must be positive, got {}x{}",
                self.cols, self.rows
            ));
        }
        if !(0.0..=1.0).contains(&self.target_water_ratio) {
            errors.push(format!(
                "target_water_ratio must be within [0, 1], got {}",
                self.target_water_ratio
            ));
        }
        if self.protected_radius < 0.0 || self.balance_buffer < 0.0 {
            errors.push("protected_radius and balance_buffer must not be negative".into());
        }
        if self.coastline_frequency <= 0.0 || self.ridge_frequency <= 0.0 {
            errors.push("noise frequencies must be positive".into());
        }
        errors
    }
}

/// Terrain class of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    /// Walkable ground.
    #[default]
    Land,
    /// Open water, impassable for units.
    Water,
}

impl Terrain {
    /// Returns true for land.
    #[must_use]
    pub const fn is_land(self) -> bool {
        matches!(self, Self::Land)
    }
}

/// One cell of the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Land or water.
    pub terrain: Terrain,
    /// Synthesised elevation (unitless, roughly `[-1, 1]`).
    pub elevation: f64,
}

impl Tile {
    /// Create a tile.
    #[must_use]
    pub const fn new(terrain: Terrain, elevation: f64) -> Self {
        Self { terrain, elevation }
    }
}

const NEIGHBORS_4: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Fixed-size `rows × cols` tile grid stored row-major.
///
/// Deserialization rejects a tile list whose length is not `cols * rows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTileGrid")]
pub struct TileGrid {
    cols: u32,
    rows: u32,
    seed: u32,
    tiles: Vec<Tile>,
}

/// Unchecked wire form of [`TileGrid`].
#[derive(Deserialize)]
struct RawTileGrid {
    cols: u32,
    rows: u32,
    seed: u32,
    tiles: Vec<Tile>,
}

impl TryFrom<RawTileGrid> for TileGrid {
    type Error = GameError;

    fn try_from(raw: RawTileGrid) -> Result<Self, Self::Error> {
        let expected = raw.cols as usize * raw.rows as usize;
        if raw.tiles.len() != expected {
            return Err(GameError::InvalidState(format!(
                "tile grid {}x{} needs {expected} tiles, got {}",
                raw.cols,
                raw.rows,
                raw.tiles.len()
            )));
        }
        Ok(Self {
            cols: raw.cols,
            rows: raw.rows,
            seed: raw.seed,
            tiles: raw.tiles,
        })
    }
}

impl TileGrid {
    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(cols: u32, rows: u32, mut f: impl FnMut(u32, u32) -> Tile) -> Self {
        let mut tiles = Vec::with_capacity(cols as usize * rows as usize);
        for y in 0..rows {
            for x in 0..cols {
                tiles.push(f(x, y));
            }
        }
        Self {
            cols,
            rows,
            seed: 0,
            tiles,
        }
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Seed the grid was generated with (0 for hand-built grids).
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tiles of row `y`.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[Tile]> {
        if y < self.rows {
            let start = self.index(y as usize, 0);
            Some(&self.tiles[start..start + self.cols as usize])
        } else {
            None
        }
    }

    #[inline]
    fn index(&self, y: usize, x: usize) -> usize {
        y * self.cols as usize + x
    }

    /// Check if signed tile coordinates are inside the grid.
    #[must_use]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.cols) && y < i64::from(self.rows)
    }

    /// Get the tile at signed coordinates, `None` if out of bounds.
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> Option<&Tile> {
        if self.in_bounds(x, y) {
            Some(&self.tiles[self.index(y as usize, x as usize)])
        } else {
            None
        }
    }

    fn get_mut(&mut self, x: i64, y: i64) -> Option<&mut Tile> {
        if self.in_bounds(x, y) {
            let idx = self.index(y as usize, x as usize);
            Some(&mut self.tiles[idx])
        } else {
            None
        }
    }

    /// Whether the tile at signed coordinates exists and is land.
    #[must_use]
    pub fn is_land(&self, x: i64, y: i64) -> bool {
        self.get(x, y).is_some_and(|t| t.terrain.is_land())
    }

    /// Tile containing a continuous world point.
    #[must_use]
    pub fn tile_at(&self, point: Vec2) -> Option<&Tile> {
        let (x, y) = point.tile_index();
        self.get(x, y)
    }

    /// Whether a world point lies inside a land tile's unit square.
    #[must_use]
    pub fn is_land_at(&self, point: Vec2) -> bool {
        self.tile_at(point).is_some_and(|t| t.terrain.is_land())
    }

    /// Geometric centre tile `(floor(cols/2), floor(rows/2))`.
    #[must_use]
    pub const fn center(&self) -> (u32, u32) {
        (self.cols / 2, self.rows / 2)
    }

    /// World point at the middle of the centre tile.
    #[must_use]
    pub fn center_point(&self) -> Vec2 {
        let (cx, cy) = self.center();
        Vec2::new(f64::from(cx) + 0.5, f64::from(cy) + 0.5)
    }

    /// Number of water tiles.
    #[must_use]
    pub fn water_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.terrain == Terrain::Water)
            .count()
    }

    /// Number of land tiles.
    #[must_use]
    pub fn land_count(&self) -> usize {
        self.tiles.len() - self.water_count()
    }

    /// Fraction of tiles that are water.
    #[must_use]
    pub fn water_ratio(&self) -> f64 {
        if self.tiles.is_empty() {
            return 0.0;
        }
        self.water_count() as f64 / self.tiles.len() as f64
    }

    /// Whether any 4-neighbour of `(x, y)` is land.
    #[must_use]
    pub fn has_land_neighbor(&self, x: i64, y: i64) -> bool {
        NEIGHBORS_4
            .iter()
            .any(|&(dx, dy)| self.is_land(x + dx, y + dy))
    }

    /// Breadth-first flood fill over land from `(x, y)`.
    ///
    /// Returns a row-major mask of reached tiles. Empty when the start is
    /// not land. Uses an explicit queue, so grid size never affects stack depth.
    #[must_use]
    pub fn connected_land(&self, x: i64, y: i64) -> Vec<bool> {
        let mut visited = vec![false; self.tiles.len()];
        if !self.is_land(x, y) {
            return visited;
        }

        let mut queue = VecDeque::new();
        visited[self.index(y as usize, x as usize)] = true;
        queue.push_back((x, y));

        while let Some((cx, cy)) = queue.pop_front() {
            for &(dx, dy) in &NEIGHBORS_4 {
                let (nx, ny) = (cx + dx, cy + dy);
                if !self.is_land(nx, ny) {
                    continue;
                }
                let idx = self.index(ny as usize, nx as usize);
                if !visited[idx] {
                    visited[idx] = true;
                    queue.push_back((nx, ny));
                }
            }
        }

        visited
    }
}

/// Intermediate elevation sample used when sorting candidates.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: i64,
    y: i64,
    elevation: f64,
}

/// Per-generation phase offsets drawn from the random source.
#[derive(Debug, Clone, Copy)]
struct NoisePhase {
    coast: Vec2,
    ridge: Vec2,
}

impl NoisePhase {
    const SPREAD: f64 = 1000.0;

    fn draw(rng: &mut dyn RandomSource) -> Self {
        let coast_x = rng.next_f64() * Self::SPREAD;
        let coast_y = rng.next_f64() * Self::SPREAD;
        let ridge_x = rng.next_f64() * Self::SPREAD;
        let ridge_y = rng.next_f64() * Self::SPREAD;
        Self {
            coast: Vec2::new(coast_x, coast_y),
            ridge: Vec2::new(ridge_x, ridge_y),
        }
    }
}

/// Generate a map with `cols × rows` tiles from `seed` and a random source.
///
/// Shorthand for [`generate_map_with`] using default tuning.
#[must_use]
pub fn generate_map(cols: u32, rows: u32, seed: u32, rng: &mut dyn RandomSource) -> TileGrid {
    generate_map_with(&MapConfig::new(cols, rows).with_seed(seed), rng)
}

/// Generate a map with the given configuration.
///
/// Grids smaller than about 15×15 are a degenerate case: the protected
/// disc covers most of the map and the water ratio may not be reachable.
#[must_use]
pub fn generate_map_with(config: &MapConfig, rng: &mut dyn RandomSource) -> TileGrid {
    let elevations = synthesize_heightfield(config, rng);
    let threshold = water_threshold(&elevations, config.target_water_ratio);

    let (cx, cy) = (i64::from(config.cols / 2), i64::from(config.rows / 2));
    let mut grid = TileGrid::from_fn(config.cols, config.rows, |x, y| {
        let elevation = elevations[y as usize * config.cols as usize + x as usize];
        let protected = distance_to(i64::from(x), i64::from(y), cx, cy) <= config.protected_radius;
        let terrain = if protected || elevation > threshold {
            Terrain::Land
        } else {
            Terrain::Water
        };
        Tile::new(terrain, elevation)
    });
    grid.seed = config.seed;

    let pruned = prune_disconnected_land(&mut grid, cx, cy);
    tracing::debug!(
        threshold,
        pruned,
        water = grid.water_count(),
        "Heightfield thresholded"
    );

    balance_water(&mut grid, config, cx, cy);

    if let Some(center) = grid.get_mut(cx, cy) {
        center.terrain = Terrain::Land;
    }

    tracing::debug!(
        seed = config.seed,
        water = grid.water_count(),
        target = config.target_water_tiles(),
        "Map generated"
    );

    grid
}

fn distance_to(x: i64, y: i64, cx: i64, cy: i64) -> f64 {
    ((x - cx) as f64).hypot((y - cy) as f64)
}

/// Normalised coordinate in `[-1, 1]` for index `i` of `n` cells.
fn normalized(i: u32, n: u32) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    f64::from(i) / f64::from(n - 1) * 2.0 - 1.0
}

fn synthesize_heightfield(config: &MapConfig, rng: &mut dyn RandomSource) -> Vec<f64> {
    let phase = NoisePhase::draw(rng);
    let mut elevations = Vec::with_capacity(config.tile_count());

    for y in 0..config.rows {
        for x in 0..config.cols {
            let nx = normalized(x, config.cols);
            let ny = normalized(y, config.rows);
            let (fx, fy) = (f64::from(x), f64::from(y));

            let island = 1.0 - nx.hypot(ny).clamp(0.0, 1.0).powf(1.25);
            let coastline = fbm(
                fx * config.coastline_frequency + phase.coast.x,
                fy * config.coastline_frequency + phase.coast.y,
                config.seed,
            );
            let ridge = fbm(
                fx * config.ridge_frequency + phase.ridge.x,
                fy * config.ridge_frequency + phase.ridge.y,
                config.seed,
            );
            let edge_falloff = nx.abs().max(ny.abs()).powf(1.45);

            elevations.push(
                island * 0.9 + (coastline - 0.5) * 0.5 + (ridge - 0.5) * 0.22
                    - edge_falloff * 0.58,
            );
        }
    }

    elevations
}

/// Elevation at the `floor(n * ratio)` percentile; `0.0` past the end.
fn water_threshold(elevations: &[f64], ratio: f64) -> f64 {
    let mut sorted = elevations.to_vec();
    sorted.sort_by(f64::total_cmp);
    let index = (sorted.len() as f64 * ratio).floor() as usize;
    sorted.get(index).copied().unwrap_or(0.0)
}

/// Turn land unreachable from `(cx, cy)` into water; returns how many flipped.
fn prune_disconnected_land(grid: &mut TileGrid, cx: i64, cy: i64) -> usize {
    let connected = grid.connected_land(cx, cy);
    let mut pruned = 0;
    for (tile, reached) in grid.tiles.iter_mut().zip(connected) {
        if tile.terrain.is_land() && !reached {
            tile.terrain = Terrain::Water;
            pruned += 1;
        }
    }
    pruned
}

/// Move the water count toward the target.
///
/// Too little water: flood the lowest land outside the protected disc plus
/// buffer, then re-prune anything that got cut off. Too much water: raise the
/// highest coastal water tiles (adjacent to land) until the target is met,
/// recomputing the coast each round so newly raised tiles extend it.
fn balance_water(grid: &mut TileGrid, config: &MapConfig, cx: i64, cy: i64) {
    let target = config.target_water_tiles();
    let mut water = grid.water_count();

    if water < target {
        let keep_radius = config.protected_radius + config.balance_buffer;
        let mut candidates = collect_candidates(grid, |_, x, y, tile| {
            tile.terrain.is_land() && distance_to(x, y, cx, cy) > keep_radius
        });
        candidates.sort_by(|a, b| a.elevation.total_cmp(&b.elevation));

        let mut flooded = 0;
        for c in candidates {
            if water >= target {
                break;
            }
            if let Some(tile) = grid.get_mut(c.x, c.y) {
                tile.terrain = Terrain::Water;
                water += 1;
                flooded += 1;
            }
        }

        let pruned = prune_disconnected_land(grid, cx, cy);
        water += pruned;
        tracing::debug!(flooded, pruned, water, target, "Flooded low land");
    }

    let mut raised = 0;
    while water > target {
        let mut candidates = collect_candidates(grid, |grid, x, y, tile| {
            tile.terrain == Terrain::Water && grid.has_land_neighbor(x, y)
        });
        if candidates.is_empty() {
            break;
        }
        candidates.sort_by(|a, b| b.elevation.total_cmp(&a.elevation));

        for c in candidates {
            if water <= target {
                break;
            }
            if let Some(tile) = grid.get_mut(c.x, c.y) {
                tile.terrain = Terrain::Land;
                water -= 1;
                raised += 1;
            }
        }
    }
    if raised > 0 {
        tracing::debug!(raised, water, target, "Raised coastal water");
    }
}

fn collect_candidates(
    grid: &TileGrid,
    mut accept: impl FnMut(&TileGrid, i64, i64, &Tile) -> bool,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    for y in 0..i64::from(grid.rows) {
        for x in 0..i64::from(grid.cols) {
            if let Some(tile) = grid.get(x, y) {
                if accept(grid, x, y, tile) {
                    out.push(Candidate {
                        x,
                        y,
                        elevation: tile.elevation,
                    });
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Mulberry32;

    fn generate(seed: u32) -> TileGrid {
        let mut rng = Mulberry32::new(seed);
        generate_map(72, 72, seed, &mut rng)
    }

    #[test]
    fn test_deserialize_checks_tile_count() {
        let ok: TileGrid =
            ron::from_str("(cols: 1, rows: 1, seed: 4, tiles: [(terrain: Land, elevation: 0.5)])")
                .unwrap();
        assert_eq!(ok.seed(), 4);
        assert!(ok.is_land(0, 0));

        let short = ron::from_str::<TileGrid>(
            "(cols: 3, rows: 2, seed: 0, tiles: [(terrain: Land, elevation: 0.5)])",
        );
        let err = short.unwrap_err().to_string();
        assert!(err.contains("needs 6 tiles, got 1"), "{err}");
    }

    #[test]
    fn test_generated_grid_survives_ron() {
        let grid = generate(11);
        let text = ron::to_string(&grid).unwrap();
        let back: TileGrid = ron::from_str(&text).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_default_config() {
        let config = MapConfig::default();
        assert_eq!(config.cols, 72);
        assert_eq!(config.rows, 72);
        assert_eq!(config.target_water_tiles(), 2592);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = MapConfig {
            cols: 0,
            target_water_ratio: 1.5,
            ..MapConfig::default()
        };
        assert_eq!(config.validate().len(), 2);
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = generate(12345);
        assert_eq!(grid.cols(), 72);
        assert_eq!(grid.rows(), 72);
        assert_eq!(grid.tiles().len(), 72 * 72);
        assert_eq!(grid.row(0).map(<[Tile]>::len), Some(72));
        assert!(grid.row(72).is_none());
    }

    #[test]
    fn test_center_is_land() {
        for seed in [1, 7, 12345, 0xFFFF_FFFF] {
            let grid = generate(seed);
            let (cx, cy) = grid.center();
            assert!(grid.is_land(i64::from(cx), i64::from(cy)), "seed {seed}");
        }
    }

    #[test]
    fn test_protected_disc_is_land() {
        let grid = generate(4242);
        let (cx, cy) = grid.center();
        for y in 0..72i64 {
            for x in 0..72i64 {
                if distance_to(x, y, i64::from(cx), i64::from(cy)) <= 7.0 {
                    assert!(grid.is_land(x, y), "({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_water_ratio_hits_target() {
        for seed in [3, 99, 12345, 777_777] {
            let grid = generate(seed);
            let total = grid.tiles().len() as f64;
            assert!(
                (grid.water_ratio() - 0.5).abs() < 2.0 / total,
                "seed {seed}: ratio {}",
                grid.water_ratio()
            );
        }
    }

    #[test]
    fn test_all_land_connected() {
        let grid = generate(2024);
        let (cx, cy) = grid.center();
        let reached = grid.connected_land(i64::from(cx), i64::from(cy));
        for (tile, hit) in grid.tiles().iter().zip(reached) {
            assert_eq!(tile.terrain.is_land(), hit);
        }
    }

    #[test]
    fn test_determinism() {
        let a = generate(42);
        let b = generate(42);
        assert_eq!(a.tiles().len(), b.tiles().len());
        for (t1, t2) in a.tiles().iter().zip(b.tiles()) {
            assert_eq!(t1.terrain, t2.terrain);
            assert_eq!(t1.elevation.to_bits(), t2.elevation.to_bits());
        }
    }

    #[test]
    fn test_rng_phase_changes_map() {
        // Same noise seed, different random source state
        let a = generate_map(72, 72, 5, &mut Mulberry32::new(1));
        let b = generate_map(72, 72, 5, &mut Mulberry32::new(2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_consumes_four_values() {
        let mut rng = Mulberry32::new(31);
        let _ = generate_map(20, 20, 31, &mut rng);
        let mut reference = Mulberry32::new(31);
        for _ in 0..4 {
            reference.next_f64();
        }
        assert_eq!(rng, reference);
    }

    #[test]
    fn test_water_threshold_percentile() {
        let values = [0.4, -0.2, 0.9, 0.1];
        assert_eq!(water_threshold(&values, 0.5), 0.4);
        assert_eq!(water_threshold(&values, 0.0), -0.2);
        assert_eq!(water_threshold(&values, 1.0), 0.0);
    }

    #[test]
    fn test_edges_mostly_water() {
        let grid = generate(8);
        let border_land = (0..72i64)
            .filter(|&i| grid.is_land(i, 0) || grid.is_land(0, i))
            .count();
        assert!(border_land < 20, "{border_land} border tiles are land");
    }

    #[test]
    fn test_tile_at_floors_points() {
        let grid = TileGrid::from_fn(3, 2, |x, y| {
            let terrain = if x == 2 && y == 1 {
                Terrain::Water
            } else {
                Terrain::Land
            };
            Tile::new(terrain, 0.0)
        });
        assert!(grid.is_land_at(Vec2::new(0.99, 0.99)));
        assert!(!grid.is_land_at(Vec2::new(2.5, 1.5)));
        assert!(!grid.is_land_at(Vec2::new(-0.01, 0.5)));
        assert!(grid.tile_at(Vec2::new(3.0, 0.0)).is_none());
    }
}
