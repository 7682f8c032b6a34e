//! Units: spawning around a point and straight-line movement over land.
//!
//! Units are created once by [`spawn_units`] and mutated in place by
//! [`update_units`]. They are never destroyed here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::map_generation::TileGrid;
use crate::math::Vec2;
use crate::rng::RandomSource;

/// Maximum placement attempts for a spawn batch.
pub const SPAWN_MAX_ATTEMPTS: u32 = 2000;
/// Minimum spawn distance from the centre, in tiles.
pub const SPAWN_MIN_RADIUS: f64 = 2.0;
/// Spawn distance spread added to [`SPAWN_MIN_RADIUS`].
pub const SPAWN_RADIUS_SPREAD: f64 = 7.0;
/// Minimum distance between spawned units.
pub const SPAWN_SEPARATION: f64 = 0.6;
/// Units closer than this to their target snap onto it.
pub const ARRIVAL_EPSILON: f64 = 0.03;

const SPAWN_JITTER_MIN: f64 = 0.2;
const SPAWN_JITTER_SPAN: f64 = 0.6;

/// Stable unit identifier, 1-based in spawn order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// Stats applied to every spawned unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitSettings {
    /// Units to spawn at setup.
    pub count: u32,
    /// Movement speed in tiles per second.
    pub speed: f64,
    /// Selection radius in screen pixels.
    pub radius_px: f64,
    /// Hit points (display only).
    pub max_hp: u32,
    /// Attack value (display only).
    pub attack: u32,
    /// Armor value (display only).
    pub armor: u32,
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            count: 6,
            speed: 2.7,
            radius_px: 11.0,
            max_hp: 45,
            attack: 4,
            armor: 0,
        }
    }
}

impl UnitSettings {
    /// Collect validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.speed.is_finite() && self.speed > 0.0) {
            errors.push(format!("unit speed must be positive, got {}", self.speed));
        }
        if !(self.radius_px.is_finite() && self.radius_px > 0.0) {
            errors.push(format!(
                "unit radius must be positive, got {}",
                self.radius_px
            ));
        }
        if self.max_hp == 0 {
            errors.push("unit max_hp must be positive".to_string());
        }
        errors
    }
}

/// A unit on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Stable identifier.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Continuous world position in tile units.
    pub position: Vec2,
    /// Move target, `None` when idle.
    pub target: Option<Vec2>,
    /// Tiles per second.
    pub speed: f64,
    /// Selection radius in pixels.
    pub radius_px: f64,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Attack value.
    pub attack: u32,
    /// Armor value.
    pub armor: u32,
}

impl Unit {
    /// Create an idle unit at `position` with the given stats.
    #[must_use]
    pub fn new(id: UnitId, position: Vec2, settings: &UnitSettings) -> Self {
        Self {
            id,
            name: format!("Militia {}", id.0),
            position,
            target: None,
            speed: settings.speed,
            radius_px: settings.radius_px,
            hp: settings.max_hp,
            max_hp: settings.max_hp,
            attack: settings.attack,
            armor: settings.armor,
        }
    }

    /// Whether the unit has a pending move target.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.target.is_some()
    }
}

/// Spawn up to `count` units with default stats on land around `center`.
///
/// See [`spawn_units_with`].
pub fn spawn_units(
    grid: &TileGrid,
    center: Vec2,
    count: u32,
    rng: &mut dyn RandomSource,
) -> Vec<Unit> {
    spawn_units_with(grid, center, count, &UnitSettings::default(), rng)
}

/// Spawn up to `count` units on land between 2 and 9 tiles from `center`.
///
/// Each attempt samples a polar offset, rejects tiles that are out of
/// bounds or water, jitters inside the tile and rejects points closer
/// than [`SPAWN_SEPARATION`] to an already placed unit. Stops after
/// [`SPAWN_MAX_ATTEMPTS`], so fewer units than requested is possible.
pub fn spawn_units_with(
    grid: &TileGrid,
    center: Vec2,
    count: u32,
    settings: &UnitSettings,
    rng: &mut dyn RandomSource,
) -> Vec<Unit> {
    let mut spawned: Vec<Unit> = Vec::with_capacity(count as usize);
    let mut attempts = 0;

    while spawned.len() < count as usize && attempts < SPAWN_MAX_ATTEMPTS {
        attempts += 1;
        let angle = rng.next_f64() * std::f64::consts::TAU;
        let radius = SPAWN_MIN_RADIUS + rng.next_f64() * SPAWN_RADIUS_SPREAD;
        let tx = (center.x + angle.cos() * radius).floor();
        let ty = (center.y + angle.sin() * radius).floor();
        if !grid.is_land(tx as i64, ty as i64) {
            continue;
        }

        let candidate = Vec2::new(
            tx + SPAWN_JITTER_MIN + rng.next_f64() * SPAWN_JITTER_SPAN,
            ty + SPAWN_JITTER_MIN + rng.next_f64() * SPAWN_JITTER_SPAN,
        );
        if spawned
            .iter()
            .any(|u| u.position.distance(candidate) < SPAWN_SEPARATION)
        {
            continue;
        }

        let id = UnitId(spawned.len() as u32 + 1);
        spawned.push(Unit::new(id, candidate, settings));
    }

    if spawned.len() < count as usize {
        tracing::warn!(
            requested = count,
            spawned = spawned.len(),
            attempts,
            "Spawn attempts exhausted"
        );
    } else {
        tracing::debug!(spawned = spawned.len(), attempts, "Units spawned");
    }

    spawned
}

/// Assign a shared move target to every unit whose id is in `ids`.
///
/// Returns the number of units ordered.
pub fn assign_move_target<'a>(
    units: &mut [Unit],
    ids: impl IntoIterator<Item = &'a UnitId>,
    target: Vec2,
) -> usize {
    let mut ordered = 0;
    for id in ids {
        if let Some(unit) = units.iter_mut().find(|u| u.id == *id) {
            unit.target = Some(target);
            ordered += 1;
        }
    }
    ordered
}

/// Advance every moving unit by `dt` seconds.
///
/// Units walk straight toward their target at `speed * dt`. A step that
/// reaches or passes the target lands exactly on it and clears the target.
/// A step whose destination tile is not land clears the target and leaves
/// the unit where it was.
pub fn update_units(units: &mut [Unit], grid: &TileGrid, dt: f64) {
    for unit in units.iter_mut() {
        let Some(target) = unit.target else {
            continue;
        };

        let to_target = target - unit.position;
        let dist = to_target.length();
        if dist < ARRIVAL_EPSILON {
            unit.position = target;
            unit.target = None;
            continue;
        }

        let step = unit.speed * dt;
        let arrives = step >= dist;
        let next = if arrives {
            target
        } else {
            unit.position + to_target * (step / dist)
        };

        if !grid.is_land_at(next) {
            tracing::trace!(unit = %unit.id, x = next.x, y = next.y, "Move blocked");
            unit.target = None;
            continue;
        }

        unit.position = next;
        if arrives {
            unit.target = None;
        }
    }
}

/// Units in back-to-front draw order, sorted by `x + y`.
#[must_use]
pub fn draw_order(units: &[Unit]) -> Vec<&Unit> {
    let mut sorted: Vec<&Unit> = units.iter().collect();
    sorted.sort_by(|a, b| {
        let da = a.position.x + a.position.y;
        let db = b.position.x + b.position.y;
        da.total_cmp(&db)
    });
    sorted
}

/// Find a unit by id.
#[must_use]
pub fn find_unit(units: &[Unit], id: UnitId) -> Option<&Unit> {
    units.iter().find(|u| u.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_generation::{Terrain, Tile};
    use crate::rng::Mulberry32;

    fn open_field(size: u32) -> TileGrid {
        TileGrid::from_fn(size, size, |_, _| Tile::new(Terrain::Land, 1.0))
    }

    /// Land everywhere except a water column at x = `wall`.
    fn field_with_wall(size: u32, wall: u32) -> TileGrid {
        TileGrid::from_fn(size, size, |x, _| {
            if x == wall {
                Tile::new(Terrain::Water, 0.0)
            } else {
                Tile::new(Terrain::Land, 1.0)
            }
        })
    }

    fn unit_at(id: u32, x: f64, y: f64) -> Unit {
        Unit::new(UnitId(id), Vec2::new(x, y), &UnitSettings::default())
    }

    #[test]
    fn test_unit_id_display() {
        assert_eq!(UnitId(3).to_string(), "unit-3");
    }

    #[test]
    fn test_new_unit_stats() {
        let unit = unit_at(2, 1.0, 1.0);
        assert_eq!(unit.name, "Militia 2");
        assert_eq!(unit.hp, 45);
        assert_eq!(unit.max_hp, 45);
        assert_eq!(unit.attack, 4);
        assert!(!unit.is_moving());
    }

    #[test]
    fn test_spawn_on_open_field() {
        let grid = open_field(40);
        let mut rng = Mulberry32::new(7);
        let units = spawn_units(&grid, Vec2::new(20.0, 20.0), 6, &mut rng);
        assert_eq!(units.len(), 6);
        for (i, unit) in units.iter().enumerate() {
            assert_eq!(unit.id, UnitId(i as u32 + 1));
            let d = unit.position.distance(Vec2::new(20.0, 20.0));
            assert!(d < 11.0, "spawned too far: {d}");
            assert!(grid.is_land_at(unit.position));
        }
        for a in &units {
            for b in &units {
                if a.id != b.id {
                    assert!(a.position.distance(b.position) >= SPAWN_SEPARATION);
                }
            }
        }
    }

    #[test]
    fn test_spawn_soft_fails_on_water() {
        let grid = TileGrid::from_fn(30, 30, |_, _| Tile::new(Terrain::Water, 0.0));
        let mut rng = Mulberry32::new(1);
        let units = spawn_units(&grid, Vec2::new(15.0, 15.0), 4, &mut rng);
        assert!(units.is_empty());
    }

    #[test]
    fn test_spawn_zero_requested() {
        let grid = open_field(20);
        let mut rng = Mulberry32::new(1);
        let before = rng.clone();
        assert!(spawn_units(&grid, Vec2::new(10.0, 10.0), 0, &mut rng).is_empty());
        assert_eq!(rng, before);
    }

    #[test]
    fn test_move_arrives_and_clears_target() {
        let grid = open_field(20);
        let mut units = vec![unit_at(1, 5.2, 5.3)];
        let target = Vec2::new(9.5, 5.5);
        units[0].target = Some(target);

        let dist = units[0].position.distance(target);
        let ticks = (dist / 2.7 / 0.05).ceil() as usize;
        for _ in 0..ticks {
            update_units(&mut units, &grid, 0.05);
        }
        assert!(units[0].position.distance(target) < 1e-9);
        assert!(units[0].target.is_none());
    }

    #[test]
    fn test_move_within_epsilon_snaps() {
        let grid = open_field(10);
        let mut units = vec![unit_at(1, 3.5, 3.5)];
        units[0].target = Some(Vec2::new(3.51, 3.5));
        update_units(&mut units, &grid, 0.0);
        assert_eq!(units[0].position, Vec2::new(3.51, 3.5));
        assert!(units[0].target.is_none());
    }

    #[test]
    fn test_move_blocked_by_water_stops() {
        let grid = field_with_wall(20, 8);
        let mut units = vec![unit_at(1, 6.5, 4.5)];
        units[0].target = Some(Vec2::new(12.5, 4.5));
        for _ in 0..100 {
            update_units(&mut units, &grid, 0.05);
        }
        let unit = &units[0];
        assert!(unit.target.is_none());
        assert!(unit.position.x < 8.0);
        assert!(grid.is_land_at(unit.position));
    }

    #[test]
    fn test_idle_units_do_not_move() {
        let grid = open_field(10);
        let mut units = vec![unit_at(1, 2.5, 2.5)];
        update_units(&mut units, &grid, 0.05);
        assert_eq!(units[0].position, Vec2::new(2.5, 2.5));
    }

    #[test]
    fn test_assign_move_target_shared() {
        let mut units = vec![unit_at(1, 1.0, 1.0), unit_at(2, 2.0, 2.0), unit_at(3, 3.0, 3.0)];
        let target = Vec2::new(5.5, 5.5);
        let ordered = assign_move_target(&mut units, &[UnitId(1), UnitId(3), UnitId(9)], target);
        assert_eq!(ordered, 2);
        assert_eq!(units[0].target, Some(target));
        assert_eq!(units[1].target, None);
        assert_eq!(units[2].target, Some(target));
    }

    #[test]
    fn test_draw_order_back_to_front() {
        let units = vec![unit_at(1, 5.0, 5.0), unit_at(2, 1.0, 2.0), unit_at(3, 0.5, 9.0)];
        let ids: Vec<u32> = draw_order(&units).iter().map(|u| u.id.0).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_settings_validation() {
        assert!(UnitSettings::default().validate().is_empty());
        let bad = UnitSettings {
            speed: 0.0,
            radius_px: -1.0,
            max_hp: 0,
            ..UnitSettings::default()
        };
        assert_eq!(bad.validate().len(), 3);
    }
}
