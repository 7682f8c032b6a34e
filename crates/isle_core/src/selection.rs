//! Unit picking, selection set and move orders.
//!
//! Picking works in screen space: each unit's world position is projected
//! and lifted to a sprite anchor, then tested against a click radius or a
//! drag rectangle.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Viewport};
use crate::error::{GameError, Result};
use crate::iso::{screen_to_tile, tile_to_screen, HALF_TILE_H};
use crate::map_generation::TileGrid;
use crate::math::{Rect, Vec2};
use crate::units::{assign_move_target, Unit, UnitId};

/// Extra pixels added to a unit's radius for point picks.
pub const PICK_TOLERANCE_PX: f64 = 3.0;
/// Vertical lift from the tile projection to the sprite anchor.
pub const ANCHOR_LIFT_PX: f64 = 12.0;
/// Pointer travel that turns a click into a drag.
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 4.0;

/// Screen anchor used for hit-testing a unit.
#[must_use]
pub fn unit_screen_anchor(unit: &Unit, camera: Camera) -> Vec2 {
    let p = tile_to_screen(unit.position, camera);
    Vec2::new(p.x, p.y + HALF_TILE_H - ANCHOR_LIFT_PX)
}

/// Closest unit whose anchor is within `radius + tolerance` of `point`.
#[must_use]
pub fn pick_unit_at_point(units: &[Unit], camera: Camera, point: Vec2) -> Option<&Unit> {
    let mut best: Option<(&Unit, f64)> = None;
    for unit in units {
        let d = unit_screen_anchor(unit, camera).distance(point);
        if d > unit.radius_px + PICK_TOLERANCE_PX {
            continue;
        }
        let closer = match best {
            Some((_, best_d)) => d < best_d,
            None => true,
        };
        if closer {
            best = Some((unit, d));
        }
    }
    best.map(|(unit, _)| unit)
}

/// Every unit whose anchor lies inside `rect`.
#[must_use]
pub fn pick_units_in_rect(units: &[Unit], camera: Camera, rect: Rect) -> Vec<&Unit> {
    units
        .iter()
        .filter(|u| rect.contains(unit_screen_anchor(u, camera)))
        .collect()
}

/// Selected unit ids plus the focused unit shown in detail.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    selected: BTreeSet<UnitId>,
    focused: Option<UnitId>,
}

impl Selection {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &UnitId> {
        self.selected.iter()
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.selected.contains(&id)
    }

    /// Number of selected units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Focused unit, if any.
    #[must_use]
    pub const fn focused(&self) -> Option<UnitId> {
        self.focused
    }

    /// Drop every selected unit and the focus.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.focused = None;
    }

    /// Add a unit to the selection.
    pub fn insert(&mut self, id: UnitId) {
        self.selected.insert(id);
    }

    /// Keep the focus if it is still selected, else fall back to the first
    /// selected unit in `units` order.
    pub fn sync_focus(&mut self, units: &[Unit]) {
        if self.focused.is_some_and(|id| self.selected.contains(&id)) {
            return;
        }
        self.focused = units
            .iter()
            .map(|u| u.id)
            .find(|id| self.selected.contains(id));
    }

    /// Focus a selected unit.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownUnit`] if no unit has `id`,
    /// [`GameError::UnitNotSelected`] if it exists but is not selected.
    pub fn focus(&mut self, id: UnitId, units: &[Unit]) -> Result<()> {
        if !units.iter().any(|u| u.id == id) {
            return Err(GameError::UnknownUnit(id));
        }
        if !self.selected.contains(&id) {
            return Err(GameError::UnitNotSelected(id));
        }
        self.focused = Some(id);
        Ok(())
    }
}

/// Pointer press/drag state.
///
/// The drag start is stored in world space so the rectangle stays
/// anchored to the map while the camera scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    /// World point under the pointer at press time.
    pub start_world: Vec2,
    /// Screen point at press time.
    pub start_screen: Vec2,
    /// Latest pointer position, clamped to the game viewport.
    pub current: Vec2,
    /// Whether travel has exceeded the drag threshold.
    pub dragging: bool,
}

impl DragState {
    /// Start tracking a press at `screen`.
    #[must_use]
    pub fn begin(screen: Vec2, camera: Camera) -> Self {
        Self {
            start_world: screen_to_tile(screen, camera),
            start_screen: screen,
            current: screen,
            dragging: false,
        }
    }

    /// Record pointer movement.
    pub fn update(&mut self, screen: Vec2, viewport: &Viewport, threshold_px: f64) {
        self.current = viewport.clamp_point(screen);
        if !self.dragging && self.current.distance(self.start_screen) >= threshold_px {
            self.dragging = true;
        }
    }

    /// Drag rectangle in screen space under the current camera.
    #[must_use]
    pub fn rect(&self, camera: Camera) -> Rect {
        Rect::from_corners(tile_to_screen(self.start_world, camera), self.current)
    }
}

/// Finish a press: clear the selection, apply a rectangle or point pick,
/// then re-sync the focus.
pub fn release_selection(
    selection: &mut Selection,
    drag: &DragState,
    units: &[Unit],
    camera: Camera,
) {
    selection.clear();
    if drag.dragging {
        for unit in pick_units_in_rect(units, camera, drag.rect(camera)) {
            selection.insert(unit.id);
        }
    } else if let Some(unit) = pick_unit_at_point(units, camera, drag.current) {
        selection.insert(unit.id);
    }
    selection.sync_focus(units);
    tracing::debug!(selected = selection.len(), drag = drag.dragging, "Selection updated");
}

/// Order every selected unit to the tile under `screen`.
///
/// Screen-space entry for [`issue_move_order_at`].
pub fn issue_move_order(
    units: &mut [Unit],
    selection: &Selection,
    grid: &TileGrid,
    camera: Camera,
    screen: Vec2,
) -> Option<Vec2> {
    issue_move_order_at(units, selection, grid, screen_to_tile(screen, camera))
}

/// Order every selected unit to the tile containing `world`.
///
/// The shared target is the tile centre. Returns `None` without changing
/// anything when nothing is selected, or the tile is out of bounds or water.
pub fn issue_move_order_at(
    units: &mut [Unit],
    selection: &Selection,
    grid: &TileGrid,
    world: Vec2,
) -> Option<Vec2> {
    if selection.is_empty() {
        return None;
    }
    let (tx, ty) = world.tile_index();
    if !grid.is_land(tx, ty) {
        return None;
    }
    let target = Vec2::new(tx as f64 + 0.5, ty as f64 + 0.5);
    let ordered = assign_move_target(units, selection.ids(), target);
    tracing::debug!(ordered, x = target.x, y = target.y, "Move order issued");
    Some(target)
}
