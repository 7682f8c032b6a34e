//! Simulation state and the per-frame tick.
//!
//! [`Simulation`] owns everything the core mutates: the generated grid,
//! units, selection, drag state, camera controller and latched input. The
//! presentation layer feeds input through `set_key` and the `pointer_*` methods,
//! calls [`Simulation::tick`] once per frame and reads state back through
//! the accessors.
//!
//! # Tick order
//!
//! 1. Clamp the real-time delta to `max_frame_dt`
//! 2. Pan the camera from latched keys and pointer
//! 3. Integrate unit movement
//!
//! # Example
//!
//! ```
//! use isle_core::config::GameConfig;
//! use isle_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(GameConfig::default()).unwrap();
//! sim.select_all();
//! let target = sim.grid().center_point();
//! sim.order_move_to(target);
//! sim.tick(1.0 / 60.0);
//! assert_eq!(sim.tick_count(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, CameraController, PanInput, Viewport};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::map_generation::{generate_map_with, TileGrid};
use crate::math::{Rect, Vec2};
use crate::minimap::{MinimapFrame, MinimapProjection, MinimapTexture};
use crate::rng::{Mulberry32, RandomSource};
use crate::selection::{
    issue_move_order, issue_move_order_at, release_selection, DragState, Selection,
};
use crate::units::{find_unit, spawn_units_with, update_units, Unit, UnitId};

/// Arrow key driving the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanKey {
    /// Scroll toward the top of the screen.
    Up,
    /// Scroll toward the bottom of the screen.
    Down,
    /// Scroll toward the left.
    Left,
    /// Scroll toward the right.
    Right,
}

/// Input latched by callbacks between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputState {
    /// Held arrow keys and last pointer position.
    pub pan: PanInput,
    /// Left button went down on the minimap and is still held.
    pub minimap_pan: bool,
}

/// What happened to units during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Delta actually integrated, after clamping.
    pub dt: f64,
    /// Units that reached their target.
    pub arrived: Vec<UnitId>,
    /// Units whose move was aborted by non-land ahead.
    pub blocked: Vec<UnitId>,
}

/// Focused-unit details for the HUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudUnit {
    /// Unit id.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Attack value.
    pub attack: u32,
    /// Armor value.
    pub armor: u32,
}

/// Read-only numbers shown by the HUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    /// Map seed.
    pub seed: u32,
    /// Water tiles as a percentage of all tiles.
    pub water_percent: f64,
    /// Number of units.
    pub unit_count: usize,
    /// Number of selected units.
    pub selected_count: usize,
    /// Focused unit, if any.
    pub focused: Option<HudUnit>,
}

impl fmt::Display for HudSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Seed: {} | Water: {:.1}% | Units: {} | Selected: {}",
            self.seed, self.water_percent, self.unit_count, self.selected_count
        )
    }
}

/// The whole mutable game state.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: GameConfig,
    grid: TileGrid,
    units: Vec<Unit>,
    selection: Selection,
    drag: Option<DragState>,
    camera: CameraController,
    minimap: MinimapTexture,
    screen: Viewport,
    viewport: Viewport,
    input: InputState,
    tick: u64,
}

impl Simulation {
    /// Generate a map from `config.map.seed` and spawn units on it.
    ///
    /// One [`Mulberry32`] seeded with the map seed drives generation and
    /// then spawning, so a seed reproduces the whole setup.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = Mulberry32::new(config.map.seed);
        let grid = generate_map_with(&config.map, &mut rng);
        Self::with_grid(config, grid, &mut rng)
    }

    /// Build a simulation on an existing grid, spawning units with `rng`.
    ///
    /// Units spawn around the centre tile's corner; the first one starts
    /// selected and focused, and the camera starts on the centre tile.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidConfig`] if `config` fails validation.
    pub fn with_grid(
        config: GameConfig,
        grid: TileGrid,
        rng: &mut dyn RandomSource,
    ) -> Result<Self> {
        config.validate()?;

        let (cx, cy) = grid.center();
        let spawn = Vec2::new(f64::from(cx), f64::from(cy));
        let units = spawn_units_with(&grid, spawn, config.units.count, &config.units, rng);

        let mut selection = Selection::new();
        if let Some(first) = units.first() {
            selection.insert(first.id);
        }
        selection.sync_focus(&units);

        let screen = Viewport::default();
        let mut camera = CameraController::new(
            grid.center_point(),
            grid.cols(),
            grid.rows(),
            config.camera.clone(),
        );
        camera.resize(&screen);

        let minimap = MinimapTexture::build(&grid);

        tracing::info!(
            seed = grid.seed(),
            cols = grid.cols(),
            rows = grid.rows(),
            water_ratio = grid.water_ratio(),
            units = units.len(),
            "Simulation ready"
        );

        Ok(Self {
            config,
            grid,
            units,
            selection,
            drag: None,
            camera,
            minimap,
            screen,
            viewport: screen,
            input: InputState::default(),
            tick: 0,
        })
    }

    /// Set the window size and the height of the bar above the game area.
    pub fn resize(&mut self, screen: Viewport, top_bar_px: f64) {
        let top = top_bar_px.clamp(0.0, screen.height);
        self.screen = screen;
        self.viewport = Viewport {
            origin: Vec2::new(screen.origin.x, screen.origin.y + top),
            width: screen.width,
            height: screen.height - top,
        };
        self.camera.resize(&self.viewport);
    }

    /// Advance one frame.
    ///
    /// `real_dt` is clamped to `[0, max_frame_dt]` so a long stall cannot
    /// carry a unit across a water tile in one step.
    pub fn tick(&mut self, real_dt: f64) -> TickEvents {
        let dt = if real_dt.is_finite() {
            real_dt.clamp(0.0, self.config.max_frame_dt)
        } else {
            0.0
        };

        self.camera
            .update(&self.input.pan, &self.screen, &self.viewport, dt);

        let moving: Vec<(usize, Vec2)> = self
            .units
            .iter()
            .enumerate()
            .filter_map(|(i, u)| u.target.map(|t| (i, t)))
            .collect();
        update_units(&mut self.units, &self.grid, dt);

        let mut events = TickEvents {
            dt,
            ..TickEvents::default()
        };
        for (i, target) in moving {
            let unit = &self.units[i];
            if unit.target.is_none() {
                if unit.position == target {
                    events.arrived.push(unit.id);
                } else {
                    events.blocked.push(unit.id);
                }
            }
        }

        self.tick += 1;

        #[cfg(feature = "debug-validation")]
        self.check_units_on_land();

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    #[cfg(feature = "debug-validation")]
    fn check_units_on_land(&self) {
        for unit in &self.units {
            if !self.grid.is_land_at(unit.position) {
                tracing::error!(unit = %unit.id, x = unit.position.x, y = unit.position.y, "Unit off land");
            }
        }
    }

    /// Record an arrow key press or release.
    pub fn set_key(&mut self, key: PanKey, pressed: bool) {
        let pan = &mut self.input.pan;
        match key {
            PanKey::Up => pan.up = pressed,
            PanKey::Down => pan.down = pressed,
            PanKey::Left => pan.left = pressed,
            PanKey::Right => pan.right = pressed,
        }
    }

    /// Record pointer movement.
    ///
    /// Continues a minimap pan or a selection drag when one is active.
    pub fn pointer_moved(&mut self, screen: Vec2) {
        self.input.pan.pointer = Some(screen);
        if self.input.minimap_pan {
            self.focus_from_minimap(screen);
        } else if let Some(drag) = self.drag.as_mut() {
            drag.update(screen, &self.viewport, self.config.drag_threshold_px);
        }
    }

    /// The pointer left the window; stops edge scrolling.
    pub fn pointer_left(&mut self) {
        self.input.pan.pointer = None;
    }

    /// Primary button pressed.
    ///
    /// On the minimap this jumps the camera and starts a minimap pan,
    /// elsewhere it starts a selection press.
    pub fn pointer_down(&mut self, screen: Vec2) {
        self.input.pan.pointer = Some(screen);
        if self.minimap_projection(None).contains(screen) {
            self.input.minimap_pan = true;
            self.drag = None;
            self.focus_from_minimap(screen);
            return;
        }
        self.drag = Some(DragState::begin(screen, self.camera.camera()));
    }

    /// Primary button released; finishes a minimap pan or applies the
    /// click/rectangle selection.
    pub fn pointer_up(&mut self) {
        if self.input.minimap_pan {
            self.input.minimap_pan = false;
            return;
        }
        if let Some(drag) = self.drag.take() {
            release_selection(&mut self.selection, &drag, &self.units, self.camera.camera());
        }
    }

    /// Secondary click: move the selection to the tile under `screen`.
    pub fn command_move(&mut self, screen: Vec2) -> Option<Vec2> {
        issue_move_order(
            &mut self.units,
            &self.selection,
            &self.grid,
            self.camera.camera(),
            screen,
        )
    }

    /// Move the selection to a world point's tile.
    ///
    /// Same rules as [`command_move`](Self::command_move) without the
    /// screen transform.
    pub fn order_move_to(&mut self, world: Vec2) -> Option<Vec2> {
        issue_move_order_at(&mut self.units, &self.selection, &self.grid, world)
    }

    /// Select every unit.
    pub fn select_all(&mut self) {
        for unit in &self.units {
            self.selection.insert(unit.id);
        }
        self.selection.sync_focus(&self.units);
    }

    /// Focus a selected unit from the HUD roster.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownUnit`] or [`GameError::UnitNotSelected`].
    pub fn focus_unit(&mut self, id: UnitId) -> Result<()> {
        self.selection.focus(id, &self.units)
    }

    /// Centre the camera on a world point.
    pub fn set_focus(&mut self, world: Vec2) {
        self.camera.set_focus(world, &self.viewport);
    }

    fn focus_from_minimap(&mut self, screen: Vec2) {
        let world = self.minimap_projection(None).screen_to_tile(screen);
        self.camera.set_focus(world, &self.viewport);
    }

    /// Current camera offset.
    #[must_use]
    pub const fn camera(&self) -> Camera {
        self.camera.camera()
    }

    /// Current camera focus.
    #[must_use]
    pub const fn focus(&self) -> Vec2 {
        self.camera.focus()
    }

    /// Generated tile grid.
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// All units in spawn order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Look up a unit by id.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownUnit`] if no unit has `id`.
    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        find_unit(&self.units, id).ok_or(GameError::UnknownUnit(id))
    }

    /// Selection set.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected units in spawn order.
    #[must_use]
    pub fn selected_units(&self) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|u| self.selection.contains(u.id))
            .collect()
    }

    /// Focused unit, if any.
    #[must_use]
    pub fn focused_unit(&self) -> Option<&Unit> {
        self.selection
            .focused()
            .and_then(|id| find_unit(&self.units, id))
    }

    /// Active press, if any.
    #[must_use]
    pub const fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    /// Screen rectangle of the selection box while dragging.
    #[must_use]
    pub fn drag_rect(&self) -> Option<Rect> {
        self.drag
            .filter(|d| d.dragging)
            .map(|d| d.rect(self.camera.camera()))
    }

    /// Cached minimap raster.
    #[must_use]
    pub const fn minimap_texture(&self) -> &MinimapTexture {
        &self.minimap
    }

    /// Minimap projection for `frame`, or the default bottom-right frame.
    #[must_use]
    pub fn minimap_projection(&self, frame: Option<MinimapFrame>) -> MinimapProjection {
        let frame = frame.unwrap_or_else(|| MinimapFrame::anchored(&self.screen));
        MinimapProjection::new(frame, &self.minimap)
    }

    /// Full window.
    #[must_use]
    pub const fn screen(&self) -> &Viewport {
        &self.screen
    }

    /// Game area below the top bar.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Latched input.
    #[must_use]
    pub const fn input(&self) -> &InputState {
        &self.input
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Fraction of tiles that are water.
    #[must_use]
    pub fn water_ratio(&self) -> f64 {
        self.grid.water_ratio()
    }

    /// Number of units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Numbers for the HUD.
    #[must_use]
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            seed: self.grid.seed(),
            water_percent: self.water_ratio() * 100.0,
            unit_count: self.units.len(),
            selected_count: self.selection.len(),
            focused: self.focused_unit().map(|u| HudUnit {
                id: u.id,
                name: u.name.clone(),
                hp: u.hp,
                max_hp: u.max_hp,
                attack: u.attack,
                armor: u.armor,
            }),
        }
    }

    /// Hash of tick, camera and unit state.
    ///
    /// Two simulations fed the same inputs hash equal.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);

        let focus = self.camera.focus();
        let camera = self.camera.camera();
        focus.x.to_bits().hash(&mut hasher);
        focus.y.to_bits().hash(&mut hasher);
        camera.x.to_bits().hash(&mut hasher);
        camera.y.to_bits().hash(&mut hasher);

        self.units.len().hash(&mut hasher);
        for unit in &self.units {
            unit.id.hash(&mut hasher);
            unit.position.x.to_bits().hash(&mut hasher);
            unit.position.y.to_bits().hash(&mut hasher);
            if let Some(target) = unit.target {
                target.x.to_bits().hash(&mut hasher);
                target.y.to_bits().hash(&mut hasher);
            }
        }

        for id in self.selection.ids() {
            id.hash(&mut hasher);
        }
        self.selection.focused().hash(&mut hasher);

        hasher.finish()
    }
}
