//! Camera offset and focus control.
//!
//! The focus is a world point and the single source of truth for where the
//! camera looks. Every frame the pixel-space [`Camera`] offset is re-derived
//! from it so the focus projects to the viewport centre.
//!
//! Panning converts a screen-space pixel offset into a focus delta through
//! the inverse of the diamond projection's linear part, so visual pan speed
//! is the same in every compass direction.

use serde::{Deserialize, Serialize};

use crate::iso::IsoProjection;
use crate::math::Vec2;

/// Focus is clamped to `[0, size - FOCUS_EDGE_EPSILON]` on each axis.
pub const FOCUS_EDGE_EPSILON: f64 = 0.001;

/// Screen-space pixel offset added to every projected point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    /// Horizontal offset in pixels.
    pub x: f64,
    /// Vertical offset in pixels.
    pub y: f64,
}

impl Camera {
    /// Create a camera offset.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset as a vector.
    #[must_use]
    pub const fn offset(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Screen region the world is drawn into.
///
/// `origin` is the top-left pixel; a HUD bar above the game area shows up
/// as a positive `origin.y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Top-left corner in screen pixels.
    pub origin: Vec2,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Viewport {
    /// Viewport anchored at the screen origin.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            origin: Vec2::ZERO,
            width,
            height,
        }
    }

    /// Set the top-left corner.
    #[must_use]
    pub const fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Centre point in screen pixels.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.origin.x + self.width * 0.5,
            self.origin.y + self.height * 0.5,
        )
    }

    /// The four corners: top-left, top-right, bottom-left, bottom-right.
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        let Vec2 { x, y } = self.origin;
        [
            Vec2::new(x, y),
            Vec2::new(x + self.width, y),
            Vec2::new(x, y + self.height),
            Vec2::new(x + self.width, y + self.height),
        ]
    }

    /// Clamp a screen point into the last pixel row/column of the viewport.
    #[must_use]
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        let max_x = self.origin.x.max(self.origin.x + self.width - 1.0);
        let max_y = self.origin.y.max(self.origin.y + self.height - 1.0);
        Vec2::new(p.x.clamp(self.origin.x, max_x), p.y.clamp(self.origin.y, max_y))
    }

    /// Whether a screen point lies inside the viewport.
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.origin.x
            && p.x <= self.origin.x + self.width
            && p.y >= self.origin.y
            && p.y <= self.origin.y + self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Settings for camera behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Pan speed in pixels per second.
    pub pan_speed: f64,
    /// Width of the edge scroll zone in pixels.
    pub edge_scroll_margin: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            pan_speed: 900.0,
            edge_scroll_margin: 10.0,
        }
    }
}

/// Held-key and pointer state latched by input callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanInput {
    /// Up arrow held.
    pub up: bool,
    /// Down arrow held.
    pub down: bool,
    /// Left arrow held.
    pub left: bool,
    /// Right arrow held.
    pub right: bool,
    /// Last known pointer position, if the pointer is over the window.
    pub pointer: Option<Vec2>,
}

impl PanInput {
    /// Normalised camera-offset direction for this frame.
    ///
    /// Positive components move the camera offset, so "up" scrolls the view
    /// toward the top of the map by pushing the scene down.
    #[must_use]
    pub fn direction(&self, screen: &Viewport, settings: &CameraSettings) -> Vec2 {
        let mut dir = Vec2::ZERO;

        if self.up {
            dir.y += 1.0;
        }
        if self.down {
            dir.y -= 1.0;
        }
        if self.left {
            dir.x += 1.0;
        }
        if self.right {
            dir.x -= 1.0;
        }

        if let Some(p) = self.pointer {
            let margin = settings.edge_scroll_margin;
            if p.x < margin {
                dir.x += 1.0;
            } else if p.x > screen.width - margin {
                dir.x -= 1.0;
            }
            if p.y < margin {
                dir.y += 1.0;
            } else if p.y > screen.height - margin {
                dir.y -= 1.0;
            }
        }

        dir.normalize_or_zero()
    }
}

/// Clamp a focus point into `[0, cols - ε] × [0, rows - ε]`.
pub fn clamp_focus_to_map(focus: &mut Vec2, cols: u32, rows: u32) {
    focus.x = focus.x.clamp(0.0, (f64::from(cols) - FOCUS_EDGE_EPSILON).max(0.0));
    focus.y = focus.y.clamp(0.0, (f64::from(rows) - FOCUS_EDGE_EPSILON).max(0.0));
}

/// Derive the camera offset that centres `focus` in `viewport`.
pub fn sync_camera_from_focus(camera: &mut Camera, focus: Vec2, viewport: &Viewport) {
    let projected = IsoProjection::WORLD.project_offset(focus);
    let center = viewport.center();
    camera.x = center.x - projected.x;
    camera.y = center.y - projected.y;
}

/// Move the focus by the world delta equivalent to a camera pixel offset.
///
/// A positive offset shifts the scene that way on screen, so the focus moves
/// the opposite way in world space.
pub fn apply_screen_offset_to_focus(focus: &mut Vec2, offset: Vec2) {
    *focus -= IsoProjection::WORLD.unproject_offset(offset);
}

/// Owns the focus point and the derived camera offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraController {
    focus: Vec2,
    camera: Camera,
    map_cols: u32,
    map_rows: u32,
    settings: CameraSettings,
}

impl CameraController {
    /// Create a controller focused on `focus` for a `cols × rows` map.
    #[must_use]
    pub fn new(focus: Vec2, map_cols: u32, map_rows: u32, settings: CameraSettings) -> Self {
        let mut controller = Self {
            focus,
            camera: Camera::default(),
            map_cols,
            map_rows,
            settings,
        };
        clamp_focus_to_map(&mut controller.focus, map_cols, map_rows);
        controller
    }

    /// Current focus point.
    #[must_use]
    pub const fn focus(&self) -> Vec2 {
        self.focus
    }

    /// Camera offset as of the last sync.
    #[must_use]
    pub const fn camera(&self) -> Camera {
        self.camera
    }

    /// Camera settings.
    #[must_use]
    pub const fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Advance one frame of panning.
    ///
    /// `screen` is the full window (edge scrolling is measured against it),
    /// `viewport` the game area the focus is centred in.
    pub fn update(&mut self, input: &PanInput, screen: &Viewport, viewport: &Viewport, dt: f64) {
        let dir = input.direction(screen, &self.settings);
        let step = dir * (self.settings.pan_speed * dt);
        apply_screen_offset_to_focus(&mut self.focus, step);
        self.clamp_and_sync(viewport);
    }

    /// Jump the focus to a world point, e.g. from a minimap click.
    pub fn set_focus(&mut self, focus: Vec2, viewport: &Viewport) {
        self.focus = focus;
        self.clamp_and_sync(viewport);
    }

    /// Re-derive the camera after a viewport resize.
    pub fn resize(&mut self, viewport: &Viewport) {
        self.clamp_and_sync(viewport);
    }

    fn clamp_and_sync(&mut self, viewport: &Viewport) {
        clamp_focus_to_map(&mut self.focus, self.map_cols, self.map_rows);
        sync_camera_from_focus(&mut self.camera, self.focus, viewport);
    }
}
