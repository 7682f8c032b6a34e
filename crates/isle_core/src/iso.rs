//! Isometric diamond projection between world tiles and screen pixels.
//!
//! The projection is the standard 2:1 diamond:
//!
//! ```text
//! sx = (tx - ty) * half_w + camera.x
//! sy = (tx + ty) * half_h + camera.y
//! ```
//!
//! [`IsoProjection::screen_to_tile`] is the exact algebraic inverse. The same
//! algebra drives the main view ([`IsoProjection::WORLD`]) and the minimap
//! ([`IsoProjection::MINIMAP`]), only the half-tile constants differ.
//!
//! # Example
//!
//! ```
//! use isle_core::camera::Camera;
//! use isle_core::iso::{screen_to_tile, tile_to_screen};
//! use isle_core::math::Vec2;
//!
//! let camera = Camera::new(400.0, 100.0);
//! let screen = tile_to_screen(Vec2::new(3.0, 5.0), camera);
//! let back = screen_to_tile(screen, camera);
//! assert!((back.x - 3.0).abs() < 1e-9 && (back.y - 5.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::math::Vec2;

/// Full tile width in pixels on the main view.
pub const TILE_WIDTH: f64 = 64.0;
/// Full tile height in pixels on the main view.
pub const TILE_HEIGHT: f64 = 32.0;
/// Half tile width on the main view.
pub const HALF_TILE_W: f64 = TILE_WIDTH / 2.0;
/// Half tile height on the main view.
pub const HALF_TILE_H: f64 = TILE_HEIGHT / 2.0;

/// Half-tile constants defining one diamond projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsoProjection {
    /// Half of the diamond width in pixels.
    pub half_w: f64,
    /// Half of the diamond height in pixels.
    pub half_h: f64,
}

impl IsoProjection {
    /// Main view projection (64×32 tiles).
    pub const WORLD: Self = Self {
        half_w: HALF_TILE_W,
        half_h: HALF_TILE_H,
    };

    /// Minimap projection (4×2 tiles).
    pub const MINIMAP: Self = Self {
        half_w: 2.0,
        half_h: 1.0,
    };

    /// Create a projection from half-tile constants.
    #[must_use]
    pub const fn new(half_w: f64, half_h: f64) -> Self {
        Self { half_w, half_h }
    }

    /// Linear part of the projection: world delta to pixel delta.
    #[inline]
    #[must_use]
    pub fn project_offset(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            (world.x - world.y) * self.half_w,
            (world.x + world.y) * self.half_h,
        )
    }

    /// Inverse of [`project_offset`](Self::project_offset): pixel delta to world delta.
    #[inline]
    #[must_use]
    pub fn unproject_offset(&self, pixels: Vec2) -> Vec2 {
        let u = pixels.x / self.half_w;
        let v = pixels.y / self.half_h;
        Vec2::new((u + v) * 0.5, (v - u) * 0.5)
    }

    /// Project a world point to screen pixels.
    #[inline]
    #[must_use]
    pub fn tile_to_screen(&self, tile: Vec2, camera: Camera) -> Vec2 {
        self.project_offset(tile) + camera.offset()
    }

    /// Map screen pixels back to a world point.
    #[inline]
    #[must_use]
    pub fn screen_to_tile(&self, screen: Vec2, camera: Camera) -> Vec2 {
        self.unproject_offset(screen - camera.offset())
    }
}

impl Default for IsoProjection {
    fn default() -> Self {
        Self::WORLD
    }
}

/// Project a world point onto the main view.
#[must_use]
pub fn tile_to_screen(tile: Vec2, camera: Camera) -> Vec2 {
    IsoProjection::WORLD.tile_to_screen(tile, camera)
}

/// Map a main-view screen point back to world coordinates.
#[must_use]
pub fn screen_to_tile(screen: Vec2, camera: Camera) -> Vec2 {
    IsoProjection::WORLD.screen_to_tile(screen, camera)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!(
            (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_origin_projects_to_camera() {
        let cam = Camera::new(120.0, -40.0);
        assert_close(tile_to_screen(Vec2::ZERO, cam), Vec2::new(120.0, -40.0));
    }

    #[test]
    fn test_axis_steps() {
        let cam = Camera::default();
        // +x walks down-right, +y walks down-left
        assert_close(tile_to_screen(Vec2::new(1.0, 0.0), cam), Vec2::new(32.0, 16.0));
        assert_close(tile_to_screen(Vec2::new(0.0, 1.0), cam), Vec2::new(-32.0, 16.0));
    }

    #[test]
    fn test_round_trip() {
        let cam = Camera::new(-731.25, 412.5);
        for &(x, y) in &[(0.0, 0.0), (36.5, 36.5), (-3.25, 71.9), (1e4, -2e3)] {
            let p = Vec2::new(x, y);
            assert_close(screen_to_tile(tile_to_screen(p, cam), cam), p);
        }
    }

    #[test]
    fn test_offset_inverse() {
        let proj = IsoProjection::MINIMAP;
        let d = Vec2::new(7.0, -3.0);
        assert_close(proj.unproject_offset(proj.project_offset(d)), d);
    }
}
