//! Minimap: a small-scale diamond raster of the whole map and the mapping
//! between minimap pixels and world tiles.
//!
//! The raster is built once after generation. Each frame the presentation
//! layer asks for a [`MinimapProjection`] for where the minimap is drawn and
//! uses it for click-to-pan, unit markers and the camera indicator.

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Viewport};
use crate::iso::IsoProjection;
use crate::map_generation::{Terrain, TileGrid};
use crate::math::{Rect, Vec2};
use crate::units::{Unit, UnitId};

/// Half tile width on the minimap raster.
pub const MINIMAP_HALF_TILE_W: f64 = 2.0;
/// Half tile height on the minimap raster.
pub const MINIMAP_HALF_TILE_H: f64 = 1.0;

/// Terrain class of one minimap pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MinimapCell {
    /// Outside the map diamond.
    #[default]
    Outside,
    /// Land tile.
    Land,
    /// Water tile.
    Water,
}

/// Rasterised minimap, one [`MinimapCell`] per pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapTexture {
    width: u32,
    height: u32,
    origin_x: f64,
    cells: Vec<MinimapCell>,
}

impl MinimapTexture {
    /// Rasterise the whole grid.
    ///
    /// Every pixel centre is mapped back through the minimap projection and
    /// takes the class of the tile it lands in.
    #[must_use]
    pub fn build(grid: &TileGrid) -> Self {
        let span = f64::from(grid.cols() + grid.rows());
        let width = (span * MINIMAP_HALF_TILE_W + 2.0).ceil() as u32;
        let height = (span * MINIMAP_HALF_TILE_H + 2.0).ceil() as u32;
        let origin_x = f64::from(grid.rows()) * MINIMAP_HALF_TILE_W + 1.0;

        let mut texture = Self {
            width,
            height,
            origin_x,
            cells: Vec::with_capacity(width as usize * height as usize),
        };

        for py in 0..height {
            for px in 0..width {
                let world = texture.texture_to_tile(Vec2::new(
                    f64::from(px) + 0.5,
                    f64::from(py) + 0.5,
                ));
                let (tx, ty) = world.tile_index();
                let cell = match grid.get(tx, ty).map(|t| t.terrain) {
                    Some(Terrain::Land) => MinimapCell::Land,
                    Some(Terrain::Water) => MinimapCell::Water,
                    None => MinimapCell::Outside,
                };
                texture.cells.push(cell);
            }
        }

        tracing::debug!(width, height, "Minimap rasterised");
        texture
    }

    /// Raster width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Horizontal texture position of world point `(0, 0)`.
    #[must_use]
    pub const fn origin_x(&self) -> f64 {
        self.origin_x
    }

    /// Pixels in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[MinimapCell] {
        &self.cells
    }

    /// Pixel class at `(x, y)`.
    #[must_use]
    pub fn cell(&self, x: u32, y: u32) -> Option<MinimapCell> {
        if x < self.width && y < self.height {
            Some(self.cells[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Project a world point into texture pixels.
    #[must_use]
    pub fn tile_to_texture(&self, world: Vec2) -> Vec2 {
        IsoProjection::MINIMAP.tile_to_screen(world, self.camera())
    }

    /// Map texture pixels back to a world point.
    #[must_use]
    pub fn texture_to_tile(&self, texel: Vec2) -> Vec2 {
        IsoProjection::MINIMAP.screen_to_tile(texel, self.camera())
    }

    fn camera(&self) -> Camera {
        Camera::new(self.origin_x, 1.0)
    }
}

/// Where the minimap is drawn on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimapFrame {
    /// Left edge in screen pixels.
    pub x: f64,
    /// Top edge in screen pixels.
    pub y: f64,
    /// Outer width.
    pub width: f64,
    /// Outer height.
    pub height: f64,
    /// Inset between the frame and the drawn map.
    pub padding: f64,
}

impl MinimapFrame {
    /// Default outer width.
    pub const DEFAULT_WIDTH: f64 = 220.0;
    /// Default outer height.
    pub const DEFAULT_HEIGHT: f64 = 148.0;
    /// Default padding.
    pub const DEFAULT_PADDING: f64 = 4.0;
    /// Gap to the screen's bottom-right corner.
    pub const MARGIN: f64 = 12.0;

    /// Default-sized frame anchored to the bottom-right of `screen`.
    #[must_use]
    pub fn anchored(screen: &Viewport) -> Self {
        Self {
            x: screen.origin.x + screen.width - Self::DEFAULT_WIDTH - Self::MARGIN,
            y: screen.origin.y + screen.height - Self::DEFAULT_HEIGHT - Self::MARGIN,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            padding: Self::DEFAULT_PADDING,
        }
    }
}

/// Mapping between on-screen minimap pixels and world tiles for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimapProjection {
    /// Frame the projection was built for.
    pub frame: MinimapFrame,
    /// Inner (drawn) rectangle.
    pub inner: Rect,
    /// Texture width in pixels.
    pub texture_width: f64,
    /// Texture height in pixels.
    pub texture_height: f64,
    /// Texture position of world `(0, 0)`.
    pub origin_x: f64,
    /// Centre of the drawn diamond.
    pub diamond_center: Vec2,
    /// Half width of the drawn diamond.
    pub diamond_half_w: f64,
    /// Half height of the drawn diamond.
    pub diamond_half_h: f64,
}

impl MinimapProjection {
    /// Build the projection for `texture` drawn into `frame`.
    #[must_use]
    pub fn new(frame: MinimapFrame, texture: &MinimapTexture) -> Self {
        let inner = Rect {
            min_x: frame.x + frame.padding,
            min_y: frame.y + frame.padding,
            max_x: frame.x + frame.width - frame.padding,
            max_y: frame.y + frame.height - frame.padding,
        };
        Self {
            frame,
            inner,
            texture_width: f64::from(texture.width()),
            texture_height: f64::from(texture.height()),
            origin_x: texture.origin_x(),
            diamond_center: Vec2::new(
                inner.min_x + inner.width() * 0.5,
                inner.min_y + inner.height() * 0.5,
            ),
            diamond_half_w: inner.width() * 0.5,
            diamond_half_h: inner.height() * 0.5,
        }
    }

    fn texture_camera(&self) -> Camera {
        Camera::new(self.origin_x, 1.0)
    }

    /// Whether a screen point is inside the drawn diamond (L1 ball).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        if self.diamond_half_w <= 0.0 || self.diamond_half_h <= 0.0 {
            return false;
        }
        let nx = ((point.x - self.diamond_center.x) / self.diamond_half_w).abs();
        let ny = ((point.y - self.diamond_center.y) / self.diamond_half_h).abs();
        nx + ny <= 1.0
    }

    /// Map a screen point on the minimap to a world point.
    ///
    /// The point is clamped to the inner rectangle first.
    #[must_use]
    pub fn screen_to_tile(&self, point: Vec2) -> Vec2 {
        let norm_x = ((point.x - self.inner.min_x) / self.inner.width()).clamp(0.0, 1.0);
        let norm_y = ((point.y - self.inner.min_y) / self.inner.height()).clamp(0.0, 1.0);
        let texel = Vec2::new(norm_x * self.texture_width, norm_y * self.texture_height);
        IsoProjection::MINIMAP.screen_to_tile(texel, self.texture_camera())
    }

    /// Project a world point onto the on-screen minimap.
    #[must_use]
    pub fn tile_to_screen(&self, world: Vec2) -> Vec2 {
        let texel = IsoProjection::MINIMAP.tile_to_screen(world, self.texture_camera());
        Vec2::new(
            self.inner.min_x + texel.x / self.texture_width * self.inner.width(),
            self.inner.min_y + texel.y / self.texture_height * self.inner.height(),
        )
    }

    /// Bounding box on the minimap of the main view's visible region.
    ///
    /// The four viewport corners are unprojected to world space and
    /// projected onto the minimap. At least 1 px in each dimension.
    #[must_use]
    pub fn viewport_indicator(&self, camera: Camera, viewport: &Viewport) -> Rect {
        let corners = viewport
            .corners()
            .map(|c| self.tile_to_screen(IsoProjection::WORLD.screen_to_tile(c, camera)));
        let mut rect = Rect::bounding(&corners).unwrap_or_default();
        rect.max_x = rect.max_x.max(rect.min_x + 1.0);
        rect.max_y = rect.max_y.max(rect.min_y + 1.0);
        rect
    }

    /// Minimap marker position for every unit.
    #[must_use]
    pub fn unit_markers(&self, units: &[Unit]) -> Vec<(UnitId, Vec2)> {
        units
            .iter()
            .map(|u| (u.id, self.tile_to_screen(u.position)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_generation::Tile;

    fn checker(cols: u32, rows: u32) -> TileGrid {
        TileGrid::from_fn(cols, rows, |x, y| {
            let terrain = if (x + y) % 2 == 0 {
                Terrain::Land
            } else {
                Terrain::Water
            };
            Tile::new(terrain, 0.0)
        })
    }

    fn close(a: Vec2, b: Vec2, eps: f64) -> bool {
        (a.x - b.x).abs() < eps && (a.y - b.y).abs() < eps
    }

    #[test]
    fn test_texture_dimensions() {
        let texture = MinimapTexture::build(&checker(72, 72));
        assert_eq!(texture.width(), 290);
        assert_eq!(texture.height(), 146);
        assert_eq!(texture.origin_x(), 145.0);
        assert_eq!(texture.cells().len(), 290 * 146);
    }

    #[test]
    fn test_texture_samples_tiles() {
        let grid = checker(10, 6);
        let texture = MinimapTexture::build(&grid);
        // Centre of each tile's diamond picks that tile
        for y in 0..6u32 {
            for x in 0..10u32 {
                let p = texture.tile_to_texture(Vec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5));
                let cell = texture.cell(p.x as u32, p.y as u32);
                let expected = if (x + y) % 2 == 0 {
                    MinimapCell::Land
                } else {
                    MinimapCell::Water
                };
                assert_eq!(cell, Some(expected), "tile ({x},{y})");
            }
        }
        assert_eq!(texture.cell(0, 0), Some(MinimapCell::Outside));
        assert_eq!(texture.cell(texture.width(), 0), None);
    }

    #[test]
    fn test_diamond_containment() {
        let texture = MinimapTexture::build(&checker(20, 20));
        let frame = MinimapFrame {
            x: 100.0,
            y: 50.0,
            width: 220.0,
            height: 148.0,
            padding: 4.0,
        };
        let proj = MinimapProjection::new(frame, &texture);
        assert!(proj.contains(proj.diamond_center));
        // Inner rect corner is inside the bounding box but outside the diamond
        assert!(!proj.contains(Vec2::new(proj.inner.min_x + 1.0, proj.inner.min_y + 1.0)));
        assert!(proj.contains(Vec2::new(
            proj.diamond_center.x + proj.diamond_half_w * 0.5,
            proj.diamond_center.y + proj.diamond_half_h * 0.5
        )));
    }

    #[test]
    fn test_screen_round_trip() {
        let texture = MinimapTexture::build(&checker(72, 72));
        let proj = MinimapProjection::new(MinimapFrame::anchored(&Viewport::new(1280.0, 720.0)), &texture);
        for &(x, y) in &[(36.0, 36.0), (0.5, 71.5), (10.25, 3.75)] {
            let w = Vec2::new(x, y);
            assert!(close(proj.screen_to_tile(proj.tile_to_screen(w)), w, 1e-9));
        }
    }

    #[test]
    fn test_screen_to_tile_clamps() {
        let texture = MinimapTexture::build(&checker(30, 30));
        let proj = MinimapProjection::new(MinimapFrame::anchored(&Viewport::default()), &texture);
        let far = proj.screen_to_tile(Vec2::new(-1e6, -1e6));
        let corner = proj.screen_to_tile(Vec2::new(proj.inner.min_x, proj.inner.min_y));
        assert!(close(far, corner, 1e-9));
    }

    #[test]
    fn test_anchored_frame() {
        let frame = MinimapFrame::anchored(&Viewport::new(1000.0, 600.0));
        assert_eq!(frame.x, 1000.0 - 220.0 - 12.0);
        assert_eq!(frame.y, 600.0 - 148.0 - 12.0);
    }

    #[test]
    fn test_viewport_indicator_contains_focus() {
        let texture = MinimapTexture::build(&checker(72, 72));
        let screen = Viewport::new(1280.0, 720.0);
        let proj = MinimapProjection::new(MinimapFrame::anchored(&screen), &texture);
        let mut camera = Camera::default();
        let focus = Vec2::new(36.5, 36.5);
        crate::camera::sync_camera_from_focus(&mut camera, focus, &screen);
        let rect = proj.viewport_indicator(camera, &screen);
        assert!(rect.contains(proj.tile_to_screen(focus)));
        assert!(rect.width() >= 1.0 && rect.height() >= 1.0);
    }

    #[test]
    fn test_unit_markers() {
        let texture = MinimapTexture::build(&checker(20, 20));
        let proj = MinimapProjection::new(MinimapFrame::anchored(&Viewport::default()), &texture);
        let unit = Unit::new(
            UnitId(1),
            Vec2::new(4.0, 7.0),
            &crate::units::UnitSettings::default(),
        );
        let markers = proj.unit_markers(std::slice::from_ref(&unit));
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].0, UnitId(1));
        assert!(close(markers[0].1, proj.tile_to_screen(unit.position), 1e-12));
    }
}
