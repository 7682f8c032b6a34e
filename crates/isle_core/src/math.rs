//! Vector and rectangle math shared by projection, camera and units.
//!
//! World points are continuous tile coordinates; screen points are
//! pixels. Both use the same [`Vec2`] type, the meaning comes from
//! which function produced them.

use serde::{Deserialize, Serialize};

/// 2D vector of `f64` components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Vec2 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Unit-length vector in the same direction, or zero for the zero vector.
    #[must_use]
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    /// Index of the tile containing this world point.
    ///
    /// Floors both components, so negative coordinates map to negative
    /// indices which every grid lookup treats as out of bounds.
    #[must_use]
    pub fn tile_index(self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }

    /// Whether both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Axis-aligned rectangle in screen space, inclusive on all edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub min_x: f64,
    /// Top edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub max_y: f64,
}

impl Rect {
    /// Rectangle spanned by two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Smallest rectangle containing every point, or `None` for no points.
    #[must_use]
    pub fn bounding(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut rect = Self::from_corners(*first, *first);
        for p in rest {
            rect.min_x = rect.min_x.min(p.x);
            rect.min_y = rect.min_y.min(p.y);
            rect.max_x = rect.max_x.max(p.x);
            rect.max_y = rect.max_y.max(p.y);
        }
        Some(rect)
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Inclusive point containment.
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_distance() {
        let a = Vec2::new(3.0, 0.0);
        let b = Vec2::new(0.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
        assert!((a.distance_squared(b) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_vec2_normalize() {
        let n = Vec2::new(3.0, 4.0).normalize_or_zero();
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
    }

    #[test]
    fn test_tile_index_floors_negative() {
        assert_eq!(Vec2::new(2.9, 0.1).tile_index(), (2, 0));
        assert_eq!(Vec2::new(-0.1, 3.0).tile_index(), (-1, 3));
    }

    #[test]
    fn test_rect_from_corners_orders_edges() {
        let r = Rect::from_corners(Vec2::new(10.0, 2.0), Vec2::new(4.0, 8.0));
        assert_eq!(r.min_x, 4.0);
        assert_eq!(r.max_y, 8.0);
        assert!(r.contains(Vec2::new(4.0, 2.0)));
        assert!(!r.contains(Vec2::new(3.9, 5.0)));
    }

    #[test]
    fn test_rect_bounding() {
        assert!(Rect::bounding(&[]).is_none());
        let r = Rect::bounding(&[
            Vec2::new(1.0, 5.0),
            Vec2::new(-2.0, 3.0),
            Vec2::new(4.0, -1.0),
        ])
        .unwrap();
        assert_eq!((r.min_x, r.min_y, r.max_x, r.max_y), (-2.0, -1.0, 4.0, 5.0));
        assert_eq!(r.width(), 6.0);
        assert_eq!(r.height(), 6.0);
    }
}
