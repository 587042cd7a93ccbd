//! Geometry kernel
//!
//! Rectangles, line segments and the 2x2 solve used by the laser ray caster.
//! Everything here is a pure function of its inputs.

use glam::{Mat2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its corners
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle centred on `center` with full extents `size`
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - 0.5 * size,
            max: center + 0.5 * size,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        0.5 * (self.min + self.max)
    }

    /// Grow the rectangle by `amount` on every side
    pub fn grown(&self, amount: Vec2) -> Self {
        Self {
            min: self.min - amount,
            max: self.max + amount,
        }
    }

    /// The four edges, in the order bottom, left, top, right
    pub fn edges(&self) -> [LineSegment; 4] {
        let (min, max) = (self.min, self.max);
        [
            LineSegment::new(min, Vec2::new(max.x, min.y)),
            LineSegment::new(min, Vec2::new(min.x, max.y)),
            LineSegment::new(max, Vec2::new(min.x, max.y)),
            LineSegment::new(max, Vec2::new(max.x, min.y)),
        ]
    }
}

/// A finite line segment
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Vec2,
    pub end: Vec2,
}

impl LineSegment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn from_offset(start: Vec2, offset: Vec2) -> Self {
        Self {
            start,
            end: start + offset,
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }
}

/// Strict overlap test. Rectangles that only share an edge do not collide.
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// Strict containment test, the boundary is excluded
#[inline]
pub fn point_in_rect(rect: &Rect, point: Vec2) -> bool {
    point.x > rect.min.x && point.x < rect.max.x && point.y > rect.min.y && point.y < rect.max.y
}

/// Unit vector in the direction of `v`, or zero when `v` has no length
#[inline]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

/// Matrix whose columns are `a` and `b`
#[inline]
pub fn mat2_from_columns(a: Vec2, b: Vec2) -> Mat2 {
    Mat2::from_cols(a, b)
}

/// Inverse of `m` without a determinant check.
///
/// A singular matrix yields non-finite entries. Callers solving ray/segment
/// systems rely on that: NaN and infinite parameters fail every range gate, so
/// parallel rays simply miss.
#[inline]
pub fn inverse_unchecked(m: Mat2) -> Mat2 {
    let det = m.x_axis.x * m.y_axis.y - m.y_axis.x * m.x_axis.y;
    Mat2::from_cols(
        Vec2::new(m.y_axis.y / det, -m.x_axis.y / det),
        Vec2::new(-m.y_axis.x / det, m.x_axis.x / det),
    )
}
