use core::ops::Mul;

use super::Vec2;

/// 2D affine transform.
///
/// Maps `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`. Column-major like the
/// 3×2 matrices WGSL consumes, so [`to_columns`](Self::to_columns) can be
/// uploaded as-is.
///
/// `lhs * rhs` applies `rhs` first, then `lhs`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2 {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    #[inline]
    pub const fn translation(t: Vec2) -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: t.x, f: t.y }
    }

    #[inline]
    pub const fn scaling(s: Vec2) -> Self {
        Self { a: s.x, b: 0.0, c: 0.0, d: s.y, e: 0.0, f: 0.0 }
    }

    /// Counter-clockwise rotation in a y-up frame (clockwise on a y-down screen).
    #[inline]
    pub fn rotation_degrees(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, e: 0.0, f: 0.0 }
    }

    #[inline]
    pub fn apply(self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    #[inline]
    pub fn determinant(self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Returns the inverse, or `None` when the transform collapses an axis.
    pub fn inverse(self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() <= f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        let a = self.d * inv;
        let b = -self.b * inv;
        let c = -self.c * inv;
        let d = self.a * inv;
        Some(Self {
            a,
            b,
            c,
            d,
            e: -(a * self.e + c * self.f),
            f: -(b * self.e + d * self.f),
        })
    }

    /// Columns `[a, b]`, `[c, d]`, `[e, f]`.
    #[inline]
    pub fn to_columns(self) -> [[f32; 2]; 3] {
        [[self.a, self.b], [self.c, self.d], [self.e, self.f]]
    }
}

impl Mul for Transform2 {
    type Output = Transform2;

    #[inline]
    fn mul(self, rhs: Transform2) -> Transform2 {
        Transform2 {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }
}
