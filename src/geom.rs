//! Geometry primitives shared by the flattener, the tessellators and the mesh assembler.

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 2D point or vector in path-local user units (or device units after transform).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline(always)]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn dot(self, o: Vec2) -> f32 {
        self.x * o.x + self.y * o.y
    }

    /// Z component of the 3D cross product.
    #[inline(always)]
    pub fn cross(self, o: Vec2) -> f32 {
        self.x * o.y - self.y * o.x
    }

    #[inline(always)]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON {
            return Vec2::ZERO;
        }
        Vec2 { x: self.x / len, y: self.y / len }
    }

    /// Left-hand perpendicular `(-y, x)`.
    #[inline(always)]
    pub fn perp(self) -> Vec2 {
        Vec2 { x: -self.y, y: self.x }
    }

    #[inline(always)]
    pub fn approx_eq(self, o: Vec2, eps: f32) -> bool {
        (self.x - o.x).abs() <= eps && (self.y - o.y).abs() <= eps
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline(always)]
    fn add(self, o: Vec2) -> Vec2 {
        Vec2 { x: self.x + o.x, y: self.y + o.y }
    }
}

impl AddAssign for Vec2 {
    #[inline(always)]
    fn add_assign(&mut self, o: Vec2) {
        self.x += o.x;
        self.y += o.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline(always)]
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2 { x: self.x - o.x, y: self.y - o.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline(always)]
    fn mul(self, s: f32) -> Vec2 {
        Vec2 { x: self.x * s, y: self.y * s }
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline(always)]
    fn neg(self) -> Vec2 {
        Vec2 { x: -self.x, y: -self.y }
    }
}

/// 3x3 affine matrix, row-major.
///
/// `x' = x*m[0][0] + y*m[0][1] + m[0][2]`, `y' = x*m[1][0] + y*m[1][1] + m[1][2]`.
/// The last row is always `[0, 0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub m: [[f32; 3]; 3],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub const fn identity() -> Self {
        Self { m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] }
    }

    pub fn translate(tx: f32, ty: f32) -> Self {
        Self { m: [[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]] }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self { m: [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]] }
    }

    /// Counter-clockwise rotation (y-up) by `degrees`.
    pub fn rotate(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self { m: [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]] }
    }

    /// `self * other`: the result applies `other` first, then `self`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        let mut out = [[0.0f32; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[r][k] * other.m[k][c]).sum();
            }
        }
        Matrix { m: out }
    }

    #[inline(always)]
    pub fn apply(&self, v: Vec2) -> Vec2 {
        let m = &self.m;
        Vec2 {
            x: v.x * m[0][0] + v.y * m[0][1] + m[0][2],
            y: v.x * m[1][0] + v.y * m[1][1] + m[1][2],
        }
    }

    pub fn is_identity(&self) -> bool {
        approx_eq_f32(self.m[0][0], 1.0)
            && approx_eq_f32(self.m[1][1], 1.0)
            && approx_eq_f32(self.m[0][1], 0.0)
            && approx_eq_f32(self.m[1][0], 0.0)
            && approx_eq_f32(self.m[0][2], 0.0)
            && approx_eq_f32(self.m[1][2], 0.0)
    }
}

/// Axis-aligned bounds as origin plus extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn max_x(&self) -> f32 {
        self.min_x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.min_y + self.height
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x() && p.y >= self.min_y && p.y <= self.max_y()
    }
}

/// Running bounds accumulator.
///
/// Minima and maxima are tracked while vertices stream in; the maxima only become
/// width/height in `finish`.
#[derive(Clone, Copy, Debug)]
pub struct BoundsBuilder {
    min: Vec2,
    max: Vec2,
    empty: bool,
}

impl Default for BoundsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundsBuilder {
    pub fn new() -> Self {
        Self { min: Vec2::ZERO, max: Vec2::ZERO, empty: true }
    }

    pub fn add(&mut self, p: Vec2) {
        if self.empty {
            self.min = p;
            self.max = p;
            self.empty = false;
            return;
        }
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn finish(&self) -> Bounds {
        if self.empty {
            return Bounds::default();
        }
        Bounds {
            min_x: self.min.x,
            min_y: self.min.y,
            width: (self.max.x - self.min.x).abs(),
            height: (self.max.y - self.min.y).abs(),
        }
    }
}

fn approx_eq_f32(a: f32, b: f32) -> bool {
    (a - b).abs() <= 0.0001
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn perp_is_left_hand() {
        assert_eq!(Vec2::new(1.0, 0.0).perp(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn matrix_apply_follows_row_convention() {
        let m = Matrix { m: [[2.0, 3.0, 5.0], [7.0, 11.0, 13.0], [0.0, 0.0, 1.0]] };
        let p = m.apply(Vec2::new(1.0, 2.0));
        assert_eq!(p, Vec2::new(2.0 + 6.0 + 5.0, 7.0 + 22.0 + 13.0));
    }

    #[test]
    fn multiply_applies_right_operand_first() {
        let m = Matrix::translate(10.0, 0.0).multiply(&Matrix::scale(2.0, 2.0));
        assert_eq!(m.apply(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0));
        assert!(Matrix::identity().is_identity());
        assert!(!Matrix::translate(1.0, 2.0).is_identity());
        assert!(!Matrix::rotate(30.0).is_identity());
    }

    #[test]
    fn bounds_builder_converts_maxima() {
        let mut b = BoundsBuilder::new();
        assert_eq!(b.finish(), Bounds::default());
        b.add(Vec2::new(4.0, -1.0));
        b.add(Vec2::new(-2.0, 6.0));
        let bounds = b.finish();
        assert_eq!(bounds, Bounds { min_x: -2.0, min_y: -1.0, width: 6.0, height: 7.0 });
        assert!(bounds.contains(Vec2::new(4.0, 6.0)));
        assert!(!bounds.contains(Vec2::new(4.1, 6.0)));
    }
}
