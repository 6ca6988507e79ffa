//! Quantized device-space triangles.

use crate::geom::Vec2;

/// Fixed-point device position: `round(v * precision)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QPoint {
    pub x: i32,
    pub y: i32,
}

impl QPoint {
    #[inline(always)]
    pub fn quantize(v: Vec2, precision: f32) -> Self {
        // `as` saturates out-of-range values and maps NaN to 0.
        Self { x: (v.x * precision).round() as i32, y: (v.y * precision).round() as i32 }
    }

    #[inline(always)]
    pub fn to_vec2(self, precision: f32) -> Vec2 {
        Vec2::new(self.x as f32 / precision, self.y as f32 / precision)
    }
}

/// Inclusive integer bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QBox {
    pub min: QPoint,
    pub max: QPoint,
}

impl QBox {
    pub fn contains_box(&self, other: &QBox) -> bool {
        self.min.x <= other.min.x && self.min.y <= other.min.y && self.max.x >= other.max.x && self.max.y >= other.max.y
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Triangle {
    pub pts: [QPoint; 3],
    pub color: [u8; 4],
    /// Insertion order. `None` marks the triangle deleted.
    pub id: Option<u32>,
}

impl Triangle {
    pub fn new(pts: [QPoint; 3], color: [u8; 4], id: u32) -> Self {
        Self { pts, color, id: Some(id) }
    }

    pub fn is_deleted(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_opaque(&self) -> bool {
        self.color[3] == u8::MAX
    }

    pub fn bbox(&self) -> QBox {
        let [a, b, c] = self.pts;
        QBox {
            min: QPoint { x: a.x.min(b.x).min(c.x), y: a.y.min(b.y).min(c.y) },
            max: QPoint { x: a.x.max(b.x).max(c.x), y: a.y.max(b.y).max(c.y) },
        }
    }

    /// Twice the signed area; positive for counterclockwise order.
    #[inline(always)]
    pub fn signed_area2(&self) -> i64 {
        let [a, b, c] = self.pts;
        orient(a, b, c)
    }

    /// Reject degenerates, rotate the leftmost vertex first, then force counterclockwise order.
    ///
    /// Leftmost means lowest x, ties broken by lowest y. The result is a fixed point:
    /// canonicalizing it again returns it unchanged.
    pub fn canonicalize(&self) -> Option<Triangle> {
        let [a, b, c] = self.pts;
        if a == b || b == c || a == c {
            return None;
        }
        if (a.x == b.x && b.x == c.x) || (a.y == b.y && b.y == c.y) {
            return None;
        }

        let mut first = 0;
        for i in 1..3 {
            if (self.pts[i].x, self.pts[i].y) < (self.pts[first].x, self.pts[first].y) {
                first = i;
            }
        }
        let mut pts = [self.pts[first], self.pts[(first + 1) % 3], self.pts[(first + 2) % 3]];

        match orient(pts[0], pts[1], pts[2]) {
            0 => return None,
            area if area < 0 => pts.swap(1, 2),
            _ => {}
        }

        Some(Triangle { pts, ..*self })
    }

    /// Inclusive point-in-triangle for a counterclockwise triangle.
    pub fn covers_point(&self, p: QPoint) -> bool {
        let [a, b, c] = self.pts;
        orient(a, b, p) >= 0 && orient(b, c, p) >= 0 && orient(c, a, p) >= 0
    }
}

#[inline(always)]
fn orient(a: QPoint, b: QPoint, c: QPoint) -> i64 {
    let abx = b.x as i64 - a.x as i64;
    let aby = b.y as i64 - a.y as i64;
    let acx = c.x as i64 - a.x as i64;
    let acy = c.y as i64 - a.y as i64;
    abx * acy - aby * acx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(x: i32, y: i32) -> QPoint {
        QPoint { x, y }
    }

    fn tri(a: QPoint, b: QPoint, c: QPoint) -> Triangle {
        Triangle::new([a, b, c], [255, 0, 0, 255], 0)
    }

    #[test]
    fn canonical_form_is_leftmost_first_and_ccw() {
        let t = tri(q(10, 0), q(0, 10), q(0, 0)).canonicalize().unwrap();
        assert_eq!(t.pts[0], q(0, 0));
        assert!(t.signed_area2() > 0);
        assert_eq!(t.pts, [q(0, 0), q(10, 0), q(0, 10)]);
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let inputs = [
            tri(q(5, 5), q(-3, 7), q(2, -8)),
            tri(q(0, 4), q(0, -4), q(6, 0)),
            tri(q(1, 1), q(9, 2), q(4, 9)),
            tri(q(-100, 3), q(50, 50), q(-100, -3)),
        ];
        for t in inputs {
            let once = t.canonicalize().unwrap();
            assert_eq!(once.canonicalize(), Some(once));
        }
    }

    #[test]
    fn ties_on_x_pick_the_lower_y() {
        let t = tri(q(0, 4), q(6, 0), q(0, -4)).canonicalize().unwrap();
        assert_eq!(t.pts[0], q(0, -4));
    }

    #[test]
    fn degenerates_are_rejected() {
        assert!(tri(q(0, 0), q(0, 0), q(5, 5)).canonicalize().is_none());
        assert!(tri(q(3, 0), q(3, 5), q(3, 9)).canonicalize().is_none());
        assert!(tri(q(0, 2), q(5, 2), q(9, 2)).canonicalize().is_none());
        // Collinear but not axis aligned.
        assert!(tri(q(0, 0), q(1, 1), q(2, 2)).canonicalize().is_none());
    }

    #[test]
    fn canonicalize_keeps_color_and_id() {
        let t = Triangle::new([q(4, 0), q(0, 0), q(0, 4)], [1, 2, 3, 4], 7);
        let c = t.canonicalize().unwrap();
        assert_eq!(c.color, [1, 2, 3, 4]);
        assert_eq!(c.id, Some(7));
    }

    #[test]
    fn quantize_rounds_to_precision() {
        assert_eq!(QPoint::quantize(Vec2::new(1.234, -0.006), 100.0), q(123, -1));
        assert_eq!(q(150, -25).to_vec2(100.0), Vec2::new(1.5, -0.25));
    }

    #[test]
    fn covers_point_is_inclusive() {
        let t = tri(q(0, 0), q(10, 0), q(0, 10)).canonicalize().unwrap();
        assert!(t.covers_point(q(0, 0)));
        assert!(t.covers_point(q(5, 5)));
        assert!(t.covers_point(q(2, 2)));
        assert!(!t.covers_point(q(6, 6)));
    }
}
