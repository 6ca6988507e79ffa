//! Curve flattening at a fixed tessellation resolution.
//!
//! Each function is stateless: the caller tracks the current point and passes it in.
//! Output samples exclude the start point and always end with the exact end point.

use crate::geom::Vec2;

/// Degrees.
const ANGLE_EPSILON: f32 = 1e-3;

/// Which of the two candidate ellipses an arc follows, and in which direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArcKind {
    SmallCCW,
    SmallCW,
    LargeCCW,
    LargeCW,
}

impl ArcKind {
    fn is_ccw(self) -> bool {
        matches!(self, ArcKind::SmallCCW | ArcKind::LargeCCW)
    }

    /// Small CCW and large CW arcs use the center on the left of the chord.
    fn center_on_left(self) -> bool {
        matches!(self, ArcKind::SmallCCW | ArcKind::LargeCW)
    }
}

/// Elliptical arc endpoint parameterization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcParams {
    pub rx: f32,
    pub ry: f32,
    /// X-axis rotation in degrees.
    pub rotation: f32,
    pub kind: ArcKind,
    pub end: Vec2,
}

/// Quadratic Bézier: samples at `t = i/N`, `i = 1..=N`.
pub fn flatten_quad(p0: Vec2, c: Vec2, p1: Vec2, iterations: u32, out: &mut Vec<Vec2>) {
    let n = iterations.max(1);
    for i in 1..n {
        let t = i as f32 / n as f32;
        let mt = 1.0 - t;
        out.push(p0 * (mt * mt) + c * (2.0 * mt * t) + p1 * (t * t));
    }
    out.push(p1);
}

/// Cubic Bézier: samples at `t = i/N`, `i = 1..=N`.
pub fn flatten_cubic(p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2, iterations: u32, out: &mut Vec<Vec2>) {
    let n = iterations.max(1);
    for i in 1..n {
        let t = i as f32 / n as f32;
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let cc = 3.0 * mt * t * t;
        let d = t * t * t;
        out.push(p0 * a + c1 * b + c2 * cc + p3 * d);
    }
    out.push(p3);
}

/// Flatten an elliptical arc from `start`.
///
/// Returns the number of intermediate samples pushed (the end point is always pushed
/// and is not counted). Zero means the arc degraded to a straight line.
pub fn flatten_arc(start: Vec2, arc: &ArcParams, iterations: u32, out: &mut Vec<Vec2>) -> usize {
    let n = iterations.max(1);
    let before = out.len();

    if let Some(center) = find_ellipse_center(start, arc) {
        let (sin_r, cos_r) = arc.rotation.to_radians().sin_cos();
        let rx = arc.rx.abs();
        let ry = arc.ry.abs();

        let start_angle = unit_angle_degrees(start, center, arc, sin_r, cos_r);
        let mut end_angle = unit_angle_degrees(arc.end, center, arc, sin_r, cos_r);

        // Resolve sweep direction: CCW sweeps increase the angle, CW sweeps decrease it.
        let mut step = 360.0 / n as f32;
        if arc.kind.is_ccw() {
            if end_angle <= start_angle {
                end_angle += 360.0;
            }
        } else {
            if end_angle >= start_angle {
                end_angle -= 360.0;
            }
            step = -step;
        }

        let sweep = (end_angle - start_angle).abs();
        let mut k = 1u32;
        loop {
            let travelled = step.abs() * k as f32;
            // Samples landing on the end point are covered by the final push.
            if travelled >= sweep - ANGLE_EPSILON {
                break;
            }
            let alpha = (start_angle + step * k as f32).to_radians();
            let (sin_a, cos_a) = alpha.sin_cos();
            let ex = rx * cos_a;
            let ey = ry * sin_a;
            out.push(Vec2 {
                x: center.x + ex * cos_r - ey * sin_r,
                y: center.y + ex * sin_r + ey * cos_r,
            });
            k += 1;
        }
    }

    let samples = out.len() - before;
    out.push(arc.end);
    samples
}

/// Find the ellipse center for an arc by mapping both endpoints into the unit-circle
/// space of the ellipse and intersecting the two unit circles around them.
fn find_ellipse_center(start: Vec2, arc: &ArcParams) -> Option<Vec2> {
    let rx = arc.rx.abs();
    let ry = arc.ry.abs();
    if rx <= f32::EPSILON || ry <= f32::EPSILON {
        return None;
    }
    let (sin_r, cos_r) = arc.rotation.to_radians().sin_cos();
    let to_unit = |p: Vec2| Vec2 {
        x: (p.x * cos_r + p.y * sin_r) / rx,
        y: (-p.x * sin_r + p.y * cos_r) / ry,
    };
    let p0 = to_unit(start);
    let p1 = to_unit(arc.end);

    let (left, right) = find_unit_circles(p0, p1)?;
    let c = if arc.kind.center_on_left() { left } else { right };

    // Back to user space: scale, then rotate.
    let sx = c.x * rx;
    let sy = c.y * ry;
    let center = Vec2 { x: sx * cos_r - sy * sin_r, y: sx * sin_r + sy * cos_r };
    if center.is_finite() {
        Some(center)
    } else {
        None
    }
}

/// Centers of the two unit circles through `p0` and `p1`: (left of p0->p1, right of p0->p1).
fn find_unit_circles(p0: Vec2, p1: Vec2) -> Option<(Vec2, Vec2)> {
    let d = p0 - p1;
    let mid = (p0 + p1) * 0.5;
    let dsq = d.dot(d);
    if dsq <= f32::EPSILON {
        return None;
    }
    let disc = 1.0 / dsq - 0.25;
    if disc < 0.0 {
        return None;
    }
    let s = disc.sqrt();
    let left = Vec2 { x: mid.x + s * d.y, y: mid.y - s * d.x };
    let right = Vec2 { x: mid.x - s * d.y, y: mid.y + s * d.x };
    Some((left, right))
}

/// Angle (degrees) of `p` around `center` in the ellipse's unit space.
fn unit_angle_degrees(p: Vec2, center: Vec2, arc: &ArcParams, sin_r: f32, cos_r: f32) -> f32 {
    let d = p - center;
    let ux = (d.x * cos_r + d.y * sin_r) / arc.rx.abs();
    let uy = (-d.x * sin_r + d.y * cos_r) / arc.ry.abs();
    uy.atan2(ux).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(kind: ArcKind, r: f32, end: Vec2) -> ArcParams {
        ArcParams { rx: r, ry: r, rotation: 0.0, kind, end }
    }

    #[test]
    fn cubic_samples_end_exactly() {
        let mut out = Vec::new();
        let p3 = Vec2::new(3.0, 0.0);
        flatten_cubic(Vec2::ZERO, Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0), p3, 16, &mut out);
        assert_eq!(out.len(), 16);
        assert_eq!(*out.last().unwrap(), p3);
        // Symmetric curve peaks at t = 0.5 with y = 0.75.
        assert!((out[7].y - 0.75).abs() < 1e-5);
    }

    #[test]
    fn quad_with_one_iteration_is_a_line() {
        let mut out = Vec::new();
        flatten_quad(Vec2::ZERO, Vec2::new(5.0, 5.0), Vec2::new(10.0, 0.0), 1, &mut out);
        assert_eq!(out, vec![Vec2::new(10.0, 0.0)]);
    }

    #[test]
    fn quarter_arc_stays_on_circle() {
        let mut out = Vec::new();
        let start = Vec2::new(10.0, 0.0);
        let end = Vec2::new(0.0, 10.0);
        let n = flatten_arc(start, &arc(ArcKind::SmallCCW, 10.0, end), 16, &mut out);
        // 90 degrees at 22.5 degree steps: 3 intermediate samples.
        assert_eq!(n, 3);
        for p in &out {
            assert!((p.length() - 10.0).abs() < 1e-3, "{p:?}");
            assert!(p.x >= -1e-3 && p.y >= -1e-3);
        }
        assert_eq!(*out.last().unwrap(), end);
    }

    #[test]
    fn cw_arc_takes_the_other_side() {
        let mut out = Vec::new();
        let start = Vec2::new(10.0, 0.0);
        let end = Vec2::new(-10.0, 0.0);
        // Half circle: both centers coincide, direction decides the side.
        flatten_arc(start, &arc(ArcKind::SmallCW, 10.0, end), 16, &mut out);
        assert!(out[..out.len() - 1].iter().all(|p| p.y < 0.0));
        out.clear();
        flatten_arc(start, &arc(ArcKind::SmallCCW, 10.0, end), 16, &mut out);
        assert!(out[..out.len() - 1].iter().all(|p| p.y > 0.0));
    }

    #[test]
    fn large_arc_sweeps_more_than_half() {
        let mut small = Vec::new();
        let mut large = Vec::new();
        let start = Vec2::new(10.0, 0.0);
        let end = Vec2::new(0.0, 10.0);
        flatten_arc(start, &arc(ArcKind::SmallCCW, 10.0, end), 16, &mut small);
        flatten_arc(start, &arc(ArcKind::LargeCW, 10.0, end), 16, &mut large);
        // Small CCW and large CW share the center, the large one goes the long way round.
        assert_eq!(large.len() - 1, 11);
        assert!(large.len() > small.len());
    }

    #[test]
    fn radii_too_small_degrade_to_line() {
        let mut out = Vec::new();
        let n = flatten_arc(
            Vec2::ZERO,
            &arc(ArcKind::LargeCCW, 2.0, Vec2::new(10.0, 0.0)),
            16,
            &mut out,
        );
        assert_eq!(n, 0);
        assert_eq!(out, vec![Vec2::new(10.0, 0.0)]);
    }

    #[test]
    fn zero_radius_degrades_to_line() {
        let mut out = Vec::new();
        let n = flatten_arc(
            Vec2::ZERO,
            &ArcParams { rx: 0.0, ry: 5.0, rotation: 0.0, kind: ArcKind::SmallCW, end: Vec2::new(1.0, 1.0) },
            8,
            &mut out,
        );
        assert_eq!(n, 0);
        assert_eq!(out.len(), 1);
    }
}
