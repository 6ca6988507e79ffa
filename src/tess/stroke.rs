//! Stroke extrusion of flattened polylines.
//!
//! Two modes:
//! - `Simple`: one quad (two triangles) per non-degenerate segment, no joins or caps.
//! - `Full`: a continuous triangle strip per subpath with miter/bevel/round joins and
//!   butt/round/square caps.

use crate::geom::{BoundsBuilder, Vec2};
use crate::tess::{Contour, StrokeGeometry};

/// Consecutive points closer than this are treated as one.
const DUPLICATE_EPS: f32 = 1e-6;
/// Direction cross products below this count as collinear.
const COLLINEAR_EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CapStyle {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JoinStyle {
    #[default]
    Miter,
    Round,
    Bevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrokeMode {
    Simple,
    #[default]
    Full,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub cap: CapStyle,
    pub join: JoinStyle,
    /// Ratio of miter length to stroke width above which a miter becomes a bevel.
    pub miter_limit: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { width: 1.0, cap: CapStyle::Butt, join: JoinStyle::Miter, miter_limit: 4.0 }
    }
}

/// Extrude every polyline in `polylines` with `style`.
pub fn extrude_stroke(polylines: &[Contour], style: &StrokeStyle, mode: StrokeMode) -> StrokeGeometry {
    if !(style.width > 0.0) || !style.width.is_finite() {
        return StrokeGeometry::default();
    }

    let mut ex = Extruder::new(style.width * 0.5);
    for polyline in polylines {
        let points = dedup_points(&polyline.points, polyline.closed);
        if points.is_empty() {
            continue;
        }
        if polyline.closed && points.len() < 3 {
            // Degenerate loop.
            continue;
        }
        match mode {
            StrokeMode::Simple => ex.simple(&points, polyline.closed),
            StrokeMode::Full if points.len() == 1 => ex.dot(points[0], style.cap),
            StrokeMode::Full if polyline.closed => ex.closed(&points, style),
            StrokeMode::Full => ex.open(&points, style),
        }
    }

    log::trace!(
        "stroke: {} polylines, width {} -> {} triangles",
        polylines.len(),
        style.width,
        ex.triangles.len()
    );
    ex.finish()
}

fn dedup_points(points: &[Vec2], closed: bool) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if !p.is_finite() {
            continue;
        }
        if out.last().map(|q| q.approx_eq(p, DUPLICATE_EPS)).unwrap_or(false) {
            continue;
        }
        out.push(p);
    }
    if closed {
        while out.len() >= 2 && out[0].approx_eq(out[out.len() - 1], DUPLICATE_EPS) {
            out.pop();
        }
    }
    out
}

/// Rolling triangle-strip state: the last two strip vertex indices.
#[derive(Clone, Copy, Debug, Default)]
struct StripState {
    prev2: Option<u32>,
    prev1: Option<u32>,
}

impl StripState {
    /// Append `idx`; emits a triangle once two earlier indices exist.
    fn push(&mut self, idx: u32, out: &mut Vec<[u32; 3]>) {
        if let (Some(a), Some(b)) = (self.prev2, self.prev1) {
            out.push([a, b, idx]);
        }
        self.prev2 = self.prev1;
        self.prev1 = Some(idx);
    }
}

/// Index pair of one left/right extrusion.
#[derive(Clone, Copy, Debug)]
struct Pair {
    left: u32,
    right: u32,
}

struct Extruder {
    half_width: f32,
    verts: Vec<Vec2>,
    triangles: Vec<[u32; 3]>,
}

impl Extruder {
    fn new(half_width: f32) -> Self {
        Self { half_width, verts: Vec::new(), triangles: Vec::new() }
    }

    fn vertex(&mut self, p: Vec2) -> u32 {
        self.verts.push(p);
        (self.verts.len() - 1) as u32
    }

    fn pair(&mut self, center: Vec2, normal: Vec2, scale: f32) -> Pair {
        let offset = normal * (self.half_width * scale);
        let left = self.vertex(center + offset);
        let right = self.vertex(center - offset);
        Pair { left, right }
    }

    fn push_pair(&mut self, strip: &mut StripState, pair: Pair) {
        strip.push(pair.left, &mut self.triangles);
        strip.push(pair.right, &mut self.triangles);
    }

    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) {
        let ia = self.vertex(a);
        let ib = self.vertex(b);
        let ic = self.vertex(c);
        self.triangles.push([ia, ib, ic]);
    }

    fn simple(&mut self, points: &[Vec2], closed: bool) {
        let segment = |ex: &mut Extruder, a: Vec2, b: Vec2| {
            let n = (b - a).normalize().perp();
            let mut strip = StripState::default();
            let start = ex.pair(a, n, 1.0);
            let end = ex.pair(b, n, 1.0);
            ex.push_pair(&mut strip, start);
            ex.push_pair(&mut strip, end);
        };
        for w in points.windows(2) {
            segment(self, w[0], w[1]);
        }
        if closed && points.len() >= 3 {
            segment(self, points[points.len() - 1], points[0]);
        }
    }

    fn open(&mut self, points: &[Vec2], style: &StrokeStyle) {
        let n = points.len();
        let dirs: Vec<Vec2> = points.windows(2).map(|w| (w[1] - w[0]).normalize()).collect();
        let mut strip = StripState::default();

        let d0 = dirs[0];
        let n0 = d0.perp();
        let start = points[0];
        let base = match style.cap {
            CapStyle::Square => start - d0 * self.half_width,
            _ => start,
        };
        let pair = self.pair(base, n0, 1.0);
        self.push_pair(&mut strip, pair);
        if style.cap == CapStyle::Round {
            self.fan(start, n0, -n0, -d0, round_slices(0.0));
        }

        for i in 1..n - 1 {
            self.join(&mut strip, points[i], dirs[i - 1], dirs[i], style);
        }

        let dl = dirs[n - 2];
        let nl = dl.perp();
        let end = points[n - 1];
        let base = match style.cap {
            CapStyle::Square => end + dl * self.half_width,
            _ => end,
        };
        let pair = self.pair(base, nl, 1.0);
        self.push_pair(&mut strip, pair);
        if style.cap == CapStyle::Round {
            self.fan(end, nl, -nl, dl, round_slices(0.0));
        }
    }

    fn closed(&mut self, points: &[Vec2], style: &StrokeStyle) {
        let m = points.len();
        let dirs: Vec<Vec2> = (0..m).map(|i| (points[(i + 1) % m] - points[i]).normalize()).collect();
        let mut strip = StripState::default();

        let first = self.join(&mut strip, points[0], dirs[m - 1], dirs[0], style);
        for i in 1..m {
            self.join(&mut strip, points[i], dirs[i - 1], dirs[i], style);
        }
        // Close the strip on the incoming pair of the first vertex.
        self.push_pair(&mut strip, first);
    }

    /// Emit the join at `p` between segment directions `d_prev` and `d_next`.
    ///
    /// Returns the first pair pushed to the strip (the one facing the incoming segment).
    fn join(&mut self, strip: &mut StripState, p: Vec2, d_prev: Vec2, d_next: Vec2, style: &StrokeStyle) -> Pair {
        let n_prev = d_prev.perp();
        let n_next = d_next.perp();
        let cross = d_prev.cross(d_next);

        if cross.abs() <= COLLINEAR_EPS && d_prev.dot(d_next) > 0.0 {
            let pair = self.pair(p, n_next, 1.0);
            self.push_pair(strip, pair);
            return pair;
        }

        let join_normal = (n_prev + n_next).normalize();
        let cos_half = join_normal.dot(n_next);
        // Turning left puts the outer corner on the right-hand side.
        let outer = if cross > 0.0 { -1.0 } else { 1.0 };

        if style.join == JoinStyle::Miter && cos_half > COLLINEAR_EPS {
            let miter_length = 1.0 / cos_half;
            if miter_length <= style.miter_limit {
                if miter_length <= 2.0 {
                    let pair = self.pair(p, join_normal, miter_length);
                    self.push_pair(strip, pair);
                    return pair;
                }
                // Flip bevel: beveled body plus the miter tip on the outer side only.
                let incoming = self.pair(p, n_prev, 1.0);
                self.push_pair(strip, incoming);
                let hw = self.half_width;
                self.triangle(
                    p + n_prev * (hw * outer),
                    p + join_normal * (hw * miter_length * outer),
                    p + n_next * (hw * outer),
                );
                let outgoing = self.pair(p, n_next, 1.0);
                self.push_pair(strip, outgoing);
                return incoming;
            }
        }

        let incoming = self.pair(p, n_prev, 1.0);
        self.push_pair(strip, incoming);
        if style.join == JoinStyle::Round {
            let bulge = (d_prev - d_next).normalize();
            self.fan(p, n_prev * outer, n_next * outer, bulge, round_slices(cos_half));
        }
        let outgoing = self.pair(p, n_next, 1.0);
        self.push_pair(strip, outgoing);
        incoming
    }

    /// Pie-slice fan around `center` from unit direction `from` to `to`, bulging towards `through`.
    fn fan(&mut self, center: Vec2, from: Vec2, to: Vec2, through: Vec2, slices: u32) {
        let a0 = from.y.atan2(from.x);
        let a1 = to.y.atan2(to.x);
        let tau = core::f32::consts::TAU;
        let ccw = (a1 - a0).rem_euclid(tau);
        let cw = ccw - tau;
        let mid_dir = |delta: f32| {
            let (s, c) = (a0 + delta * 0.5).sin_cos();
            Vec2::new(c, s)
        };
        let delta = if mid_dir(ccw).dot(through) >= mid_dir(cw).dot(through) { ccw } else { cw };

        let hw = self.half_width;
        let slices = slices.max(1);
        let mut prev = center + from * hw;
        for k in 1..=slices {
            let next = if k == slices {
                center + to * hw
            } else {
                let (s, c) = (a0 + delta * (k as f32 / slices as f32)).sin_cos();
                center + Vec2::new(c, s) * hw
            };
            self.triangle(center, prev, next);
            prev = next;
        }
    }

    /// A zero-length subpath: a disc for round caps, a square for square caps.
    fn dot(&mut self, p: Vec2, cap: CapStyle) {
        let x = Vec2::new(1.0, 0.0);
        let y = Vec2::new(0.0, 1.0);
        match cap {
            CapStyle::Butt => {}
            CapStyle::Round => {
                self.fan(p, y, -y, -x, round_slices(0.0));
                self.fan(p, -y, y, x, round_slices(0.0));
            }
            CapStyle::Square => {
                let hw = self.half_width;
                let mut strip = StripState::default();
                let left = self.pair(p - x * hw, y, 1.0);
                let right = self.pair(p + x * hw, y, 1.0);
                self.push_pair(&mut strip, left);
                self.push_pair(&mut strip, right);
            }
        }
    }

    fn finish(self) -> StrokeGeometry {
        let mut bounds = BoundsBuilder::new();
        let triangles: Vec<[Vec2; 3]> = self
            .triangles
            .iter()
            .map(|t| {
                let tri = [self.verts[t[0] as usize], self.verts[t[1] as usize], self.verts[t[2] as usize]];
                for &v in &tri {
                    bounds.add(v);
                }
                tri
            })
            .collect();
        StrokeGeometry { triangles, bounds: bounds.finish() }
    }
}

/// Pie slices for a round join/cap given the cosine of half the turn between normals.
///
/// Empirical: one slice when straight, nine for a half turn.
fn round_slices(cos_half: f32) -> u32 {
    let extra = ((0.5 - (cos_half - 0.5)) * 8.0).floor();
    extra.max(0.0) as u32 + 1
}
