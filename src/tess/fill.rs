//! Fill tessellation: closed contours plus a winding rule to a triangle list.
//!
//! Triangulation sits behind the `Triangulator` trait. The default implementation hands the
//! cleaned contours to lyon's sweep-line fill tessellator, which resolves overlaps and
//! self-intersections under the requested rule. Lyon knows no positive-winding rule, so that one
//! goes through `SweepTriangulator`, a slab decomposition that evaluates any rule exactly.

use smallvec::SmallVec;

use crate::geom::{BoundsBuilder, Vec2};
use crate::tess::{Contour, FillGeometry, TessError};

use lyon::math::point;
use lyon::path::Path as LyonPath;
use lyon::tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};

/// Upper bound on vertices in one polygon element returned by a triangulator.
pub const MAX_POLYGON_VERTICES: usize = 6;

/// Consecutive points closer than this (per axis) are merged.
const DUPLICATE_EPS: f32 = 1e-4;
/// Sine of the smallest corner angle kept by collinear culling.
const COLLINEAR_SIN_EPS: f32 = 1e-5;
/// Sweep stops closer than this are merged into one.
const SLAB_EPS: f32 = 1e-5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
    /// Filled where the winding number is strictly positive.
    Positive,
}

impl FillRule {
    fn is_filled(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding & 1 != 0,
            FillRule::Positive => winding > 0,
        }
    }
}

/// One convex polygon element (a fan), at most `MAX_POLYGON_VERTICES` vertices.
pub type Polygon = SmallVec<[Vec2; MAX_POLYGON_VERTICES]>;

/// Planar triangulation capability.
pub trait Triangulator {
    /// Triangulate the filled region of `contours` under `rule`.
    ///
    /// Returned polygons are fan-decomposable: vertex 0 and every following pair form a triangle.
    /// Polygons never overlap.
    fn triangulate(&mut self, contours: &[Contour], rule: FillRule) -> Result<Vec<Polygon>, TessError>;
}

/// Lyon-backed triangulator, the default for path fills.
pub struct LyonTriangulator {
    tess: FillTessellator,
    sweep: SweepTriangulator,
}

impl Default for LyonTriangulator {
    fn default() -> Self {
        Self { tess: FillTessellator::new(), sweep: SweepTriangulator::default() }
    }
}

impl Triangulator for LyonTriangulator {
    fn triangulate(&mut self, contours: &[Contour], rule: FillRule) -> Result<Vec<Polygon>, TessError> {
        let options = match rule {
            FillRule::NonZero => FillOptions::non_zero(),
            FillRule::EvenOdd => FillOptions::even_odd(),
            FillRule::Positive => return self.sweep.triangulate(contours, rule),
        };

        let rings = clean_rings(contours);
        if rings.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = LyonPath::builder();
        for ring in &rings {
            builder.begin(point(ring[0].x, ring[0].y));
            for p in &ring[1..] {
                builder.line_to(point(p.x, p.y));
            }
            builder.end(true);
        }
        let path = builder.build();

        let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
        self.tess
            .tessellate_path(
                &path,
                &options,
                &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| {
                    let p = v.position();
                    Vec2::new(p.x, p.y)
                }),
            )
            .map_err(|e| TessError::Triangulator(format!("lyon: {e:?}")))?;

        let polygons: Vec<Polygon> = buffers
            .indices
            .chunks_exact(3)
            .map(|tri| tri.iter().filter_map(|&i| buffers.vertices.get(i as usize).copied()).collect())
            .collect();
        log::trace!("lyon: {} rings -> {} triangles", rings.len(), polygons.len());
        Ok(polygons)
    }
}

/// Slab decomposition triangulator.
///
/// Every vertex and every edge crossing becomes a horizontal stop. Between two stops no edges
/// cross, so the edges spanning the slab have a fixed left-to-right order and the winding number
/// is constant on each span between neighbours. Runs of filled spans become one trapezoid.
/// Quadratic in the edge count; scratch buffers are reused across calls.
#[derive(Debug, Default)]
pub struct SweepTriangulator {
    edges: Vec<SweepEdge>,
    stops: Vec<f32>,
    active: Vec<SlabEdge>,
}

#[derive(Clone, Copy, Debug)]
struct SweepEdge {
    lo: Vec2,
    hi: Vec2,
    /// +1 when the contour runs towards +y along this edge.
    dir: i32,
}

impl SweepEdge {
    fn new(a: Vec2, b: Vec2) -> Option<SweepEdge> {
        if a.y < b.y {
            Some(SweepEdge { lo: a, hi: b, dir: 1 })
        } else if a.y > b.y {
            Some(SweepEdge { lo: b, hi: a, dir: -1 })
        } else {
            None
        }
    }

    #[inline(always)]
    fn x_at(&self, y: f32) -> f32 {
        let t = (y - self.lo.y) / (self.hi.y - self.lo.y);
        self.lo.x + (self.hi.x - self.lo.x) * t
    }
}

/// An edge clipped to the current slab.
#[derive(Clone, Copy, Debug)]
struct SlabEdge {
    bottom: f32,
    mid: f32,
    top: f32,
    dir: i32,
}

impl Triangulator for SweepTriangulator {
    fn triangulate(&mut self, contours: &[Contour], rule: FillRule) -> Result<Vec<Polygon>, TessError> {
        self.edges.clear();
        self.stops.clear();

        for ring in clean_rings(contours) {
            let n = ring.len();
            for i in 0..n {
                self.stops.push(ring[i].y);
                self.edges.extend(SweepEdge::new(ring[i], ring[(i + 1) % n]));
            }
        }
        for i in 0..self.edges.len() {
            for j in (i + 1)..self.edges.len() {
                if let Some(y) = crossing_y(&self.edges[i], &self.edges[j]) {
                    self.stops.push(y);
                }
            }
        }
        self.stops.sort_by(f32::total_cmp);
        self.stops.dedup_by(|a, b| *a - *b <= SLAB_EPS);

        let mut polygons: Vec<Polygon> = Vec::new();
        for pair in self.stops.windows(2) {
            let (y0, y1) = (pair[0], pair[1]);
            let ym = 0.5 * (y0 + y1);

            self.active.clear();
            for e in &self.edges {
                if e.lo.y < ym && e.hi.y > ym {
                    self.active.push(SlabEdge { bottom: e.x_at(y0), mid: e.x_at(ym), top: e.x_at(y1), dir: e.dir });
                }
            }
            self.active.sort_by(|a, b| a.mid.total_cmp(&b.mid));

            // Winding counts edges to the right of the span, so crossing an edge left to right
            // removes its contribution.
            let mut winding = 0;
            let mut run_start: Option<usize> = None;
            for (i, edge) in self.active.iter().enumerate() {
                winding -= edge.dir;
                match (run_start, rule.is_filled(winding)) {
                    (None, true) => run_start = Some(i),
                    (Some(s), false) => {
                        polygons.push(trapezoid(&self.active[s], edge, y0, y1));
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        log::trace!(
            "sweep: {} edges, {} slabs -> {} polygons",
            self.edges.len(),
            self.stops.len().saturating_sub(1),
            polygons.len()
        );
        Ok(polygons)
    }
}

/// Height at which two edges properly cross, if they do.
fn crossing_y(e: &SweepEdge, f: &SweepEdge) -> Option<f32> {
    if e.hi.y <= f.lo.y || f.hi.y <= e.lo.y {
        return None;
    }
    let (rx, ry) = ((e.hi.x - e.lo.x) as f64, (e.hi.y - e.lo.y) as f64);
    let (sx, sy) = ((f.hi.x - f.lo.x) as f64, (f.hi.y - f.lo.y) as f64);
    let denom = rx * sy - ry * sx;
    if denom.abs() < 1e-12 {
        return None;
    }
    let (qx, qy) = ((f.lo.x - e.lo.x) as f64, (f.lo.y - e.lo.y) as f64);
    let t = (qx * sy - qy * sx) / denom;
    let u = (qx * ry - qy * rx) / denom;
    if t <= 0.0 || t >= 1.0 || u <= 0.0 || u >= 1.0 {
        return None;
    }
    Some((e.lo.y as f64 + t * ry) as f32)
}

fn trapezoid(left: &SlabEdge, right: &SlabEdge, y0: f32, y1: f32) -> Polygon {
    let corners = [
        Vec2::new(left.bottom, y0),
        Vec2::new(right.bottom, y0),
        Vec2::new(right.top, y1),
        Vec2::new(left.top, y1),
    ];
    let mut poly = Polygon::new();
    for p in corners {
        if !poly.last().is_some_and(|q: &Vec2| q.approx_eq(p, DUPLICATE_EPS)) {
            poly.push(p);
        }
    }
    poly
}

/// Triangulate `contours` and fan-decompose the resulting polygon elements.
pub fn tessellate_fill<T: Triangulator + ?Sized>(
    contours: &[Contour],
    rule: FillRule,
    triangulator: &mut T,
) -> Result<FillGeometry, TessError> {
    let polygons = triangulator.triangulate(contours, rule)?;

    let mut triangles: Vec<[Vec2; 3]> = Vec::new();
    let mut bounds = BoundsBuilder::new();
    for poly in &polygons {
        debug_assert!(poly.len() <= MAX_POLYGON_VERTICES);
        if poly.len() < 3 {
            continue;
        }
        let first = poly[0];
        bounds.add(first);
        for pair in poly[1..].windows(2) {
            bounds.add(pair[0]);
            bounds.add(pair[1]);
            triangles.push([first, pair[0], pair[1]]);
        }
    }

    log::trace!("fill: {} contours -> {} triangles", contours.len(), triangles.len());
    Ok(FillGeometry { triangles, bounds: bounds.finish() })
}

// -----------------
// Ring cleanup
// -----------------

/// Cleaned, finite rings with at least three corners. Closing edges stay implicit.
fn clean_rings(contours: &[Contour]) -> Vec<Vec<Vec2>> {
    contours
        .iter()
        .map(|c| {
            let mut ring = c.points.clone();
            normalize_ring(&mut ring);
            simplify_ring(&mut ring);
            ring
        })
        .filter(|r| r.len() >= 3 && r.iter().all(|p| p.is_finite()))
        .collect()
}

/// Remove a duplicated closing vertex if present.
fn normalize_ring(ring: &mut Vec<Vec2>) {
    while ring.len() >= 2 && ring[0].approx_eq(ring[ring.len() - 1], DUPLICATE_EPS) {
        ring.pop();
    }
}

/// Drop consecutive duplicates and collinear points. A ring that is collinear all the way
/// round ends up with fewer than three points.
fn simplify_ring(ring: &mut Vec<Vec2>) {
    if ring.len() < 3 {
        return;
    }

    let mut out: Vec<Vec2> = Vec::with_capacity(ring.len());
    for &p in ring.iter() {
        if out.last().map(|q| p.approx_eq(*q, DUPLICATE_EPS)).unwrap_or(false) {
            continue;
        }
        out.push(p);
    }
    if out.len() >= 2 && out[0].approx_eq(out[out.len() - 1], DUPLICATE_EPS) {
        out.pop();
    }
    if out.len() < 3 {
        *ring = out;
        return;
    }

    let n = out.len();
    let mut kept: Vec<Vec2> = Vec::with_capacity(n);
    for i in 0..n {
        let prev = out[(i + n - 1) % n];
        let cur = out[i];
        let next = out[(i + 1) % n];
        let a = cur - prev;
        let b = next - cur;
        if a.cross(b).abs() <= COLLINEAR_SIN_EPS * a.length() * b.length() {
            continue;
        }
        kept.push(cur);
    }
    *ring = kept;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour(points: &[(f32, f32)]) -> Contour {
        Contour { points: points.iter().map(|&(x, y)| Vec2::new(x, y)).collect(), closed: true }
    }

    fn tri_area(t: &[Vec2; 3]) -> f32 {
        (t[1] - t[0]).cross(t[2] - t[0]).abs() * 0.5
    }

    fn area(tris: &[[Vec2; 3]]) -> f32 {
        tris.iter().map(tri_area).sum()
    }

    /// Number of triangles with `p` strictly inside.
    fn coverage(tris: &[[Vec2; 3]], p: Vec2) -> usize {
        tris.iter()
            .filter(|t| {
                let d = [(t[1] - t[0]).cross(p - t[0]), (t[2] - t[1]).cross(p - t[1]), (t[0] - t[2]).cross(p - t[2])];
                d.iter().all(|&v| v > 0.0) || d.iter().all(|&v| v < 0.0)
            })
            .count()
    }

    fn square(x: f32, y: f32, s: f32, ccw: bool) -> Contour {
        let mut pts = vec![(x, y), (x + s, y), (x + s, y + s), (x, y + s)];
        if !ccw {
            pts.reverse();
        }
        contour(&pts)
    }

    /// Five-pointed star drawn in one stroke, counter-clockwise, tips on radius `r`.
    fn pentagram(r: f32, ccw: bool) -> Contour {
        let mut pts: Vec<(f32, f32)> = (0..5)
            .map(|k| {
                let a = (90.0 + 144.0 * k as f32).to_radians();
                (r * a.cos(), r * a.sin())
            })
            .collect();
        if !ccw {
            pts.reverse();
        }
        contour(&pts)
    }

    fn each_triangulator(mut check: impl FnMut(&str, &mut dyn Triangulator)) {
        check("lyon", &mut LyonTriangulator::default());
        check("sweep", &mut SweepTriangulator::default());
    }

    #[test]
    fn rectangle_under_every_rule() {
        each_triangulator(|name, t| {
            for rule in [FillRule::NonZero, FillRule::EvenOdd, FillRule::Positive] {
                let geo = tessellate_fill(&[square(0.0, 0.0, 10.0, true)], rule, t).unwrap();
                assert_eq!(geo.triangles.len(), 2, "{name} {rule:?}");
                assert!((area(&geo.triangles) - 100.0).abs() < 1e-3, "{name} {rule:?}");
            }
        });
    }

    #[test]
    fn even_odd_punches_hole() {
        each_triangulator(|name, t| {
            let contours = [square(0.0, 0.0, 10.0, true), square(3.0, 3.0, 4.0, true)];
            let geo = tessellate_fill(&contours, FillRule::EvenOdd, t).unwrap();
            assert!((area(&geo.triangles) - 84.0).abs() < 1e-2, "{name}");
            assert_eq!(coverage(&geo.triangles, Vec2::new(4.9, 5.3)), 0, "{name}");
        });
    }

    #[test]
    fn non_zero_respects_direction() {
        each_triangulator(|name, t| {
            // Same direction: inner square is still filled, but only once.
            let same = [square(0.0, 0.0, 10.0, true), square(3.0, 3.0, 4.0, true)];
            let geo = tessellate_fill(&same, FillRule::NonZero, t).unwrap();
            assert!((area(&geo.triangles) - 100.0).abs() < 1e-2, "{name}");
            assert_eq!(coverage(&geo.triangles, Vec2::new(4.9, 5.3)), 1, "{name}");

            // Opposite direction: inner square becomes a hole.
            let opposite = [square(0.0, 0.0, 10.0, true), square(3.0, 3.0, 4.0, false)];
            let geo = tessellate_fill(&opposite, FillRule::NonZero, t).unwrap();
            assert!((area(&geo.triangles) - 84.0).abs() < 1e-2, "{name}");
        });
    }

    #[test]
    fn positive_drops_clockwise_contours() {
        each_triangulator(|name, t| {
            let geo = tessellate_fill(&[square(0.0, 0.0, 10.0, false)], FillRule::Positive, t).unwrap();
            assert!(geo.triangles.is_empty(), "{name}");
        });
    }

    #[test]
    fn overlapping_squares_follow_the_rule() {
        let only_a = Vec2::new(2.3, 3.1);
        let overlap = Vec2::new(7.3, 8.1);
        let only_b = Vec2::new(12.3, 13.1);
        let outside = Vec2::new(2.3, 13.1);

        // (second square counter-clockwise, rule, covered area, overlap filled)
        let cases = [
            (true, FillRule::NonZero, 175.0, true),
            (true, FillRule::EvenOdd, 150.0, false),
            (true, FillRule::Positive, 175.0, true),
            (false, FillRule::NonZero, 150.0, false),
            (false, FillRule::EvenOdd, 150.0, false),
            (false, FillRule::Positive, 75.0, false),
        ];
        each_triangulator(|name, t| {
            for (ccw, rule, expected, overlap_filled) in cases {
                let contours = [square(0.0, 0.0, 10.0, true), square(5.0, 5.0, 10.0, ccw)];
                let geo = tessellate_fill(&contours, rule, t).unwrap();
                let tris = &geo.triangles;
                let label = format!("{name} {rule:?} ccw={ccw}");

                assert!((area(tris) - expected).abs() < 1e-2, "{label}: area {}", area(tris));
                assert_eq!(coverage(tris, only_a), 1, "{label}");
                assert_eq!(coverage(tris, overlap), overlap_filled as usize, "{label}");
                assert_eq!(coverage(tris, only_b), (ccw || rule != FillRule::Positive) as usize, "{label}");
                assert_eq!(coverage(tris, outside), 0, "{label}");
            }
        });
    }

    #[test]
    fn pentagram_follows_the_rule() {
        let r_outer = 10.0f32;
        let r_inner = r_outer * 72f32.to_radians().cos() / 36f32.to_radians().cos();
        let star_area = 5.0 * r_outer * r_inner * 36f32.to_radians().sin();
        let pentagon_area = 2.5 * r_inner * r_inner * 72f32.to_radians().sin();
        let centre = Vec2::new(0.3, 0.2);
        let tip = Vec2::new(0.2, 7.7);

        each_triangulator(|name, t| {
            for (rule, expected, centre_filled) in [
                (FillRule::NonZero, star_area, 1),
                (FillRule::Positive, star_area, 1),
                (FillRule::EvenOdd, star_area - pentagon_area, 0),
            ] {
                let geo = tessellate_fill(&[pentagram(r_outer, true)], rule, t).unwrap();
                let tris = &geo.triangles;
                assert!((area(tris) - expected).abs() < 2e-2, "{name} {rule:?}: area {} vs {expected}", area(tris));
                assert_eq!(coverage(tris, tip), 1, "{name} {rule:?}");
                assert_eq!(coverage(tris, centre), centre_filled, "{name} {rule:?}");
                assert!((geo.bounds.height - r_outer * (1.0 + 54f32.to_radians().sin())).abs() < 1e-3);
            }

            let geo = tessellate_fill(&[pentagram(r_outer, false)], FillRule::Positive, t).unwrap();
            assert!(geo.triangles.is_empty(), "{name}");
        });
    }

    #[test]
    fn bowtie_keeps_both_lobes() {
        // Net signed area is zero; each lobe still fills.
        let bowtie = contour(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
        each_triangulator(|name, t| {
            for rule in [FillRule::NonZero, FillRule::EvenOdd] {
                let geo = tessellate_fill(&[bowtie.clone()], rule, t).unwrap();
                assert!((area(&geo.triangles) - 50.0).abs() < 1e-2, "{name} {rule:?}");
                assert_eq!(coverage(&geo.triangles, Vec2::new(2.1, 4.7)), 1, "{name} {rule:?}");
                assert_eq!(coverage(&geo.triangles, Vec2::new(4.7, 2.1)), 0, "{name} {rule:?}");
            }
        });
    }

    #[test]
    fn degenerate_contours_produce_nothing() {
        let inputs = [
            contour(&[(1.0, 1.0)]),
            contour(&[(0.0, 0.0), (5.0, 0.0)]),
            contour(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]),
            contour(&[(2.0, 2.0), (2.0, 2.0), (2.0, 2.0), (2.0, 2.0)]),
        ];
        each_triangulator(|name, t| {
            for c in inputs.clone() {
                let geo = tessellate_fill(&[c], FillRule::NonZero, t).unwrap();
                assert!(geo.triangles.is_empty(), "{name}");
                assert_eq!(geo.bounds, crate::geom::Bounds::default());
            }
            let geo = tessellate_fill(&[], FillRule::EvenOdd, t).unwrap();
            assert!(geo.triangles.is_empty());
        });
    }

    #[test]
    fn collinear_points_are_culled() {
        let mut ring: Vec<Vec2> = [(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]
            .iter()
            .map(|&(x, y)| Vec2::new(x, y))
            .collect();
        normalize_ring(&mut ring);
        simplify_ring(&mut ring);
        assert_eq!(ring.len(), 4);

        let mut line: Vec<Vec2> = [(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)].iter().map(|&(x, y)| Vec2::new(x, y)).collect();
        simplify_ring(&mut line);
        assert!(line.len() < 3);
    }

    #[test]
    fn crossing_height_is_found() {
        let a = SweepEdge::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0)).unwrap();
        let b = SweepEdge::new(Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)).unwrap();
        assert_eq!(b.dir, 1);
        assert!((crossing_y(&a, &b).unwrap() - 5.0).abs() < 1e-5);

        // Touching at an endpoint is not a crossing.
        let c = SweepEdge::new(Vec2::new(10.0, 10.0), Vec2::new(20.0, 0.0)).unwrap();
        assert_eq!(c.dir, -1);
        assert!(crossing_y(&a, &c).is_none());
        assert!(SweepEdge::new(Vec2::new(0.0, 1.0), Vec2::new(5.0, 1.0)).is_none());
    }

    struct Hexagon;

    impl Triangulator for Hexagon {
        fn triangulate(&mut self, _: &[Contour], _: FillRule) -> Result<Vec<Polygon>, TessError> {
            let mut poly = Polygon::new();
            for i in 0..6 {
                let a = (i as f32 * 60.0).to_radians();
                poly.push(Vec2::new(a.cos(), a.sin()));
            }
            Ok(vec![poly])
        }
    }

    #[test]
    fn polygons_are_fan_decomposed() {
        let geo = tessellate_fill(&[], FillRule::NonZero, &mut Hexagon).unwrap();
        assert_eq!(geo.triangles.len(), 4);
        assert!(geo.triangles.iter().all(|t| t[0] == Vec2::new(1.0, 0.0)));
        assert!((geo.bounds.width - 2.0).abs() < 1e-5);
    }
}
