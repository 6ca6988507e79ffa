//! Path objects: segment/coordinate streams, style, and lazily rebuilt local geometry.

mod segment;

pub use segment::{coordinate_count, PathSegment, SegmentKind};

use crate::geom::Vec2;
use crate::tess::flatten::{flatten_arc, flatten_cubic, flatten_quad, ArcKind, ArcParams};
use crate::tess::{
    extrude_stroke, tessellate_fill, Contour, FillGeometry, FillRule, LyonTriangulator, StrokeGeometry,
    StrokeMode, StrokeStyle, TessError, Triangulator,
};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("segments need {expected} coordinates, got {found}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("out of memory while appending {0} coordinates")]
    OutOfMemory(usize),
}

#[derive(Clone, Debug)]
struct CachedFill {
    iterations: u32,
    geometry: FillGeometry,
}

#[derive(Clone, Debug)]
struct CachedStroke {
    iterations: u32,
    mode: StrokeMode,
    geometry: StrokeGeometry,
}

/// A vector path: segment commands, their coordinates, fill/stroke style and cached geometry.
///
/// Geometry is built in path-local units on first request and cached until the segment data
/// or the relevant style changes.
#[derive(Clone, Debug, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
    coords: Vec<f32>,
    fill_rule: FillRule,
    stroke: StrokeStyle,
    fill_dirty: bool,
    stroke_dirty: bool,
    fill_cache: Option<CachedFill>,
    stroke_cache: Option<CachedStroke>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn coords(&self) -> &[f32] {
        &self.coords
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append segments and their coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `coords.len()` differs from the summed arity of `segments`.
    pub fn append_segments(&mut self, segments: &[PathSegment], coords: &[f32]) {
        if let Err(e) = self.try_append_segments(segments, coords) {
            panic!("malformed segment stream: {e}");
        }
    }

    /// Checked variant of [`Path::append_segments`].
    pub fn try_append_segments(&mut self, segments: &[PathSegment], coords: &[f32]) -> Result<(), PathError> {
        let expected = coordinate_count(segments);
        if expected != coords.len() {
            return Err(PathError::ArityMismatch { expected, found: coords.len() });
        }
        self.segments
            .try_reserve(segments.len())
            .map_err(|_| PathError::OutOfMemory(coords.len()))?;
        self.coords.try_reserve(coords.len()).map_err(|_| PathError::OutOfMemory(coords.len()))?;
        self.segments.extend_from_slice(segments);
        self.coords.extend_from_slice(coords);
        self.mark_dirty();
        Ok(())
    }

    /// Append raw OpenVG opcodes. Unknown opcodes are logged and skipped.
    ///
    /// Returns the number of skipped opcodes.
    pub fn append_opcodes(&mut self, opcodes: &[u8], coords: &[f32]) -> Result<usize, PathError> {
        let mut segments: Vec<PathSegment> = Vec::with_capacity(opcodes.len());
        let mut skipped = 0usize;
        for &op in opcodes {
            match PathSegment::from_opcode(op) {
                Some(seg) => segments.push(seg),
                None => {
                    log::warn!("unknown command 0x{op:02x}, skipping");
                    skipped += 1;
                }
            }
        }
        self.try_append_segments(&segments, coords)?;
        Ok(skipped)
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.coords.clear();
        self.mark_dirty();
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        if self.fill_rule != rule {
            self.fill_rule = rule;
            self.fill_dirty = true;
        }
    }

    pub fn stroke_style(&self) -> &StrokeStyle {
        &self.stroke
    }

    pub fn set_stroke_style(&mut self, style: StrokeStyle) {
        if self.stroke != style {
            self.stroke = style;
            self.stroke_dirty = true;
        }
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.set_stroke_style(StrokeStyle { width, ..self.stroke });
    }

    pub fn is_fill_dirty(&self) -> bool {
        self.fill_dirty || self.fill_cache.is_none()
    }

    pub fn is_stroke_dirty(&self) -> bool {
        self.stroke_dirty || self.stroke_cache.is_none()
    }

    fn mark_dirty(&mut self) {
        self.fill_dirty = true;
        self.stroke_dirty = true;
    }

    /// Cached fill triangles, rebuilt with lyon when stale.
    pub fn fill_geometry(&mut self, iterations: u32) -> Result<&FillGeometry, TessError> {
        self.fill_geometry_with(iterations, &mut LyonTriangulator::default())
    }

    /// Cached fill triangles, rebuilt with `triangulator` when stale.
    pub fn fill_geometry_with<T: Triangulator + ?Sized>(
        &mut self,
        iterations: u32,
        triangulator: &mut T,
    ) -> Result<&FillGeometry, TessError> {
        let cached = self.fill_cache.take().filter(|c| !self.fill_dirty && c.iterations == iterations);
        let cache = match cached {
            Some(cache) => cache,
            None => {
                let contours = self.contours(iterations);
                let geometry = tessellate_fill(&contours, self.fill_rule, triangulator)?;
                log::debug!(
                    "fill rebuilt: {} segments, {} contours, {} triangles",
                    self.segments.len(),
                    contours.len(),
                    geometry.triangles.len()
                );
                self.fill_dirty = false;
                CachedFill { iterations, geometry }
            }
        };
        Ok(&self.fill_cache.insert(cache).geometry)
    }

    /// Cached stroke triangles, rebuilt when stale.
    pub fn stroke_geometry(&mut self, iterations: u32, mode: StrokeMode) -> &StrokeGeometry {
        let cached = self
            .stroke_cache
            .take()
            .filter(|c| !self.stroke_dirty && c.iterations == iterations && c.mode == mode);
        let cache = match cached {
            Some(cache) => cache,
            None => {
                let contours = self.contours(iterations);
                let geometry = extrude_stroke(&contours, &self.stroke, mode);
                log::debug!(
                    "stroke rebuilt: {} segments, {} polylines, {} triangles",
                    self.segments.len(),
                    contours.len(),
                    geometry.triangles.len()
                );
                self.stroke_dirty = false;
                CachedStroke { iterations, mode, geometry }
            }
        };
        &self.stroke_cache.insert(cache).geometry
    }

    /// Flatten the segment stream into contours, sampling curves with `iterations` steps.
    pub fn contours(&self, iterations: u32) -> Vec<Contour> {
        let mut b = ContourBuilder::default();
        let mut coords = self.coords.iter().copied();
        let mut next = || coords.next().unwrap_or(0.0);

        for seg in &self.segments {
            let origin = if seg.relative { b.current } else { Vec2::ZERO };
            let point = |n: &mut dyn FnMut() -> f32| {
                let x = n();
                let y = n();
                origin + Vec2::new(x, y)
            };

            match seg.kind {
                SegmentKind::ClosePath => b.close(),
                SegmentKind::MoveTo => {
                    let p = point(&mut next);
                    b.move_to(p);
                }
                SegmentKind::LineTo => {
                    let p = point(&mut next);
                    b.line_to(p);
                }
                SegmentKind::HLineTo => {
                    let x = origin.x + next();
                    let y = b.current.y;
                    b.line_to(Vec2::new(x, y));
                }
                SegmentKind::VLineTo => {
                    let x = b.current.x;
                    let y = origin.y + next();
                    b.line_to(Vec2::new(x, y));
                }
                SegmentKind::QuadTo => {
                    let c = point(&mut next);
                    let p1 = point(&mut next);
                    b.quad_to(c, p1, iterations);
                }
                SegmentKind::SmoothQuadTo => {
                    let c = b.reflected_quad_control();
                    let p1 = point(&mut next);
                    b.quad_to(c, p1, iterations);
                }
                SegmentKind::CubicTo => {
                    let c1 = point(&mut next);
                    let c2 = point(&mut next);
                    let p3 = point(&mut next);
                    b.cubic_to(c1, c2, p3, iterations);
                }
                SegmentKind::SmoothCubicTo => {
                    let c1 = b.reflected_cubic_control();
                    let c2 = point(&mut next);
                    let p3 = point(&mut next);
                    b.cubic_to(c1, c2, p3, iterations);
                }
                SegmentKind::SmallCCWArcTo
                | SegmentKind::SmallCWArcTo
                | SegmentKind::LargeCCWArcTo
                | SegmentKind::LargeCWArcTo => {
                    let rx = next();
                    let ry = next();
                    let rotation = next();
                    let end = point(&mut next);
                    let kind = match seg.kind {
                        SegmentKind::SmallCCWArcTo => ArcKind::SmallCCW,
                        SegmentKind::SmallCWArcTo => ArcKind::SmallCW,
                        SegmentKind::LargeCCWArcTo => ArcKind::LargeCCW,
                        _ => ArcKind::LargeCW,
                    };
                    b.arc_to(ArcParams { rx, ry, rotation, kind, end }, iterations);
                }
            }
        }

        b.finish()
    }
}

/// Tracks the current point, smooth-curve controls and the open contour while flattening.
#[derive(Default)]
struct ContourBuilder {
    contours: Vec<Contour>,
    points: Vec<Vec2>,
    current: Vec2,
    start: Vec2,
    /// Open contours; 0 or 1.
    open: u32,
    has_segment: bool,
    last_quad_control: Option<Vec2>,
    last_cubic_control: Option<Vec2>,
}

impl ContourBuilder {
    fn move_to(&mut self, p: Vec2) {
        self.end_contour(false);
        self.points.push(p);
        self.current = p;
        self.start = p;
        self.open += 1;
        self.reset_controls();
    }

    /// Drawing segments after ClosePath (or on an empty path) continue from the current point.
    fn ensure_open(&mut self) {
        if self.open == 0 {
            let p = self.current;
            self.points.push(p);
            self.start = p;
            self.open += 1;
        }
        self.has_segment = true;
    }

    fn line_to(&mut self, p: Vec2) {
        self.ensure_open();
        self.points.push(p);
        self.current = p;
        self.reset_controls();
    }

    fn quad_to(&mut self, c: Vec2, p1: Vec2, iterations: u32) {
        self.ensure_open();
        flatten_quad(self.current, c, p1, iterations, &mut self.points);
        self.current = p1;
        self.last_cubic_control = None;
        self.last_quad_control = Some(c);
    }

    fn cubic_to(&mut self, c1: Vec2, c2: Vec2, p3: Vec2, iterations: u32) {
        self.ensure_open();
        flatten_cubic(self.current, c1, c2, p3, iterations, &mut self.points);
        self.current = p3;
        self.last_quad_control = None;
        self.last_cubic_control = Some(c2);
    }

    fn arc_to(&mut self, arc: ArcParams, iterations: u32) {
        self.ensure_open();
        let samples = flatten_arc(self.current, &arc, iterations, &mut self.points);
        if samples == 0 {
            log::trace!("arc degraded to a line towards ({}, {})", arc.end.x, arc.end.y);
        }
        self.current = arc.end;
        self.reset_controls();
    }

    fn reflected_quad_control(&self) -> Vec2 {
        match self.last_quad_control {
            Some(c) => self.current * 2.0 - c,
            None => self.current,
        }
    }

    fn reflected_cubic_control(&self) -> Vec2 {
        match self.last_cubic_control {
            Some(c) => self.current * 2.0 - c,
            None => self.current,
        }
    }

    fn reset_controls(&mut self) {
        self.last_quad_control = None;
        self.last_cubic_control = None;
    }

    fn close(&mut self) {
        if self.open > 0 {
            self.has_segment = true;
        }
        self.end_contour(true);
        self.current = self.start;
        self.reset_controls();
    }

    fn end_contour(&mut self, closed: bool) {
        if self.open == 0 {
            return;
        }
        let points = std::mem::take(&mut self.points);
        if self.has_segment {
            self.contours.push(Contour { points, closed });
        }
        self.has_segment = false;
        self.open -= 1;
    }

    fn finish(mut self) -> Vec<Contour> {
        // Implicitly close a trailing open contour.
        self.end_contour(false);
        debug_assert_eq!(self.open, 0, "contour left open after flattening");
        self.contours
    }
}
