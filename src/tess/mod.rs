//! Path-local tessellation: curve flattening, fill triangulation and stroke extrusion.
//!
//! Output types are plain triangle lists in path-local units; the mesh assembler applies
//! the transform and color later.

pub mod fill;
pub mod flatten;
pub mod stroke;

use crate::geom::{Bounds, Vec2};

pub use fill::{tessellate_fill, FillRule, LyonTriangulator, Polygon, SweepTriangulator, Triangulator};
pub use flatten::{ArcKind, ArcParams};
pub use stroke::{extrude_stroke, CapStyle, JoinStyle, StrokeMode, StrokeStyle};

#[derive(Debug, thiserror::Error)]
pub enum TessError {
    #[error("triangulator failed: {0}")]
    Triangulator(String),
}

/// A run of connected vertices between MoveTo/ClosePath boundaries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<Vec2>,
    /// Explicitly closed with ClosePath. Fill treats every contour as closed regardless.
    pub closed: bool,
}

/// Triangulated fill area in path-local space.
#[derive(Clone, Debug, Default)]
pub struct FillGeometry {
    pub triangles: Vec<[Vec2; 3]>,
    pub bounds: Bounds,
}

/// Triangulated stroke outline in path-local space.
#[derive(Clone, Debug, Default)]
pub struct StrokeGeometry {
    pub triangles: Vec<[Vec2; 3]>,
    pub bounds: Bounds,
}
