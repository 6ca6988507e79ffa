//! Mesh assembly: transform, quantize, canonicalize, dedup.
//!
//! Design rule: the output `Mesh` is the whole contract with the rendering side. It carries no
//! segment kinds, winding rules or stroke styles.

mod cull;
mod triangle;

use std::collections::HashMap;

pub use cull::cull_covered;
pub use triangle::{QBox, QPoint, Triangle};

use crate::geom::{Bounds, BoundsBuilder, Matrix, Vec2};

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("out of memory reserving {what} ({count} entries)")]
    OutOfMemory { what: &'static str, count: usize },
    #[error("mesh exceeds the u32 index range")]
    TooManyVertices,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
    pub position: Vec2,
    pub color: [u8; 4],
}

/// Finalized geometry: deduplicated vertices, triangle-order indices and device bounds.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bounds: Bounds,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Triangle `i` as device-space positions.
    pub fn triangle(&self, i: usize) -> Option<[Vec2; 3]> {
        let idx = self.indices.get(i * 3..i * 3 + 3)?;
        let v = |k: usize| self.vertices.get(idx[k] as usize).map(|v| v.position);
        Some([v(0)?, v(1)?, v(2)?])
    }
}

/// Builder position saved by `MeshBuilder::checkpoint`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    triangles: usize,
    next_id: u32,
    rejected: usize,
}

/// Accumulates transformed triangles from one or many paths and finalizes them into a `Mesh`.
#[derive(Debug)]
pub struct MeshBuilder {
    precision: f32,
    cull_overlaps: bool,
    triangles: Vec<Triangle>,
    next_id: u32,
    rejected: usize,
}

impl MeshBuilder {
    pub const DEFAULT_PRECISION: f32 = 100.0;

    pub fn new(precision: f32, cull_overlaps: bool) -> Self {
        let precision = if precision.is_finite() && precision > 0.0 { precision } else { Self::DEFAULT_PRECISION };
        Self { precision, cull_overlaps, triangles: Vec::new(), next_id: 0, rejected: 0 }
    }

    pub fn precision(&self) -> f32 {
        self.precision
    }

    /// Canonical triangles pushed so far.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Degenerate triangles dropped so far.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Current fill level, for `rollback`.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint { triangles: self.triangles.len(), next_id: self.next_id, rejected: self.rejected }
    }

    /// Forget everything pushed since `mark` was taken.
    pub fn rollback(&mut self, mark: Checkpoint) {
        self.triangles.truncate(mark.triangles);
        self.next_id = mark.next_id;
        self.rejected = mark.rejected;
    }

    /// Transform local triangles into device space and keep the canonical, non-degenerate ones.
    pub fn push_triangles(&mut self, triangles: &[[Vec2; 3]], transform: &Matrix, color: [u8; 4]) -> Result<(), MeshError> {
        self.triangles
            .try_reserve(triangles.len())
            .map_err(|_| MeshError::OutOfMemory { what: "triangles", count: triangles.len() })?;

        let identity = transform.is_identity();
        for tri in triangles {
            let pts = if identity {
                tri.map(|p| QPoint::quantize(p, self.precision))
            } else {
                tri.map(|p| QPoint::quantize(transform.apply(p), self.precision))
            };
            match Triangle::new(pts, color, self.next_id).canonicalize() {
                Some(t) => {
                    self.triangles.push(t);
                    self.next_id = self.next_id.wrapping_add(1);
                }
                None => self.rejected += 1,
            }
        }
        Ok(())
    }

    /// Dedup vertices by (quantized position, color) and emit the index buffer.
    pub fn finish(mut self) -> Result<Mesh, MeshError> {
        let culled = if self.cull_overlaps { cull_covered(&mut self.triangles) } else { 0 };
        let live = self.triangles.len() - culled;

        let mut mesh = Mesh::default();
        let mut seen: HashMap<(QPoint, [u8; 4]), u32> = HashMap::new();
        mesh.indices
            .try_reserve_exact(live * 3)
            .map_err(|_| MeshError::OutOfMemory { what: "indices", count: live * 3 })?;
        // Vertices are usually shared; start at one per triangle and let it grow.
        mesh.vertices
            .try_reserve(live)
            .map_err(|_| MeshError::OutOfMemory { what: "vertices", count: live })?;
        seen.try_reserve(live)
            .map_err(|_| MeshError::OutOfMemory { what: "vertex map", count: live })?;

        let mut bounds = BoundsBuilder::new();
        for t in self.triangles.iter().filter(|t| !t.is_deleted()) {
            for &p in &t.pts {
                let index = match seen.get(&(p, t.color)) {
                    Some(&i) => i,
                    None => {
                        let i = u32::try_from(mesh.vertices.len()).map_err(|_| MeshError::TooManyVertices)?;
                        let position = p.to_vec2(self.precision);
                        mesh.vertices
                            .try_reserve(1)
                            .map_err(|_| MeshError::OutOfMemory { what: "vertices", count: i as usize + 1 })?;
                        mesh.vertices.push(MeshVertex { position, color: t.color });
                        bounds.add(position);
                        seen.insert((p, t.color), i);
                        i
                    }
                };
                mesh.indices.push(index);
            }
        }
        mesh.bounds = bounds.finish();

        log::debug!(
            "mesh finalized: {} triangles ({} degenerate, {} culled), {} vertices",
            mesh.triangle_count(),
            self.rejected,
            culled,
            mesh.vertices.len()
        );
        Ok(mesh)
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PRECISION, false)
    }
}
