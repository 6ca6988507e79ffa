//! Draw-state plumbing between paths and the mesh assembler.
//!
//! Design rule: everything a draw needs travels in an explicit `RenderState`; there is no
//! process-wide "current" transform or paint.

mod paint;

pub use paint::{GradientStop, Paint, PaintModes, Rgba};

use crate::geom::Matrix;
use crate::mesh::{Mesh, MeshBuilder, MeshError};
use crate::path::{Path, PathError};
use crate::tess::TessError;
use crate::util::config::{tess_config, TessConfig};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("fill tessellation failed: {0}")]
    Tess(#[from] TessError),
    #[error("mesh assembly failed: {0}")]
    Mesh(#[from] MeshError),
}

/// Transform, paints and tessellation settings for one draw.
#[derive(Clone, Debug)]
pub struct RenderState {
    pub transform: Matrix,
    pub fill_paint: Paint,
    pub stroke_paint: Paint,
    pub config: TessConfig,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(TessConfig::default())
    }
}

impl RenderState {
    /// Identity transform with the OpenVG default paint (opaque black) for both targets.
    pub fn new(config: TessConfig) -> Self {
        Self {
            transform: Matrix::identity(),
            fill_paint: Paint::default(),
            stroke_paint: Paint::default(),
            config: config.sanitized(),
        }
    }

    /// State using the process-wide config.
    pub fn from_global_config() -> Self {
        Self::new(*tess_config())
    }
}

/// Build and finalize one path into its own mesh.
pub fn draw_path(path: &mut Path, modes: PaintModes, state: &RenderState) -> Result<Mesh, BuildError> {
    let mut builder = MeshBuilder::new(state.config.precision, state.config.cull_overlaps);
    append_path(&mut builder, path, modes, state)?;
    Ok(builder.finish()?)
}

/// Fill first, stroke on top. A path either lands in `builder` whole or not at all.
fn append_path(builder: &mut MeshBuilder, path: &mut Path, modes: PaintModes, state: &RenderState) -> Result<(), BuildError> {
    all_or_nothing(builder, |b| push_path(b, path, modes, state))
}

/// Run `draw` on `builder` and drop whatever it pushed if it fails.
fn all_or_nothing<E>(
    builder: &mut MeshBuilder,
    draw: impl FnOnce(&mut MeshBuilder) -> Result<(), E>,
) -> Result<(), E> {
    let mark = builder.checkpoint();
    let result = draw(builder);
    if result.is_err() {
        builder.rollback(mark);
    }
    result
}

fn push_path(builder: &mut MeshBuilder, path: &mut Path, modes: PaintModes, state: &RenderState) -> Result<(), BuildError> {
    let cfg = &state.config;
    log::trace!(
        "draw: {} segments, fill={} stroke={}",
        path.segments().len(),
        modes.fill,
        modes.stroke
    );

    if modes.fill {
        let geometry = path.fill_geometry(cfg.fill_iterations)?;
        builder.push_triangles(&geometry.triangles, &state.transform, state.fill_paint.vertex_color())?;
    }
    if modes.stroke {
        let geometry = path.stroke_geometry(cfg.stroke_iterations, cfg.stroke_mode);
        builder.push_triangles(&geometry.triangles, &state.transform, state.stroke_paint.vertex_color())?;
    }
    Ok(())
}

/// Accumulates many paths into one mesh (one draw call on the rendering side).
#[derive(Debug)]
pub struct Batch {
    builder: MeshBuilder,
    paths: usize,
}

impl Batch {
    /// Quantization and culling settings come from `config`; per-draw settings from each `add`.
    pub fn new(config: &TessConfig) -> Self {
        let config = config.sanitized();
        Self { builder: MeshBuilder::new(config.precision, config.cull_overlaps), paths: 0 }
    }

    pub fn add(&mut self, path: &mut Path, modes: PaintModes, state: &RenderState) -> Result<(), BuildError> {
        append_path(&mut self.builder, path, modes, state)?;
        self.paths += 1;
        Ok(())
    }

    /// Number of paths added.
    pub fn len(&self) -> usize {
        self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths == 0
    }

    pub fn finish(self) -> Result<Mesh, BuildError> {
        let paths = self.paths;
        let mesh = self.builder.finish()?;
        log::debug!("batch finalized: {paths} paths, {} triangles", mesh.triangle_count());
        Ok(mesh)
    }
}
