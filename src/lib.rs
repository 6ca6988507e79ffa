//! vgmesh (staticlib + rlib)
//!
//! OpenVG-style path tessellation: segment streams in, deduplicated triangle meshes out.
//! The GPU binding layer links the staticlib through the small C ABI in `ffi`; Rust callers
//! use the modules directly.
//!
//! Design rule: keep this file thin.

pub mod ffi;
pub mod geom;
pub mod mesh;
pub mod path;
pub mod render;
pub mod scene;
pub mod tess;
pub mod util;

pub use geom::{Bounds, Matrix, Vec2};
pub use mesh::{Mesh, MeshBuilder, MeshError, MeshVertex};
pub use path::{Path, PathError, PathSegment, SegmentKind};
pub use render::{draw_path, Batch, BuildError, Paint, PaintModes, RenderState, Rgba};
pub use scene::{DrawItem, Scene};
pub use tess::{CapStyle, FillRule, JoinStyle, StrokeMode, StrokeStyle, TessError};
pub use util::config::{tess_config, TessConfig};

// Export C ABI symbols.
pub use ffi::exports::*;
