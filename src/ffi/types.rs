use core::ffi::c_char;

use crate::geom::{Bounds, Matrix};
use crate::mesh::MeshVertex;
use crate::render::{Paint, PaintModes, Rgba};
use crate::tess::{CapStyle, FillRule, JoinStyle, StrokeStyle};

pub const VGM_OK: i32 = 0;
pub const VGM_ERR_NULL: i32 = -1;
pub const VGM_ERR_ARITY: i32 = -2;
pub const VGM_ERR_BAD_ARG: i32 = -3;
pub const VGM_ERR_BUILD: i32 = -4;

/// One output vertex as the GPU side uploads it.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VgmVertex {
    pub x: f32,
    pub y: f32,
    pub rgba: [u8; 4],
}

impl From<&MeshVertex> for VgmVertex {
    fn from(v: &MeshVertex) -> Self {
        Self { x: v.position.x, y: v.position.y, rgba: v.color }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VgmBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<Bounds> for VgmBounds {
    fn from(b: Bounds) -> Self {
        Self { min_x: b.min_x, min_y: b.min_y, width: b.width, height: b.height }
    }
}

/// Per-draw state: affine matrix rows `[m00, m01, m02, m10, m11, m12]`, solid paints and
/// OpenVG paint-mode bits (1 = stroke, 2 = fill).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VgmDrawState {
    pub matrix: [f32; 6],
    pub fill_rgba: [f32; 4],
    pub stroke_rgba: [f32; 4],
    pub paint_modes: u32,
}

impl VgmDrawState {
    pub fn transform(&self) -> Matrix {
        let [a, b, c, d, e, f] = self.matrix;
        Matrix { m: [[a, b, c], [d, e, f], [0.0, 0.0, 1.0]] }
    }

    pub fn fill_paint(&self) -> Paint {
        let [r, g, b, a] = self.fill_rgba;
        Paint::Solid(Rgba::new(r, g, b, a))
    }

    pub fn stroke_paint(&self) -> Paint {
        let [r, g, b, a] = self.stroke_rgba;
        Paint::Solid(Rgba::new(r, g, b, a))
    }

    pub fn modes(&self) -> PaintModes {
        PaintModes::from_bits(self.paint_modes)
    }
}

/// Stroke style with OpenVG-ordered enums: cap 0 = butt, 1 = round, 2 = square;
/// join 0 = miter, 1 = round, 2 = bevel.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VgmStrokeStyle {
    pub width: f32,
    pub cap: u32,
    pub join: u32,
    pub miter_limit: f32,
}

impl VgmStrokeStyle {
    pub fn to_style(&self) -> Option<StrokeStyle> {
        let cap = match self.cap {
            0 => CapStyle::Butt,
            1 => CapStyle::Round,
            2 => CapStyle::Square,
            _ => return None,
        };
        let join = match self.join {
            0 => JoinStyle::Miter,
            1 => JoinStyle::Round,
            2 => JoinStyle::Bevel,
            _ => return None,
        };
        Some(StrokeStyle { width: self.width, cap, join, miter_limit: self.miter_limit })
    }
}

/// 0 = non-zero, 1 = even-odd, 2 = positive.
pub fn fill_rule_from_u32(v: u32) -> Option<FillRule> {
    match v {
        0 => Some(FillRule::NonZero),
        1 => Some(FillRule::EvenOdd),
        2 => Some(FillRule::Positive),
        _ => None,
    }
}

/// Write a Rust string into a C buffer (NUL-terminated).
/// Returns the number of bytes written (excluding the final NUL).
pub fn write_c_string(out: *mut c_char, cap: usize, s: &str) -> usize {
    if out.is_null() || cap == 0 {
        return 0;
    }

    let bytes = s.as_bytes();
    let n = bytes.len().min(cap.saturating_sub(1));

    // Safety: caller provided writable memory for `cap` bytes.
    unsafe {
        core::ptr::copy_nonoverlapping(bytes.as_ptr(), out as *mut u8, n);
        *out.add(n) = 0;
    }

    n
}

/// View a C array as a slice. A zero length is always valid; a null pointer with a
/// non-zero length is not.
///
/// # Safety
///
/// `ptr` must point at `len` readable elements when non-null.
pub unsafe fn slice_from_raw<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(core::slice::from_raw_parts(ptr, len))
}
