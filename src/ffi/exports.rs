//! C ABI.
//!
//! Design rule: C only ever sees opaque handle pointers and the `#[repr(C)]` structs in
//! `types.rs`. Every entry point tolerates null handles.

use core::ffi::c_char;
use std::sync::{Mutex, OnceLock};

use crate::ffi::types::*;
use crate::mesh::Mesh;
use crate::path::Path;
use crate::render::{draw_path, Batch, RenderState};
use crate::util::config::tess_config;

/// Opaque path handle.
pub struct VgmPath {
    path: Path,
}

/// Opaque batch handle.
pub struct VgmBatch {
    batch: Batch,
}

/// Opaque finalized mesh handle.
pub struct VgmMesh {
    mesh: Mesh,
}

static LAST_ERROR: OnceLock<Mutex<Option<String>>> = OnceLock::new();

fn set_last_error(msg: String) {
    log::warn!("{msg}");
    let lock = LAST_ERROR.get_or_init(|| Mutex::new(None));
    if let Ok(mut guard) = lock.lock() {
        *guard = Some(msg);
    }
}

fn take_last_error() -> Option<String> {
    let lock = LAST_ERROR.get_or_init(|| Mutex::new(None));
    if let Ok(mut guard) = lock.lock() {
        guard.take()
    } else {
        None
    }
}

fn render_state(state: &VgmDrawState) -> RenderState {
    RenderState {
        transform: state.transform(),
        fill_paint: state.fill_paint(),
        stroke_paint: state.stroke_paint(),
        config: *tess_config(),
    }
}

// -----------------
// Paths
// -----------------

#[no_mangle]
pub extern "C" fn vgm_path_create() -> *mut VgmPath {
    crate::util::logging::init_logger();
    Box::into_raw(Box::new(VgmPath { path: Path::new() }))
}

#[no_mangle]
pub extern "C" fn vgm_path_destroy(path: *mut VgmPath) {
    if path.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(path));
    }
}

/// Append raw OpenVG opcodes and their coordinates. Unknown opcodes are skipped.
///
/// On an arity mismatch nothing is appended and `VGM_ERR_ARITY` is returned.
#[no_mangle]
pub extern "C" fn vgm_path_append(
    path: *mut VgmPath,
    opcodes: *const u8,
    num_opcodes: u32,
    coords: *const f32,
    num_coords: u32,
) -> i32 {
    if path.is_null() {
        return VGM_ERR_NULL;
    }
    let path = unsafe { &mut *path };
    // Safety: caller passes arrays of the stated lengths.
    let (ops, coords) = unsafe {
        match (
            slice_from_raw(opcodes, num_opcodes as usize),
            slice_from_raw(coords, num_coords as usize),
        ) {
            (Some(o), Some(c)) => (o, c),
            _ => return VGM_ERR_NULL,
        }
    };

    match path.path.append_opcodes(ops, coords) {
        Ok(_) => VGM_OK,
        Err(e) => {
            set_last_error(e.to_string());
            VGM_ERR_ARITY
        }
    }
}

#[no_mangle]
pub extern "C" fn vgm_path_clear(path: *mut VgmPath) {
    if path.is_null() {
        return;
    }
    let path = unsafe { &mut *path };
    path.path.clear();
}

#[no_mangle]
pub extern "C" fn vgm_path_set_fill_rule(path: *mut VgmPath, rule: u32) -> i32 {
    if path.is_null() {
        return VGM_ERR_NULL;
    }
    let path = unsafe { &mut *path };
    match fill_rule_from_u32(rule) {
        Some(rule) => {
            path.path.set_fill_rule(rule);
            VGM_OK
        }
        None => {
            set_last_error(format!("invalid fill rule {rule}"));
            VGM_ERR_BAD_ARG
        }
    }
}

#[no_mangle]
pub extern "C" fn vgm_path_set_stroke(path: *mut VgmPath, style: *const VgmStrokeStyle) -> i32 {
    if path.is_null() || style.is_null() {
        return VGM_ERR_NULL;
    }
    let path = unsafe { &mut *path };
    let style = unsafe { &*style };
    match style.to_style() {
        Some(s) => {
            path.path.set_stroke_style(s);
            VGM_OK
        }
        None => {
            set_last_error(format!("invalid cap {} or join {}", style.cap, style.join));
            VGM_ERR_BAD_ARG
        }
    }
}

/// Build and finalize one path. Returns null on failure (see `vgm_last_error`).
#[no_mangle]
pub extern "C" fn vgm_path_build(path: *mut VgmPath, state: *const VgmDrawState) -> *mut VgmMesh {
    if path.is_null() || state.is_null() {
        return core::ptr::null_mut();
    }
    let path = unsafe { &mut *path };
    let state = unsafe { &*state };

    match draw_path(&mut path.path, state.modes(), &render_state(state)) {
        Ok(mesh) => Box::into_raw(Box::new(VgmMesh { mesh })),
        Err(e) => {
            set_last_error(e.to_string());
            core::ptr::null_mut()
        }
    }
}

// -----------------
// Batches
// -----------------

#[no_mangle]
pub extern "C" fn vgm_batch_create() -> *mut VgmBatch {
    crate::util::logging::init_logger();
    Box::into_raw(Box::new(VgmBatch { batch: Batch::new(tess_config()) }))
}

#[no_mangle]
pub extern "C" fn vgm_batch_destroy(batch: *mut VgmBatch) {
    if batch.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(batch));
    }
}

#[no_mangle]
pub extern "C" fn vgm_batch_add(batch: *mut VgmBatch, path: *mut VgmPath, state: *const VgmDrawState) -> i32 {
    if batch.is_null() || path.is_null() || state.is_null() {
        return VGM_ERR_NULL;
    }
    let batch = unsafe { &mut *batch };
    let path = unsafe { &mut *path };
    let state = unsafe { &*state };

    match batch.batch.add(&mut path.path, state.modes(), &render_state(state)) {
        Ok(()) => VGM_OK,
        Err(e) => {
            set_last_error(e.to_string());
            VGM_ERR_BUILD
        }
    }
}

/// Finalize and free the batch. The batch handle is invalid afterwards, even on failure.
#[no_mangle]
pub extern "C" fn vgm_batch_finish(batch: *mut VgmBatch) -> *mut VgmMesh {
    if batch.is_null() {
        return core::ptr::null_mut();
    }
    let batch = unsafe { Box::from_raw(batch) };
    match batch.batch.finish() {
        Ok(mesh) => Box::into_raw(Box::new(VgmMesh { mesh })),
        Err(e) => {
            set_last_error(e.to_string());
            core::ptr::null_mut()
        }
    }
}

// -----------------
// Meshes
// -----------------

#[no_mangle]
pub extern "C" fn vgm_mesh_destroy(mesh: *mut VgmMesh) {
    if mesh.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(mesh));
    }
}

#[no_mangle]
pub extern "C" fn vgm_mesh_vertex_count(mesh: *const VgmMesh) -> u32 {
    if mesh.is_null() {
        return 0;
    }
    let mesh = unsafe { &*mesh };
    mesh.mesh.vertices.len() as u32
}

#[no_mangle]
pub extern "C" fn vgm_mesh_index_count(mesh: *const VgmMesh) -> u32 {
    if mesh.is_null() {
        return 0;
    }
    let mesh = unsafe { &*mesh };
    mesh.mesh.indices.len() as u32
}

#[no_mangle]
pub extern "C" fn vgm_mesh_triangle_count(mesh: *const VgmMesh) -> u32 {
    if mesh.is_null() {
        return 0;
    }
    let mesh = unsafe { &*mesh };
    mesh.mesh.triangle_count() as u32
}

/// Copy up to `cap` vertices into `out`. Returns the number copied.
#[no_mangle]
pub extern "C" fn vgm_mesh_copy_vertices(mesh: *const VgmMesh, out: *mut VgmVertex, cap: u32) -> u32 {
    if mesh.is_null() || out.is_null() || cap == 0 {
        return 0;
    }
    let mesh = unsafe { &*mesh };
    let n = mesh.mesh.vertices.len().min(cap as usize);
    // Safety: caller provides room for `cap` vertices.
    let buf = unsafe { core::slice::from_raw_parts_mut(out, n) };
    for (dst, src) in buf.iter_mut().zip(&mesh.mesh.vertices) {
        *dst = VgmVertex::from(src);
    }
    n as u32
}

/// Copy up to `cap` indices into `out`. Returns the number copied.
#[no_mangle]
pub extern "C" fn vgm_mesh_copy_indices(mesh: *const VgmMesh, out: *mut u32, cap: u32) -> u32 {
    if mesh.is_null() || out.is_null() || cap == 0 {
        return 0;
    }
    let mesh = unsafe { &*mesh };
    let n = mesh.mesh.indices.len().min(cap as usize);
    // Safety: caller provides room for `cap` indices.
    unsafe {
        core::ptr::copy_nonoverlapping(mesh.mesh.indices.as_ptr(), out, n);
    }
    n as u32
}

#[no_mangle]
pub extern "C" fn vgm_mesh_bounds(mesh: *const VgmMesh, out: *mut VgmBounds) -> i32 {
    if mesh.is_null() || out.is_null() {
        return VGM_ERR_NULL;
    }
    let mesh = unsafe { &*mesh };
    unsafe {
        *out = VgmBounds::from(mesh.mesh.bounds);
    }
    VGM_OK
}

/// Copy the last error message (NUL-terminated) and clear it.
/// Returns the number of bytes written (excluding the NUL terminator).
#[no_mangle]
pub extern "C" fn vgm_last_error(out: *mut c_char, cap: u32) -> u32 {
    if out.is_null() || cap == 0 {
        return 0;
    }
    let msg = take_last_error().unwrap_or_default();
    write_c_string(out, cap as usize, &msg) as u32
}
