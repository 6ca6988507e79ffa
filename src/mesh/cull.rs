//! Optional overlap culling over canonicalized triangles.
//!
//! A triangle is marked deleted when a later, fully opaque triangle covers all three of its
//! vertices. Coverers are looked up through an index ordered by bbox x-min, so only
//! triangles starting at or left of the candidate are tested.

use std::collections::BTreeMap;

use super::triangle::Triangle;

/// Mark covered triangles deleted. Returns how many were culled.
///
/// Expects counterclockwise triangles (the output of `Triangle::canonicalize`).
pub fn cull_covered(triangles: &mut [Triangle]) -> usize {
    let mut by_x_min: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, t) in triangles.iter().enumerate() {
        if t.is_opaque() {
            by_x_min.entry(t.bbox().min.x).or_default().push(i);
        }
    }

    let mut culled = 0usize;
    for i in 0..triangles.len() {
        let target = triangles[i];
        if target.is_deleted() {
            continue;
        }
        let tb = target.bbox();

        let covered = by_x_min
            .range(..=tb.min.x)
            .flat_map(|(_, idx)| idx.iter().copied())
            .filter(|&j| j > i)
            .any(|j| {
                let cover = &triangles[j];
                cover.bbox().contains_box(&tb) && target.pts.iter().all(|&p| cover.covers_point(p))
            });

        if covered {
            triangles[i].id = None;
            culled += 1;
        }
    }

    if culled > 0 {
        log::trace!("cull: {culled} of {} triangles covered", triangles.len());
    }
    culled
}
