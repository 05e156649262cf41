//! The four engines from `spec.md` §4.D–§4.G, each a set of methods on
//! [`crate::service::Service`] living in its own module: CRUD, Shift,
//! Purge Reconciler, Query/Aggregation.

pub mod crud;
pub mod purge;
pub mod query;
pub mod shift;

use marker_contracts::IndexUpdate;
use marker_model::{Marker, MarkerId};

/// Computes the index a new marker starting at `new_start` would receive
/// among `existing`, plus the `IndexUpdate`s for existing siblings whose
/// rank shifted to make room. `existing` must not already overlap
/// `new_start` (the caller rejects overlap before calling this).
pub(crate) fn compute_add_reindex(existing: &[Marker], new_start: i64) -> (i32, Vec<IndexUpdate>) {
    let mut pairs: Vec<(Option<MarkerId>, i64)> = existing.iter().map(|m| (Some(m.id), m.start)).collect();
    pairs.push((None, new_start));
    pairs.sort_by_key(|(_, start)| *start);

    let mut new_index = 0i32;
    let mut updates = Vec::new();
    for (rank, (id_opt, _)) in pairs.iter().enumerate() {
        match id_opt {
            None => new_index = rank as i32,
            Some(id) => {
                let old = existing.iter().find(|m| m.id == *id).expect("id came from existing").index;
                if old != rank as i32 {
                    updates.push(IndexUpdate { id: *id, index: rank as i32 });
                }
            }
        }
    }
    (new_index, updates)
}

/// Recomputes `0..n-1` indices for `markers` sorted by `start`, returning
/// `(id, new_index)` for every marker — including those whose index did
/// not change, so callers can diff against each marker's current `.index`
/// field themselves.
pub(crate) fn recompute_indices(markers: &[Marker]) -> Vec<(MarkerId, i32)> {
    let mut sorted: Vec<&Marker> = markers.iter().collect();
    sorted.sort_by_key(|m| m.start);
    sorted.iter().enumerate().map(|(rank, m)| (m.id, rank as i32)).collect()
}

/// `true` if any two distinct markers in `markers` overlap (I1).
pub(crate) fn has_overlap(markers: &[Marker]) -> bool {
    for (i, a) in markers.iter().enumerate() {
        for b in markers.iter().skip(i + 1) {
            if a.overlaps(b) {
                return true;
            }
        }
    }
    false
}
