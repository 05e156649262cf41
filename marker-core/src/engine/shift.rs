//! Bulk time-shift across a subtree (`spec.md` §4.E): conflict detection,
//! Error/Cutoff/Clean classification, and commit.

use std::collections::HashMap;

use marker_contracts::{NewActionLogEntry, ShiftUpdate};
use marker_model::{ActionOp, Marker, MarkerId, MediaItemId};

use super::{has_overlap, recompute_indices};
use crate::error::{MarkerError, Result};
use crate::service::Service;

/// The outcome of both `CheckShift` (always `applied = false`) and `Shift`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ShiftResult {
    pub applied: bool,
    pub conflict: bool,
    pub overflow: bool,
    pub all_markers: Vec<Marker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    Error,
    Cutoff,
    Clean,
}

/// Classifies a marker's post-shift interval. `end' <= start'` is always
/// `Error`, even when both endpoints individually lie within `[0,
/// duration]` — a deliberately retained quirk (`spec.md` §9 Open Questions).
fn classify(start: i64, end: i64, duration: i64, d_start: i64, d_end: i64) -> (Classification, i64, i64) {
    let new_start = start + d_start;
    let new_end = end + d_end;
    if new_end <= 0 || new_start >= duration || new_end <= new_start {
        (Classification::Error, new_start, new_end)
    } else if new_start < 0 || new_end > duration {
        (Classification::Cutoff, new_start.max(0), new_end.min(duration))
    } else {
        (Classification::Clean, new_start, new_end)
    }
}

impl Service {
    /// `spec.md` §4.E `CheckShift`: enumerate only, never mutates.
    pub async fn check_shift(&self, root_id: MediaItemId) -> Result<ShiftResult> {
        let _running = self.guard_running().await?;
        let all_markers = self.library.list_markers_for_subtree(root_id).await?;
        Ok(ShiftResult {
            applied: false,
            conflict: has_linked_conflict(&all_markers, &[]),
            overflow: false,
            all_markers,
        })
    }

    /// `spec.md` §4.E `Shift`.
    pub async fn shift(
        &self,
        root_id: MediaItemId,
        d_start: i64,
        d_end: i64,
        force: bool,
        ignore_ids: &[MarkerId],
    ) -> Result<ShiftResult> {
        let _running = self.guard_running().await?;
        if d_start == 0 && d_end == 0 {
            return Err(MarkerError::BadRequest("shift delta (0, 0) is invalid".into()));
        }

        let all_markers = self.library.list_markers_for_subtree(root_id).await?;
        let retained: Vec<Marker> = all_markers.into_iter().filter(|m| !ignore_ids.contains(&m.id)).collect();

        // `MediaItem::duration` isn't carried on `Marker`; look parents up
        // once so classification doesn't re-fetch per marker.
        let mut durations: HashMap<MediaItemId, i64> = HashMap::new();
        for parent_id in retained.iter().map(|m| m.parent_id).collect::<std::collections::HashSet<_>>() {
            let item = self.library.get_item(parent_id).await?;
            durations.insert(parent_id, item.duration.unwrap_or(i64::MAX));
        }

        if has_linked_conflict(&retained, &[]) && !force {
            let overflow = retained.iter().any(|m| {
                let duration = *durations.get(&m.parent_id).unwrap_or(&i64::MAX);
                matches!(classify(m.start, m.end, duration, d_start, d_end).0, Classification::Error)
            });
            return Ok(ShiftResult { applied: false, conflict: true, overflow, all_markers: retained });
        }

        let mut classified: Vec<(Marker, Classification, i64, i64)> = retained
            .iter()
            .map(|m| {
                let duration = *durations.get(&m.parent_id).unwrap_or(&i64::MAX);
                let (class, new_start, new_end) = classify(m.start, m.end, duration, d_start, d_end);
                (m.clone(), class, new_start, new_end)
            })
            .collect();

        let any_error = classified.iter().any(|(_, c, _, _)| *c == Classification::Error);
        if any_error && !force {
            return Ok(ShiftResult { applied: false, conflict: false, overflow: true, all_markers: retained });
        }

        classified.retain(|(_, c, _, _)| *c != Classification::Error);

        let mut by_parent: HashMap<MediaItemId, Vec<(Marker, i64, i64)>> = HashMap::new();
        for (marker, _, new_start, new_end) in &classified {
            by_parent.entry(marker.parent_id).or_default().push((marker.clone(), *new_start, *new_end));
        }

        let mut parent_ids: Vec<MediaItemId> = by_parent.keys().copied().collect();
        parent_ids.sort();
        let _guards = self.locks.lock_many(&parent_ids).await;

        let mut updates = Vec::new();
        let mut log_entries = Vec::new();
        let mut shifted_markers = Vec::new();

        for parent_id in &parent_ids {
            let group = &by_parent[parent_id];
            let mut post_state: Vec<Marker> = group
                .iter()
                .map(|(m, new_start, new_end)| {
                    let mut updated = m.clone();
                    updated.start = *new_start;
                    updated.end = *new_end;
                    updated
                })
                .collect();
            // Unaffected siblings (ignored or in another shift group) keep
            // their interval; indices are recomputed over the whole parent.
            let unaffected: Vec<Marker> = self
                .library
                .list_markers(*parent_id)
                .await?
                .into_iter()
                .filter(|m| !group.iter().any(|(g, _, _)| g.id == m.id))
                .collect();
            post_state.extend(unaffected);

            // A non-uniform shift across a linked group can open or close
            // gaps between markers on the same parent; re-validate I1 over
            // the post-shift state before touching storage (`spec.md` §4.E
            // step 7 / §7: an invariant violation aborts as `Internal`).
            if has_overlap(&post_state) {
                return Err(MarkerError::Internal(format!(
                    "shift would overlap existing markers on {parent_id}"
                )));
            }

            let ranked = recompute_indices(&post_state);
            for (marker, new_start, new_end) in group {
                let index = ranked.iter().find(|(id, _)| *id == marker.id).map(|(_, i)| *i).unwrap_or(marker.index);
                updates.push(ShiftUpdate { id: marker.id, start: *new_start, end: *new_end, index });
                log_entries.push((marker.clone(), *new_start, *new_end, index));
            }
        }

        self.library.apply_shift(&updates).await?;

        for (original, new_start, new_end, index) in log_entries {
            let restore_key = self.restore_key_for_marker(original.id).await?;
            self.append_log(NewActionLogEntry {
                op: ActionOp::Edit,
                restore_key,
                marker_id: original.id,
                parent_id: original.parent_id,
                section_id: original.section_id,
                start: new_start,
                end: new_end,
                marker_type: original.marker_type,
                is_final: original.is_final,
                old_start: Some(original.start),
                old_end: Some(original.end),
                ignored: false,
            })
            .await?;

            let mut shifted = original.clone();
            shifted.start = new_start;
            shifted.end = new_end;
            shifted.index = index;
            shifted_markers.push(shifted);
        }

        Ok(ShiftResult { applied: true, conflict: false, overflow: false, all_markers: shifted_markers })
    }
}

/// A parent has a "linked conflict" if more than one retained marker
/// belongs to it.
fn has_linked_conflict(markers: &[Marker], ignore_ids: &[MarkerId]) -> bool {
    let mut counts: HashMap<MediaItemId, usize> = HashMap::new();
    for m in markers.iter().filter(|m| !ignore_ids.contains(&m.id)) {
        *counts.entry(m.parent_id).or_insert(0) += 1;
    }
    counts.values().any(|count| *count > 1)
}

