//! Per-marker CRUD (`spec.md` §4.D): Add, Edit, Delete. Each method takes
//! the parent's write lock before touching storage, writes through the
//! Library Adapter inside its single transaction, then updates the Marker
//! Cache and appends one Action Log entry — in that order, since cache
//! writes only happen once the owning transaction has committed
//! (`spec.md` §5).

use marker_contracts::{MarkerUpdate, NewActionLogEntry, NewMarker};
use marker_model::{ItemBucket, Marker, MarkerId, MarkerType, MediaItemId, RestoreKey};
use tracing::warn;

use super::{compute_add_reindex, has_overlap, recompute_indices};
use crate::error::{MarkerError, Result};
use crate::service::Service;

impl Service {
    /// Looks up the restore key the action log already associated with
    /// `marker_id` (its most recent entry), or mints a fresh one if this is
    /// the first time the log has seen this id — e.g. a marker the library
    /// database created natively, never touched by us before this edit.
    pub(crate) async fn restore_key_for_marker(&self, marker_id: MarkerId) -> Result<RestoreKey> {
        let Some(store) = &self.action_log else {
            return Ok(RestoreKey::new());
        };
        let entries = store.all_entries().await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.marker_id == marker_id)
            .max_by_key(|e| e.op_id.get())
            .map(|e| e.restore_key)
            .unwrap_or_else(RestoreKey::new))
    }

    /// Serializes appends behind the single-writer lock (`spec.md` §5);
    /// a no-op (not an error) when `backup_actions` is off, since CRUD must
    /// still function with the action log disabled.
    pub(crate) async fn append_log(&self, entry: NewActionLogEntry) -> Result<()> {
        let Some(store) = &self.action_log else {
            return Ok(());
        };
        let _guard = self.action_log_lock.lock().await;
        store.append(entry).await?;
        Ok(())
    }

    fn validate_interval(&self, start: i64, end: i64, duration: i64) -> Result<()> {
        if start < 0 {
            return Err(MarkerError::BadRequest("start must be non-negative".into()));
        }
        if start >= end {
            return Err(MarkerError::BadRequest("start must be less than end".into()));
        }
        if end > duration {
            return Err(MarkerError::BadRequest("end must not exceed the parent's duration".into()));
        }
        Ok(())
    }

    /// `spec.md` §4.D `Add`.
    pub async fn add(
        &self,
        parent_id: MediaItemId,
        start: i64,
        end: i64,
        marker_type: MarkerType,
        is_final: bool,
        created_by_user: bool,
    ) -> Result<Marker> {
        let inserted = self.insert_marker(parent_id, start, end, marker_type, is_final, created_by_user).await?;

        self.append_log(NewActionLogEntry {
            op: marker_model::ActionOp::Add,
            restore_key: RestoreKey::new(),
            marker_id: inserted.id,
            parent_id,
            section_id: inserted.section_id,
            start: inserted.start,
            end: inserted.end,
            marker_type: inserted.marker_type,
            is_final: inserted.is_final,
            old_start: None,
            old_end: None,
            ignored: false,
        })
        .await?;

        Ok(inserted)
    }

    /// The insert half of `Add`, without the log append: shared with
    /// `Service::restore` (`engine::purge`), which logs a `Restore` entry
    /// under the original restore key instead of a fresh `Add`.
    pub(crate) async fn insert_marker(
        &self,
        parent_id: MediaItemId,
        start: i64,
        end: i64,
        marker_type: MarkerType,
        is_final: bool,
        created_by_user: bool,
    ) -> Result<Marker> {
        let _running = self.guard_running().await?;
        let _lock = self.locks.lock(parent_id).await;

        let parent = self.library.get_item(parent_id).await?;
        if !parent.is_markerable() {
            return Err(MarkerError::BadTarget(format!("{parent_id} is not an episode or movie")));
        }
        let duration = parent.duration.ok_or_else(|| MarkerError::Internal(format!("{parent_id} has no duration")))?;
        self.validate_interval(start, end, duration)?;
        if is_final && marker_type != MarkerType::Credits {
            return Err(MarkerError::BadRequest("final may only be set on a credits marker".into()));
        }

        let existing = self.library.list_markers(parent_id).await?;
        let candidate_overlaps = existing.iter().any(|m| start < m.end && m.start < end);
        if candidate_overlaps {
            return Err(MarkerError::Overlap(format!("[{start},{end}) overlaps an existing marker on {parent_id}")));
        }

        let old_bucket = self.cache.get(parent.section_id, parent_id);
        let (index, reindex) = compute_add_reindex(&existing, start);

        let new = NewMarker {
            parent_id,
            start,
            end,
            marker_type,
            is_final,
            index,
            created_by_user,
        };
        let inserted = self.library.add_marker(new, &reindex).await?;

        let new_bucket = bump_bucket(old_bucket, marker_type, 1);
        self.cache.delta(parent.section_id, parent_id, old_bucket, new_bucket);

        Ok(inserted)
    }

    /// `spec.md` §4.D `Edit`.
    pub async fn edit(
        &self,
        marker_id: MarkerId,
        start: i64,
        end: i64,
        marker_type: MarkerType,
        mut is_final: bool,
        created_by_user: bool,
    ) -> Result<Marker> {
        let _running = self.guard_running().await?;

        // We don't yet know the parent, so look the marker up unlocked
        // first; the actual mutation happens under the parent's lock,
        // re-validated against fresh state.
        let target = self.find_marker(marker_id).await?;
        let _lock = self.locks.lock(target.parent_id).await;

        // Re-fetch under lock in case another mutation raced us between the
        // unlocked lookup above and acquiring the parent lock.
        let target = self.find_marker(marker_id).await?;

        if is_final && marker_type != MarkerType::Credits {
            warn!(marker_id = marker_id.get(), "clearing final: marker is not a credits marker");
            is_final = false;
        }

        let parent = self.library.get_item(target.parent_id).await?;
        let duration = parent.duration.ok_or_else(|| MarkerError::Internal(format!("{} has no duration", target.parent_id)))?;
        self.validate_interval(start, end, duration)?;

        let mut siblings = self.library.list_markers(target.parent_id).await?;
        let mut mutated = target.clone();
        mutated.start = start;
        mutated.end = end;
        mutated.marker_type = marker_type;
        mutated.is_final = is_final;
        mutated.created_by_user = created_by_user;
        mutated.normalize_final();
        for m in siblings.iter_mut() {
            if m.id == marker_id {
                *m = mutated.clone();
            }
        }
        if has_overlap(&siblings) {
            return Err(MarkerError::Overlap(format!(
                "[{start},{end}) overlaps an existing marker on {}",
                target.parent_id
            )));
        }

        let ranked = recompute_indices(&siblings);
        let new_index = ranked
            .iter()
            .find(|(id, _)| *id == marker_id)
            .map(|(_, idx)| *idx)
            .expect("target is in siblings");
        let reindex: Vec<marker_contracts::IndexUpdate> = ranked
            .into_iter()
            .filter(|(id, idx)| {
                *id != marker_id && siblings.iter().find(|m| m.id == *id).map(|m| m.index) != Some(*idx)
            })
            .map(|(id, index)| marker_contracts::IndexUpdate { id, index })
            .collect();

        let update = MarkerUpdate {
            id: marker_id,
            start,
            end,
            marker_type: mutated.marker_type,
            is_final: mutated.is_final,
            created_by_user: mutated.created_by_user,
            index: new_index,
        };
        let edited = self.library.edit_marker(update, &reindex).await?;

        if target.marker_type != edited.marker_type {
            let old_bucket = self.cache.get(parent.section_id, target.parent_id);
            let mut new_bucket = bump_bucket(old_bucket, target.marker_type, -1);
            new_bucket = bump_bucket(new_bucket, edited.marker_type, 1);
            self.cache.delta(parent.section_id, target.parent_id, old_bucket, new_bucket);
        }

        let restore_key = self.restore_key_for_marker(marker_id).await?;
        self.append_log(NewActionLogEntry {
            op: marker_model::ActionOp::Edit,
            restore_key,
            marker_id: edited.id,
            parent_id: edited.parent_id,
            section_id: edited.section_id,
            start: edited.start,
            end: edited.end,
            marker_type: edited.marker_type,
            is_final: edited.is_final,
            old_start: Some(target.start),
            old_end: Some(target.end),
            ignored: false,
        })
        .await?;

        Ok(edited)
    }

    /// `spec.md` §4.D `Delete`.
    pub async fn delete(&self, marker_id: MarkerId) -> Result<Marker> {
        let _running = self.guard_running().await?;

        let target = self.find_marker(marker_id).await?;
        let _lock = self.locks.lock(target.parent_id).await;
        let target = self.find_marker(marker_id).await?;

        let siblings = self.library.list_markers(target.parent_id).await?;
        let remaining: Vec<Marker> = siblings.into_iter().filter(|m| m.id != marker_id).collect();
        let ranked = recompute_indices(&remaining);
        let reindex: Vec<marker_contracts::IndexUpdate> = ranked
            .into_iter()
            .filter_map(|(id, idx)| {
                let old = remaining.iter().find(|m| m.id == id).map(|m| m.index)?;
                (old != idx).then_some(marker_contracts::IndexUpdate { id, index: idx })
            })
            .collect();

        let removed = self.library.delete_marker(marker_id, &reindex).await?;

        let old_bucket = self.cache.get(removed.section_id, removed.parent_id);
        let new_bucket = bump_bucket(old_bucket, removed.marker_type, -1);
        self.cache.delta(removed.section_id, removed.parent_id, old_bucket, new_bucket);

        let restore_key = self.restore_key_for_marker(marker_id).await?;
        self.append_log(NewActionLogEntry {
            op: marker_model::ActionOp::Delete,
            restore_key,
            marker_id: removed.id,
            parent_id: removed.parent_id,
            section_id: removed.section_id,
            start: removed.start,
            end: removed.end,
            marker_type: removed.marker_type,
            is_final: removed.is_final,
            old_start: None,
            old_end: None,
            ignored: false,
        })
        .await?;

        Ok(removed)
    }

    pub(crate) async fn find_marker(&self, marker_id: MarkerId) -> Result<Marker> {
        Ok(self.library.get_marker(marker_id).await?)
    }
}

fn bump_bucket(bucket: ItemBucket, marker_type: MarkerType, delta: i32) -> ItemBucket {
    match marker_type {
        MarkerType::Intro => {
            let v = (bucket.bucket.intros() as i32 + delta).max(0) as u16;
            ItemBucket { bucket: bucket.bucket.with_intros(v), commercials: bucket.commercials }
        }
        MarkerType::Credits => {
            let v = (bucket.bucket.credits() as i32 + delta).max(0) as u16;
            ItemBucket { bucket: bucket.bucket.with_credits(v), commercials: bucket.commercials }
        }
        MarkerType::Commercial => {
            let v = (bucket.commercials as i32 + delta).max(0) as u32;
            ItemBucket { bucket: bucket.bucket, commercials: v }
        }
    }
}
