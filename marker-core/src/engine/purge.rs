//! The Purge Reconciler (`spec.md` §4.F): diffs the action log against the
//! live library database to find markers we once knew about that the
//! foreign application silently wiped, and supports restoring or
//! permanently ignoring them.

use std::collections::HashMap;

use marker_model::{ActionLogEntry, ActionOp, MarkerId, MediaItemId, PurgedMarker, RestoreKey, SectionId};

use crate::error::{MarkerError, Result};
use crate::service::Service;

impl Service {
    /// Walks the whole action log and rebuilds the purge candidate index.
    /// Called from `Service::bootstrap` at startup and again after
    /// `resume`.
    pub(crate) async fn rebuild_purge_index(&self) -> Result<()> {
        let Some(store) = &self.action_log else {
            return Ok(());
        };
        let entries = store.all_entries().await?;

        let mut by_key: HashMap<RestoreKey, Vec<ActionLogEntry>> = HashMap::new();
        for entry in entries {
            by_key.entry(entry.restore_key).or_default().push(entry);
        }

        let mut index: crate::service::PurgeIndex = HashMap::new();
        for group in by_key.into_values() {
            let mut sorted = group;
            sorted.sort_by_key(|e| e.op_id.get());
            let Some(last) = sorted.last() else { continue };
            if matches!(last.op, ActionOp::Delete | ActionOp::Ignore) {
                continue;
            }

            let still_live = match self.library.get_marker(last.marker_id).await {
                Ok(m) => {
                    m.parent_id == last.parent_id
                        && m.start == last.start
                        && m.end == last.end
                        && m.marker_type == last.marker_type
                }
                Err(_) => false,
            };
            if still_live {
                continue;
            }

            let candidate = PurgedMarker {
                restore_key: last.restore_key,
                old_marker_id: last.marker_id,
                parent_id: last.parent_id,
                section_id: last.section_id,
                start: last.start,
                end: last.end,
                marker_type: last.marker_type,
                is_final: last.is_final,
                last_seen_op: last.op_id,
                at: last.at,
            };
            index.entry(last.section_id).or_default().entry(last.parent_id).or_default().push(candidate);
        }

        *self.purges.write() = index;
        Ok(())
    }

    /// `spec.md` §4.F `PurgesForSection`.
    pub async fn purges_for_section(&self, section_id: SectionId) -> Result<Vec<PurgedMarker>> {
        self.require_backup_actions()?;
        let purges = self.purges.read();
        Ok(purges.get(&section_id).map(|by_parent| by_parent.values().flatten().cloned().collect()).unwrap_or_default())
    }

    /// `spec.md` §4.F `PurgeCheck`: purge candidates scoped to `root_id`'s
    /// subtree, regardless of whether the candidate's parent item still
    /// has any live markers of its own.
    pub async fn purge_check(&self, root_id: MediaItemId) -> Result<Vec<PurgedMarker>> {
        self.require_backup_actions()?;
        let root = self.library.get_item(root_id).await?;
        let descendants = self.library.list_markerable_descendants(root_id).await?;

        let purges = self.purges.read();
        let Some(by_parent) = purges.get(&root.section_id) else {
            return Ok(Vec::new());
        };
        Ok(descendants
            .into_iter()
            .filter_map(|parent_id| by_parent.get(&parent_id))
            .flatten()
            .cloned()
            .collect())
    }

    /// `spec.md` §4.F `Restore`: re-adds the marker via the CRUD Engine's
    /// Add path, keyed to the original restore key so history stays
    /// linked, then drops the candidate from the in-memory index.
    pub async fn restore(&self, old_marker_id: MarkerId, section_id: SectionId) -> Result<marker_model::Marker> {
        self.require_backup_actions()?;
        let candidate = {
            let purges = self.purges.read();
            purges
                .get(&section_id)
                .into_iter()
                .flat_map(|by_parent| by_parent.values().flatten())
                .find(|c| c.old_marker_id == old_marker_id)
                .cloned()
                .ok_or_else(|| MarkerError::NotFound(format!("no purged marker {old_marker_id} in section {section_id}")))?
        };

        let restored = self
            .insert_marker(
                candidate.parent_id,
                candidate.start,
                candidate.end,
                candidate.marker_type,
                candidate.is_final,
                true,
            )
            .await?;

        self.append_log(marker_contracts::NewActionLogEntry {
            op: ActionOp::Restore,
            restore_key: candidate.restore_key,
            marker_id: restored.id,
            parent_id: restored.parent_id,
            section_id: restored.section_id,
            start: restored.start,
            end: restored.end,
            marker_type: restored.marker_type,
            is_final: restored.is_final,
            old_start: None,
            old_end: None,
            ignored: false,
        })
        .await?;

        self.purges.write().entry(section_id).and_modify(|by_parent| {
            if let Some(list) = by_parent.get_mut(&candidate.parent_id) {
                list.retain(|c| c.old_marker_id != old_marker_id);
            }
        });

        Ok(restored)
    }

    /// `spec.md` §4.F `Ignore`: writes an `Ignore` log entry and drops the
    /// candidate from the in-memory index without recreating it.
    pub async fn ignore_purge(&self, old_marker_id: MarkerId, section_id: SectionId) -> Result<()> {
        self.require_backup_actions()?;
        let candidate = {
            let purges = self.purges.read();
            purges
                .get(&section_id)
                .into_iter()
                .flat_map(|by_parent| by_parent.values().flatten())
                .find(|c| c.old_marker_id == old_marker_id)
                .cloned()
                .ok_or_else(|| MarkerError::NotFound(format!("no purged marker {old_marker_id} in section {section_id}")))?
        };

        self.append_log(marker_contracts::NewActionLogEntry {
            op: ActionOp::Ignore,
            restore_key: candidate.restore_key,
            marker_id: candidate.old_marker_id,
            parent_id: candidate.parent_id,
            section_id: candidate.section_id,
            start: candidate.start,
            end: candidate.end,
            marker_type: candidate.marker_type,
            is_final: candidate.is_final,
            old_start: None,
            old_end: None,
            ignored: true,
        })
        .await?;

        self.purges.write().entry(section_id).and_modify(|by_parent| {
            if let Some(list) = by_parent.get_mut(&candidate.parent_id) {
                list.retain(|c| c.old_marker_id != old_marker_id);
            }
        });

        Ok(())
    }
}
