//! An in-process `LibraryAdapter` used by the test suite and by
//! `marker-server`'s demo/fixture mode. Mirrors the "in-memory stand-in
//! repository used by the test suite" shape several ferrex repositories
//! ship alongside their Postgres implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use marker_contracts::action_log_port::{ActionLogStore, NewActionLogEntry};
use marker_contracts::error::{PortError, Result};
use marker_contracts::library_port::{IndexUpdate, LibraryAdapter, MarkerUpdate, NewMarker, ShiftUpdate};
use marker_model::{ActionLogEntry, ActionOpId, Marker, MarkerType, MediaItem, MediaItemId, MediaItemType, Section, SectionId};
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct Inner {
    sections: HashMap<SectionId, Section>,
    items: HashMap<MediaItemId, MediaItem>,
    markers: HashMap<i64, Marker>,
    next_marker_id: i64,
}

/// A fixture-backed `LibraryAdapter`. Construct with [`MemoryLibraryAdapter::new`]
/// and seed it via [`MemoryLibraryAdapter::seed_item`] /
/// [`MemoryLibraryAdapter::seed_marker`].
#[derive(Debug, Default)]
pub struct MemoryLibraryAdapter {
    inner: RwLock<Inner>,
}

impl MemoryLibraryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_section(&self, section: Section) {
        self.inner.write().sections.insert(section.id, section);
    }

    pub fn seed_item(&self, item: MediaItem) {
        self.inner.write().items.insert(item.id, item);
    }

    pub fn seed_marker(&self, marker: Marker) {
        let mut inner = self.inner.write();
        inner.next_marker_id = inner.next_marker_id.max(marker.id.get() + 1);
        inner.markers.insert(marker.id.get(), marker);
    }

    fn now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}

#[async_trait]
impl LibraryAdapter for MemoryLibraryAdapter {
    async fn list_sections(&self) -> Result<Vec<Section>> {
        let mut sections: Vec<Section> = self.inner.read().sections.values().cloned().collect();
        sections.sort_by_key(|s| s.id);
        Ok(sections)
    }

    async fn list_section_items(&self, section_id: SectionId) -> Result<Vec<MediaItem>> {
        let inner = self.inner.read();
        let mut items: Vec<MediaItem> = inner
            .items
            .values()
            .filter(|i| {
                i.section_id == section_id
                    && i.parent_id.is_none()
                    && matches!(i.item_type, MediaItemType::Show | MediaItemType::Movie)
            })
            .cloned()
            .collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn get_item(&self, id: MediaItemId) -> Result<MediaItem> {
        self.inner
            .read()
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("media item {id}")))
    }

    async fn get_marker(&self, id: marker_model::MarkerId) -> Result<Marker> {
        self.inner
            .read()
            .markers
            .get(&id.get())
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("marker {id}")))
    }

    async fn list_markers(&self, parent_id: MediaItemId) -> Result<Vec<Marker>> {
        let inner = self.inner.read();
        let mut markers: Vec<Marker> = inner
            .markers
            .values()
            .filter(|m| m.parent_id == parent_id)
            .cloned()
            .collect();
        markers.sort_by_key(|m| m.start);
        Ok(markers)
    }

    async fn list_markers_for_parents(
        &self,
        parent_ids: &[MediaItemId],
    ) -> Result<HashMap<MediaItemId, Vec<Marker>>> {
        let inner = self.inner.read();
        let mut out: HashMap<MediaItemId, Vec<Marker>> = HashMap::new();
        for parent_id in parent_ids {
            let mut markers: Vec<Marker> = inner
                .markers
                .values()
                .filter(|m| m.parent_id == *parent_id)
                .cloned()
                .collect();
            markers.sort_by_key(|m| m.start);
            out.insert(*parent_id, markers);
        }
        Ok(out)
    }

    async fn list_markers_for_subtree(&self, root_id: MediaItemId) -> Result<Vec<Marker>> {
        let inner = self.inner.read();
        let leaves = self.descend_markerable(&inner, root_id);
        let mut markers: Vec<Marker> = inner
            .markers
            .values()
            .filter(|m| leaves.contains(&m.parent_id))
            .cloned()
            .collect();
        markers.sort_by(|a, b| a.parent_id.cmp(&b.parent_id).then(a.start.cmp(&b.start)));
        Ok(markers)
    }

    async fn list_children(
        &self,
        parent_id: MediaItemId,
        child_type: MediaItemType,
    ) -> Result<Vec<MediaItem>> {
        let inner = self.inner.read();
        let mut children: Vec<MediaItem> = inner
            .items
            .values()
            .filter(|i| i.parent_id == Some(parent_id) && i.item_type == child_type)
            .cloned()
            .collect();
        children.sort_by_key(|i| i.id);
        Ok(children)
    }

    async fn list_markerable_descendants(&self, root_id: MediaItemId) -> Result<Vec<MediaItemId>> {
        let inner = self.inner.read();
        Ok(self.descend_markerable(&inner, root_id).into_iter().collect())
    }

    async fn section_overview(
        &self,
        section_id: SectionId,
    ) -> Result<Vec<(MediaItemId, MarkerType, i64)>> {
        let inner = self.inner.read();
        let mut counts: HashMap<(MediaItemId, MarkerType), i64> = HashMap::new();
        for marker in inner.markers.values() {
            if marker.section_id != section_id {
                continue;
            }
            *counts.entry((marker.parent_id, marker.marker_type)).or_insert(0) += 1;
        }
        Ok(counts.into_iter().map(|((item, ty), n)| (item, ty, n)).collect())
    }

    async fn add_marker(&self, new: NewMarker, reindex: &[IndexUpdate]) -> Result<Marker> {
        let mut inner = self.inner.write();
        let parent = inner
            .items
            .values()
            .find(|i| i.id == new.parent_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("media item {}", new.parent_id)))?;
        let id = inner.next_marker_id;
        inner.next_marker_id += 1;
        let now = Self::now();
        let marker = Marker {
            id: id.into(),
            parent_id: new.parent_id,
            season_id: None,
            show_id: None,
            section_id: parent.section_id,
            start: new.start,
            end: new.end,
            index: new.index,
            marker_type: new.marker_type,
            is_final: new.is_final,
            created_by_user: new.created_by_user,
            created_at: now,
            modified_at: now,
        };
        inner.markers.insert(id, marker.clone());
        self.apply_reindex(&mut inner, reindex);
        Ok(marker)
    }

    async fn edit_marker(&self, update: MarkerUpdate, reindex: &[IndexUpdate]) -> Result<Marker> {
        let mut inner = self.inner.write();
        let existing = inner
            .markers
            .get(&update.id.get())
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("marker {}", update.id)))?;
        let updated = Marker {
            start: update.start,
            end: update.end,
            index: update.index,
            marker_type: update.marker_type,
            is_final: update.is_final,
            created_by_user: update.created_by_user,
            modified_at: Self::now(),
            ..existing
        };
        inner.markers.insert(update.id.get(), updated.clone());
        self.apply_reindex(&mut inner, reindex);
        Ok(updated)
    }

    async fn delete_marker(&self, id: marker_model::MarkerId, reindex: &[IndexUpdate]) -> Result<Marker> {
        let mut inner = self.inner.write();
        let removed = inner
            .markers
            .remove(&id.get())
            .ok_or_else(|| PortError::NotFound(format!("marker {id}")))?;
        self.apply_reindex(&mut inner, reindex);
        Ok(removed)
    }

    async fn apply_shift(&self, updates: &[ShiftUpdate]) -> Result<()> {
        let mut inner = self.inner.write();
        for update in updates {
            if let Some(marker) = inner.markers.get_mut(&update.id.get()) {
                marker.start = update.start;
                marker.end = update.end;
                marker.index = update.index;
                marker.modified_at = Self::now();
            }
        }
        Ok(())
    }
}

impl MemoryLibraryAdapter {
    fn apply_reindex(&self, inner: &mut Inner, reindex: &[IndexUpdate]) {
        for update in reindex {
            if let Some(marker) = inner.markers.get_mut(&update.id.get()) {
                marker.index = update.index;
                marker.modified_at = Self::now();
            }
        }
    }

    /// Collects every markerable leaf reachable from `root_id` (including
    /// `root_id` itself if it is markerable).
    fn descend_markerable(&self, inner: &Inner, root_id: MediaItemId) -> std::collections::HashSet<MediaItemId> {
        let mut leaves = std::collections::HashSet::new();
        let mut stack = vec![root_id];
        while let Some(id) = stack.pop() {
            let Some(item) = inner.items.get(&id) else {
                continue;
            };
            if item.is_markerable() {
                leaves.insert(id);
            }
            for child in inner.items.values().filter(|c| c.parent_id == Some(id)) {
                stack.push(child.id);
            }
        }
        leaves
    }
}

/// An in-process `ActionLogStore`, the same fixture role
/// `MemoryLibraryAdapter` plays for the library side. Used by the
/// integration test suite and by `marker-server`'s demo mode when no
/// sqlite path is configured.
#[derive(Debug, Default)]
pub struct MemoryActionLogStore {
    entries: RwLock<Vec<ActionLogEntry>>,
    next_op_id: RwLock<i64>,
    /// Mirrors the `restore_key_seq` table a real sqlite-backed store keeps
    /// (`spec.md` §6): the next sequence number to hand out for each
    /// restore key.
    restore_seqs: RwLock<HashMap<RestoreKey, i64>>,
}

impl MemoryActionLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_restore_seq(&self, key: RestoreKey) -> i64 {
        let mut seqs = self.restore_seqs.write();
        let seq = seqs.entry(key).or_insert(0);
        let assigned = *seq;
        *seq += 1;
        assigned
    }
}

#[async_trait]
impl ActionLogStore for MemoryActionLogStore {
    async fn append(&self, entry: NewActionLogEntry) -> Result<ActionLogEntry> {
        let mut next = self.next_op_id.write();
        let op_id = ActionOpId(*next);
        *next += 1;
        let restore_seq = self.next_restore_seq(entry.restore_key);
        let row = ActionLogEntry {
            op_id,
            op: entry.op,
            restore_key: entry.restore_key,
            restore_seq,
            marker_id: entry.marker_id,
            parent_id: entry.parent_id,
            section_id: entry.section_id,
            start: entry.start,
            end: entry.end,
            marker_type: entry.marker_type,
            is_final: entry.is_final,
            old_start: entry.old_start,
            old_end: entry.old_end,
            ignored: entry.ignored,
            at: chrono::Utc::now(),
        };
        self.entries.write().push(row.clone());
        Ok(row)
    }

    async fn all_entries(&self) -> Result<Vec<ActionLogEntry>> {
        Ok(self.entries.read().clone())
    }
}
