//! The Library DB Adapter contract (`spec.md` §4.A): typed queries and
//! writes against the foreign, shared library database. Every write method
//! commits exactly one logical mutation inside a single transaction,
//! following the shape of
//! `ferrex-core::database::infrastructure::postgres::repositories::watch_status::PostgresWatchStatusRepository`,
//! whose methods each open one `pool.begin()` and perform every write the
//! operation needs before committing.

use std::collections::HashMap;

use async_trait::async_trait;
use marker_model::{MarkerId, MarkerType, MediaItem, MediaItemId, MediaItemType, Section, SectionId};

use crate::error::Result;

/// A marker to be inserted; the adapter assigns `id` and timestamps.
#[derive(Debug, Clone)]
pub struct NewMarker {
    pub parent_id: MediaItemId,
    pub start: i64,
    pub end: i64,
    pub marker_type: MarkerType,
    pub is_final: bool,
    pub index: i32,
    pub created_by_user: bool,
}

/// A full replacement of an existing marker's mutable fields (CRUD Edit).
#[derive(Debug, Clone)]
pub struct MarkerUpdate {
    pub id: MarkerId,
    pub start: i64,
    pub end: i64,
    pub marker_type: MarkerType,
    pub is_final: bool,
    pub created_by_user: bool,
    pub index: i32,
}

/// A sibling whose `index` changed as a side effect of another mutation.
#[derive(Debug, Clone, Copy)]
pub struct IndexUpdate {
    pub id: MarkerId,
    pub index: i32,
}

/// One marker's new interval and index as computed by the Shift Engine.
/// Error-classified markers never appear here; Cutoff markers arrive
/// pre-clamped.
#[derive(Debug, Clone, Copy)]
pub struct ShiftUpdate {
    pub id: MarkerId,
    pub start: i64,
    pub end: i64,
    pub index: i32,
}

#[async_trait]
pub trait LibraryAdapter: Send + Sync {
    /// Every library section the host application exposes.
    async fn list_sections(&self) -> Result<Vec<Section>>;
    /// Top-level items (shows or movies) in a section.
    async fn list_section_items(&self, section_id: SectionId) -> Result<Vec<MediaItem>>;
    async fn get_item(&self, id: MediaItemId) -> Result<MediaItem>;
    /// Looks up a single marker by id, regardless of parent. CRUD Edit and
    /// Delete receive only a marker id from the dispatcher and must
    /// resolve its parent before anything else.
    async fn get_marker(&self, id: MarkerId) -> Result<marker_model::Marker>;
    async fn list_markers(&self, parent_id: MediaItemId) -> Result<Vec<marker_model::Marker>>;
    async fn list_markers_for_parents(
        &self,
        parent_ids: &[MediaItemId],
    ) -> Result<HashMap<MediaItemId, Vec<marker_model::Marker>>>;
    /// Recursively descends the subtree rooted at `root_id` (show -> seasons
    /// -> episodes, section -> items, ...) and returns every marker found.
    async fn list_markers_for_subtree(
        &self,
        root_id: MediaItemId,
    ) -> Result<Vec<marker_model::Marker>>;
    async fn list_children(
        &self,
        parent_id: MediaItemId,
        child_type: MediaItemType,
    ) -> Result<Vec<MediaItem>>;
    /// Every markerable leaf (episode/movie) reachable from `root_id`,
    /// whether or not it currently owns any markers. Used by the Purge
    /// Reconciler to scope a subtree query, where a purged marker's parent
    /// item is still very much alive in the library database.
    async fn list_markerable_descendants(&self, root_id: MediaItemId) -> Result<Vec<MediaItemId>>;
    /// Enumerates every markerable leaf in a section with its marker
    /// counts by type; used only to rebuild the Marker Cache.
    async fn section_overview(
        &self,
        section_id: SectionId,
    ) -> Result<Vec<(MediaItemId, MarkerType, i64)>>;

    /// Inserts `new` and applies `reindex` to its siblings, in one
    /// transaction.
    async fn add_marker(
        &self,
        new: NewMarker,
        reindex: &[IndexUpdate],
    ) -> Result<marker_model::Marker>;

    /// Fully replaces the marker named by `update.id` and applies `reindex`
    /// to its siblings, in one transaction.
    async fn edit_marker(
        &self,
        update: MarkerUpdate,
        reindex: &[IndexUpdate],
    ) -> Result<marker_model::Marker>;

    /// Deletes `id` and decrements every sibling in `reindex`, in one
    /// transaction. Returns the marker's state immediately before deletion.
    async fn delete_marker(
        &self,
        id: MarkerId,
        reindex: &[IndexUpdate],
    ) -> Result<marker_model::Marker>;

    /// Applies a batch of shifted intervals. Callers group `updates` by
    /// parent and the adapter is free to use one transaction per parent or
    /// one transaction overall, provided each parent's post-state satisfies
    /// I1-I3.
    async fn apply_shift(&self, updates: &[ShiftUpdate]) -> Result<()>;
}
