//! Pure-read Query/Aggregation operations (`spec.md` §4.G): section/show/
//! season/episode enumeration and breakdown stats, served from the Marker
//! Cache when it's enabled and falling back to a live scan otherwise.

use std::collections::HashMap;

use marker_model::{Breakdown, Marker, MediaItem, MediaItemId, MediaItemType, Section, SectionId};

use crate::error::Result;
use crate::service::Service;

impl Service {
    /// `spec.md` §4.G `Libraries`.
    pub async fn libraries(&self) -> Result<Vec<Section>> {
        let _running = self.guard_running().await?;
        Ok(self.library.list_sections().await?)
    }

    /// `spec.md` §4.G `Items`.
    pub async fn items(&self, section_id: SectionId) -> Result<Vec<MediaItem>> {
        let _running = self.guard_running().await?;
        Ok(self.library.list_section_items(section_id).await?)
    }

    /// `spec.md` §4.G `Seasons`.
    pub async fn seasons(&self, show_id: MediaItemId) -> Result<Vec<MediaItem>> {
        let _running = self.guard_running().await?;
        Ok(self.library.list_children(show_id, MediaItemType::Season).await?)
    }

    /// `spec.md` §4.G `Episodes`.
    pub async fn episodes(&self, season_id: MediaItemId) -> Result<Vec<MediaItem>> {
        let _running = self.guard_running().await?;
        Ok(self.library.list_children(season_id, MediaItemType::Episode).await?)
    }

    /// `spec.md` §4.G `MarkersForParents`.
    pub async fn markers_for_parents(&self, parent_ids: &[MediaItemId]) -> Result<HashMap<MediaItemId, Vec<Marker>>> {
        let _running = self.guard_running().await?;
        Ok(self.library.list_markers_for_parents(parent_ids).await?)
    }

    /// `spec.md` §4.G `SectionStats`: served from the cache when
    /// `extended_marker_stats` is on, otherwise a one-shot scan via
    /// `SectionOverview`.
    pub async fn section_stats(&self, section_id: SectionId) -> Result<Breakdown> {
        let _running = self.guard_running().await?;
        if self.extended_marker_stats {
            return Ok(self.cache.section_breakdown(section_id));
        }
        let counts = self.library.section_overview(section_id).await?;
        let scratch = crate::cache::MarkerCache::new();
        scratch.rebuild_section(section_id, counts);
        Ok(scratch.section_breakdown(section_id))
    }

    /// Show/season-granularity breakdown: the caller resolves which item
    /// ids fall under the scope (e.g. via `episodes`/`seasons`) and this
    /// sums their buckets, per `spec.md` §4.C's rollup note.
    pub async fn scoped_stats(&self, section_id: SectionId, item_ids: &[MediaItemId]) -> Result<Breakdown> {
        let _running = self.guard_running().await?;
        if self.extended_marker_stats {
            return Ok(self.cache.scoped_breakdown(section_id, item_ids));
        }
        let counts = self.library.section_overview(section_id).await?;
        let scratch = crate::cache::MarkerCache::new();
        scratch.rebuild_section(section_id, counts);
        Ok(scratch.scoped_breakdown(section_id, item_ids))
    }
}
