//! The Marker Cache / breakdown index (`spec.md` §4.C): an in-memory
//! `section -> item -> (intro count, credits count)` index that answers
//! aggregate queries in O(items in scope) without touching the library
//! database.
//!
//! Stored as nested `DashMap`s, the same "hot, concurrently read and
//! written, occasionally rebuilt wholesale" shape as
//! `ferrex-core::auth::state_manager::AuthStateManager`'s device-state map,
//! just keyed by section then item instead of by device id. Cache writes
//! happen after the owning database transaction commits (`spec.md` §5), so
//! a reader may briefly observe a commit the cache hasn't caught up to yet;
//! that window is accepted because the cache only backs statistical
//! queries.

use std::collections::BTreeMap;

use dashmap::DashMap;
use marker_model::{Breakdown, ItemBucket, MarkerType, MediaItemId, PackedBucket, SectionId};

/// One section's `item -> bucket` index.
type SectionIndex = DashMap<MediaItemId, ItemBucket>;

#[derive(Debug, Default)]
pub struct MarkerCache {
    sections: DashMap<SectionId, SectionIndex>,
}

impl MarkerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a section's whole index. Called at startup from
    /// `LibraryAdapter::section_overview`, and safe to call again any time
    /// the cache needs a full rebuild (e.g. after resuming from
    /// `Suspended`).
    pub fn rebuild_section(&self, section_id: SectionId, counts: Vec<(MediaItemId, MarkerType, i64)>) {
        let index = SectionIndex::new();
        for (item_id, marker_type, count) in counts {
            let mut entry = index.entry(item_id).or_insert_with(ItemBucket::default);
            match marker_type {
                MarkerType::Intro => entry.bucket = entry.bucket.with_intros(count as u16),
                MarkerType::Credits => entry.bucket = entry.bucket.with_credits(count as u16),
                MarkerType::Commercial => entry.commercials = count as u32,
            }
        }
        self.sections.insert(section_id, index);
    }

    pub fn get(&self, section_id: SectionId, item_id: MediaItemId) -> ItemBucket {
        self.sections
            .get(&section_id)
            .and_then(|idx| idx.get(&item_id).map(|b| *b))
            .unwrap_or_default()
    }

    /// Applies the delta for one committed Add/Edit/Delete/Restore whose
    /// type change touched the intro/credits/commercial counts. Exactly one
    /// call per committed mutation, per `spec.md` §4.C's mutation protocol.
    pub fn delta(
        &self,
        section_id: SectionId,
        item_id: MediaItemId,
        old: ItemBucket,
        new: ItemBucket,
    ) {
        if old == new {
            return;
        }
        let index = self.sections.entry(section_id).or_insert_with(SectionIndex::new);
        if new.total_markers() == 0 {
            index.remove(&item_id);
        } else {
            index.insert(item_id, new);
        }
    }

    /// Sums the buckets of `item_ids` within `section_id`. Used to answer
    /// show/season-granularity rollups: a show's bucket is the sum of its
    /// episodes' buckets, computed at query time over the item ids the
    /// caller resolved for that subtree.
    pub fn rollup(&self, section_id: SectionId, item_ids: &[MediaItemId]) -> ItemBucket {
        let Some(index) = self.sections.get(&section_id) else {
            return ItemBucket::default();
        };
        let mut intros = 0u32;
        let mut credits = 0u32;
        let mut commercials = 0u32;
        for id in item_ids {
            if let Some(bucket) = index.get(id) {
                intros += bucket.bucket.intros() as u32;
                credits += bucket.bucket.credits() as u32;
                commercials += bucket.commercials;
            }
        }
        ItemBucket {
            bucket: PackedBucket::new(intros.min(u16::MAX as u32) as u16, credits.min(u16::MAX as u32) as u16),
            commercials,
        }
    }

    /// Full breakdown over every item currently indexed for `section_id`.
    pub fn section_breakdown(&self, section_id: SectionId) -> Breakdown {
        let Some(index) = self.sections.get(&section_id) else {
            return Breakdown::default();
        };
        self.breakdown_over(index.iter().map(|e| *e.value()))
    }

    /// Breakdown restricted to a caller-provided set of item ids (show or
    /// season granularity).
    pub fn scoped_breakdown(&self, section_id: SectionId, item_ids: &[MediaItemId]) -> Breakdown {
        let Some(index) = self.sections.get(&section_id) else {
            return Breakdown::default();
        };
        self.breakdown_over(item_ids.iter().filter_map(|id| index.get(id).map(|e| *e)))
    }

    fn breakdown_over(&self, buckets: impl Iterator<Item = ItemBucket>) -> Breakdown {
        let mut distinct: std::collections::HashSet<(u16, u16)> = Default::default();
        let mut collapsed: BTreeMap<u32, usize> = BTreeMap::new();
        let mut intro_buckets: BTreeMap<u16, usize> = BTreeMap::new();
        let mut credits_buckets: BTreeMap<u16, usize> = BTreeMap::new();
        let mut total_intros = 0u64;
        let mut total_credits = 0u64;
        let mut total_markers = 0u64;
        let mut items_with_markers = 0u64;
        let mut items_with_intros = 0u64;
        let mut items_with_credits = 0u64;

        for item in buckets {
            let intros = item.bucket.intros();
            let credits = item.bucket.credits();
            distinct.insert((intros, credits));
            *collapsed.entry(item.total_markers()).or_insert(0) += 1;
            *intro_buckets.entry(intros).or_insert(0) += 1;
            *credits_buckets.entry(credits).or_insert(0) += 1;
            total_intros += intros as u64;
            total_credits += credits as u64;
            total_markers += item.total_markers() as u64;
            if item.has_markers() {
                items_with_markers += 1;
            }
            if intros > 0 {
                items_with_intros += 1;
            }
            if credits > 0 {
                items_with_credits += 1;
            }
        }

        Breakdown {
            buckets: distinct.len(),
            collapsed_buckets: collapsed,
            intro_buckets,
            credits_buckets,
            total_intros,
            total_credits,
            total_markers,
            items_with_markers,
            items_with_intros,
            items_with_credits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marker_model::SectionId;

    fn sid() -> SectionId {
        SectionId(1)
    }

    #[test]
    fn rebuild_then_delta_agree() {
        let cache = MarkerCache::new();
        cache.rebuild_section(
            sid(),
            vec![
                (MediaItemId(1), MarkerType::Intro, 1),
                (MediaItemId(1), MarkerType::Credits, 1),
                (MediaItemId(2), MarkerType::Intro, 1),
            ],
        );
        let breakdown = cache.section_breakdown(sid());
        assert_eq!(breakdown.total_intros, 2);
        assert_eq!(breakdown.total_credits, 1);
        assert_eq!(breakdown.items_with_markers, 2);

        // Adding a credits marker to item 2.
        let old = cache.get(sid(), MediaItemId(2));
        let new = ItemBucket {
            bucket: old.bucket.with_credits(1),
            commercials: old.commercials,
        };
        cache.delta(sid(), MediaItemId(2), old, new);
        let breakdown = cache.section_breakdown(sid());
        assert_eq!(breakdown.total_credits, 2);
    }

    #[test]
    fn delta_to_empty_removes_item() {
        let cache = MarkerCache::new();
        cache.rebuild_section(sid(), vec![(MediaItemId(1), MarkerType::Intro, 1)]);
        let old = cache.get(sid(), MediaItemId(1));
        cache.delta(sid(), MediaItemId(1), old, ItemBucket::default());
        let breakdown = cache.section_breakdown(sid());
        assert_eq!(breakdown.items_with_markers, 0);
    }

    #[test]
    fn rollup_sums_episodes_into_show_bucket() {
        let cache = MarkerCache::new();
        cache.rebuild_section(
            sid(),
            vec![
                (MediaItemId(1), MarkerType::Intro, 1),
                (MediaItemId(2), MarkerType::Intro, 1),
                (MediaItemId(2), MarkerType::Credits, 1),
            ],
        );
        let rolled = cache.rollup(sid(), &[MediaItemId(1), MediaItemId(2)]);
        assert_eq!(rolled.bucket.intros(), 2);
        assert_eq!(rolled.bucket.credits(), 1);
    }
}
