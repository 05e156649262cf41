//! Shared fixture builder for the integration suite: a `Service` backed by
//! `MemoryLibraryAdapter` and `MemoryActionLogStore`, seeded with one
//! section / show / season / episode.

use std::sync::Arc;

use marker_core::db::{MemoryActionLogStore, MemoryLibraryAdapter};
use marker_core::Service;
use marker_model::{MediaItem, MediaItemId, MediaItemType, Section, SectionId};

pub const SECTION_ID: SectionId = SectionId(1);
pub const SHOW_ID: MediaItemId = MediaItemId(10);
pub const SEASON_ID: MediaItemId = MediaItemId(11);
pub const EPISODE_ID: MediaItemId = MediaItemId(12);
pub const EPISODE_DURATION: i64 = 600_000;

/// Builds a service with the action log and marker cache both enabled,
/// seeded with one show -> season -> episode chain.
pub async fn fixture() -> (Arc<Service>, Arc<MemoryLibraryAdapter>) {
    let library = Arc::new(MemoryLibraryAdapter::new());
    library.seed_section(Section { id: SECTION_ID, name: "TV Shows".into(), section_type: MediaItemType::Show });
    library.seed_item(MediaItem {
        id: SHOW_ID,
        item_type: MediaItemType::Show,
        parent_id: None,
        section_id: SECTION_ID,
        duration: None,
        title: "Example Show".into(),
    });
    library.seed_item(MediaItem {
        id: SEASON_ID,
        item_type: MediaItemType::Season,
        parent_id: Some(SHOW_ID),
        section_id: SECTION_ID,
        duration: None,
        title: "Season 1".into(),
    });
    library.seed_item(MediaItem {
        id: EPISODE_ID,
        item_type: MediaItemType::Episode,
        parent_id: Some(SEASON_ID),
        section_id: SECTION_ID,
        duration: Some(EPISODE_DURATION),
        title: "Episode 1".into(),
    });

    let action_log = Arc::new(MemoryActionLogStore::new());
    let service = Arc::new(Service::new(library.clone(), Some(action_log), true, true));
    service.bootstrap(&[SECTION_ID]).await.expect("bootstrap");
    (service, library)
}

/// Same as [`fixture`] but with the action log disabled, for exercising
/// `FeatureDisabled`.
pub async fn fixture_no_backup() -> (Arc<Service>, Arc<MemoryLibraryAdapter>) {
    let library = Arc::new(MemoryLibraryAdapter::new());
    library.seed_section(Section { id: SECTION_ID, name: "TV Shows".into(), section_type: MediaItemType::Show });
    library.seed_item(MediaItem {
        id: EPISODE_ID,
        item_type: MediaItemType::Episode,
        parent_id: None,
        section_id: SECTION_ID,
        duration: Some(EPISODE_DURATION),
        title: "Episode 1".into(),
    });
    let service = Arc::new(Service::new(library.clone(), None, false, true));
    service.bootstrap(&[SECTION_ID]).await.expect("bootstrap");
    (service, library)
}
