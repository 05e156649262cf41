//! The media item: episodes and movies own markers; shows/seasons/artists/
//! albums/tracks are referenced only as hierarchy and subtree roots.

use crate::ids::{MediaItemId, SectionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MediaItemType {
    Show,
    Season,
    Episode,
    Movie,
    Artist,
    Album,
    Track,
}

impl MediaItemType {
    /// Only episodes and movies may own markers.
    pub fn is_markerable(self) -> bool {
        matches!(self, MediaItemType::Episode | MediaItemType::Movie)
    }
}

/// A media item as read from the library database. `duration` is only
/// populated for episodes and movies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaItem {
    pub id: MediaItemId,
    pub item_type: MediaItemType,
    pub parent_id: Option<MediaItemId>,
    pub section_id: SectionId,
    /// Milliseconds. `None` for items that cannot own markers.
    pub duration: Option<i64>,
    pub title: String,
}

impl MediaItem {
    pub fn is_markerable(&self) -> bool {
        self.item_type.is_markerable()
    }
}
