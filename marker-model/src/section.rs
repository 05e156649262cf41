//! A library section (Plex calls these "libraries"): the top-level scope
//! `get_sections`/`get_stats` operate over.

use crate::ids::SectionId;
use crate::media_item::MediaItemType;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    /// The type of top-level item the section holds (`Show` or `Movie`);
    /// music libraries are out of scope for marker management.
    pub section_type: MediaItemType,
}
