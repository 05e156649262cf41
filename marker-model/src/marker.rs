//! The central entity: a half-open `[start, end)` millisecond interval
//! attached to an episode or movie.

use crate::ids::{MarkerId, MediaItemId, SectionId};

#[cfg(feature = "chrono")]
use chrono::{DateTime, Utc};

/// The three marker types the service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MarkerType {
    Intro,
    Credits,
    Commercial,
}

impl MarkerType {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerType::Intro => "intro",
            MarkerType::Credits => "credits",
            MarkerType::Commercial => "commercial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "intro" => Some(MarkerType::Intro),
            "credits" => Some(MarkerType::Credits),
            "commercial" => Some(MarkerType::Commercial),
            _ => None,
        }
    }
}

impl std::fmt::Display for MarkerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marker row as understood by the service. Mirrors the library
/// database's own marker row plus the service-maintained `created_by_user`
/// flag; there is no separate "wire" shape — serializers live at the
/// transport boundary (ferrex's `ferrex-server` handlers do the same:
/// domain types serialize directly, no row/DTO duplication).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marker {
    pub id: MarkerId,
    pub parent_id: MediaItemId,
    pub season_id: Option<MediaItemId>,
    pub show_id: Option<MediaItemId>,
    pub section_id: SectionId,
    /// Milliseconds, inclusive.
    pub start: i64,
    /// Milliseconds, exclusive.
    pub end: i64,
    /// 0-based ordinal among this parent's markers, sorted by `start`.
    pub index: i32,
    pub marker_type: MarkerType,
    /// Only meaningful when `marker_type == Credits`.
    pub is_final: bool,
    pub created_by_user: bool,
    #[cfg(feature = "chrono")]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "chrono")]
    pub modified_at: DateTime<Utc>,
}

impl Marker {
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// `true` if this interval intersects `other`'s; touching endpoints do
    /// not count as overlap (invariant I1).
    pub fn overlaps(&self, other: &Marker) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Clamp `final` to `false` whenever the type isn't `Credits`
    /// (invariant I4: `final => type = credits`).
    pub fn normalize_final(&mut self) {
        if self.marker_type != MarkerType::Credits {
            self.is_final = false;
        }
    }
}
