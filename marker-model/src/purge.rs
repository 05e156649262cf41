//! A marker the service once knew about (per the action log) but that no
//! longer exists in the live library database.

use crate::ids::{ActionOpId, MarkerId, MediaItemId, RestoreKey, SectionId};
use crate::marker::MarkerType;

#[cfg(feature = "chrono")]
use chrono::{DateTime, Utc};

/// The last known state of a purged marker, carried for display and for
/// `Restore` to recreate it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PurgedMarker {
    pub restore_key: RestoreKey,
    /// The marker's id as last known to the library database, before it was
    /// wiped.
    pub old_marker_id: MarkerId,
    pub parent_id: MediaItemId,
    pub section_id: SectionId,
    pub start: i64,
    pub end: i64,
    pub marker_type: MarkerType,
    pub is_final: bool,
    /// The action log entry this candidate's last known state was taken
    /// from.
    pub last_seen_op: ActionOpId,
    #[cfg(feature = "chrono")]
    pub at: DateTime<Utc>,
}
