//! The action log: a durable, append-only record of every marker mutation,
//! used to reconstruct markers the foreign library database silently wiped.

use crate::ids::{ActionOpId, MarkerId, MediaItemId, RestoreKey, SectionId};
use crate::marker::MarkerType;

#[cfg(feature = "chrono")]
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ActionOp {
    Add,
    Edit,
    Delete,
    Restore,
    Ignore,
}

impl ActionOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionOp::Add => "add",
            ActionOp::Edit => "edit",
            ActionOp::Delete => "delete",
            ActionOp::Restore => "restore",
            ActionOp::Ignore => "ignore",
        }
    }
}

/// One immutable row in the action log. Entries are never deleted; `Ignore`
/// marks a purge as dismissed without forgetting the history.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionLogEntry {
    pub op_id: ActionOpId,
    pub op: ActionOp,
    pub restore_key: RestoreKey,
    /// This entry's position within the history of its `restore_key`,
    /// assigned by the store's `restore_key_seq` generator (`spec.md` §6):
    /// `0` for the entry that minted the key, incrementing from there.
    pub restore_seq: i64,
    /// The marker id at the time this entry was written; the library
    /// database may renumber the marker on restore, so this is only
    /// meaningful relative to `op`'s position in the log.
    pub marker_id: MarkerId,
    pub parent_id: MediaItemId,
    pub section_id: SectionId,
    pub start: i64,
    pub end: i64,
    pub marker_type: MarkerType,
    pub is_final: bool,
    /// Populated for `Edit` entries only.
    pub old_start: Option<i64>,
    pub old_end: Option<i64>,
    pub ignored: bool,
    #[cfg(feature = "chrono")]
    pub at: DateTime<Utc>,
}
