//! The Action Log Store contract (`spec.md` §4.B): a durable, append-only
//! side database the service owns outright (unlike the library database).

use async_trait::async_trait;
use marker_model::{ActionLogEntry, ActionOp, MarkerId, MediaItemId, MarkerType, RestoreKey, SectionId};

/// A new entry to append; `op_id` and `at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewActionLogEntry {
    pub op: ActionOp,
    pub restore_key: RestoreKey,
    pub marker_id: MarkerId,
    pub parent_id: MediaItemId,
    pub section_id: SectionId,
    pub start: i64,
    pub end: i64,
    pub marker_type: MarkerType,
    pub is_final: bool,
    pub old_start: Option<i64>,
    pub old_end: Option<i64>,
    pub ignored: bool,
}

#[async_trait]
pub trait ActionLogStore: Send + Sync {
    /// Appends one entry. Entries are never mutated or deleted after this.
    async fn append(&self, entry: NewActionLogEntry) -> crate::error::Result<ActionLogEntry>;

    /// Returns every entry ever written, in commit order. Used by the
    /// Purge Reconciler at startup to rebuild the purge candidate index.
    async fn all_entries(&self) -> crate::error::Result<Vec<ActionLogEntry>>;
}
