//! Frequently used combinators for downstream crates.

pub use crate::action_log::{ActionLogEntry, ActionOp};
pub use crate::breakdown::{Breakdown, ItemBucket, PackedBucket};
pub use crate::error::{ModelError, Result as ModelResult};
pub use crate::ids::{ActionOpId, MarkerId, MediaItemId, RestoreKey, SectionId};
pub use crate::marker::{Marker, MarkerType};
pub use crate::media_item::{MediaItem, MediaItemType};
pub use crate::purge::PurgedMarker;
pub use crate::section::Section;
