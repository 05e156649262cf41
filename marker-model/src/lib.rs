//! Core data model definitions shared across marker-service crates.
#![allow(missing_docs)]

pub mod action_log;
pub mod breakdown;
pub mod error;
pub mod ids;
pub mod marker;
pub mod media_item;
pub mod prelude;
pub mod purge;
pub mod section;

pub use action_log::{ActionLogEntry, ActionOp};
pub use breakdown::{Breakdown, ItemBucket, PackedBucket};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ActionOpId, MarkerId, MediaItemId, RestoreKey, SectionId};
pub use marker::{Marker, MarkerType};
pub use media_item::{MediaItem, MediaItemType};
pub use purge::PurgedMarker;
pub use section::Section;
