//! Strongly typed identifiers.
//!
//! Marker and media item ids are integers assigned by the foreign library
//! database (mirroring e.g. a Plex `ratingKey`), unlike the UUID-based ids
//! ferrex uses for its own natively-owned media; everything here is a thin
//! newtype over `i64` so the engine never mixes up a marker id with a
//! parent id by accident.

use std::fmt;

macro_rules! int_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

int_id!(MarkerId);
int_id!(MediaItemId);
int_id!(SectionId);
int_id!(ActionOpId);

/// Stable identifier the action log assigns to a marker at birth, used to
/// correlate an `Add` with later `Edit`/`Delete`/`Restore` entries even if
/// the library database renumbers the marker's row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RestoreKey(pub uuid::Uuid);

impl RestoreKey {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RestoreKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RestoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
