//! Trait surfaces that describe how the marker engine talks to its
//! storage collaborators: the foreign library database, and the service's
//! own action log.

pub mod action_log_port;
pub mod error;
pub mod library_port;

pub use action_log_port::{ActionLogStore, NewActionLogEntry};
pub use error::{PortError, Result as PortResult};
pub use library_port::{IndexUpdate, LibraryAdapter, MarkerUpdate, NewMarker, ShiftUpdate};

pub mod prelude {
    pub use super::action_log_port::{ActionLogStore, NewActionLogEntry};
    pub use super::error::{PortError, Result as PortResult};
    pub use super::library_port::{
        IndexUpdate, LibraryAdapter, MarkerUpdate, NewMarker, ShiftUpdate,
    };
}
