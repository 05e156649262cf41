//! The stable error taxonomy from `spec.md` §7, following the shape of
//! `ferrex-core::error::MediaError` (one `thiserror` variant per kind, with
//! `#[from]` conversions collapsing storage failures into `Internal`).

use marker_contracts::PortError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkerError {
    /// Parameter parse or validation failure: `start >= end`, negative
    /// times, `end > duration`, an invalid type string, `final` set on a
    /// non-credits Add, or an unknown subtree id kind.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The target item exists but cannot own markers (not an episode or
    /// movie).
    #[error("target is not markerable: {0}")]
    BadTarget(String),

    /// A marker id or item id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The proposed interval conflicts with another marker on the same
    /// parent (invariant I1).
    #[error("overlaps an existing marker: {0}")]
    Overlap(String),

    /// A shift was refused because the subtree contains a parent with more
    /// than one non-ignored marker and `force` was not set.
    #[error("linked markers require force: {0}")]
    Conflict(String),

    /// A shift was refused because one or more markers would fall outside
    /// any usable interval and `force` was not set.
    #[error("shift would overflow: {0}")]
    Overflow(String),

    /// A purge or extended-stats operation was requested while the
    /// corresponding config switch is off.
    #[error("feature disabled: {0}")]
    FeatureDisabled(String),

    /// The service is suspended or the library DB handle is closed.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// A storage error or an invariant violation detected at runtime; the
    /// mutation has been rolled back.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, MarkerError>;

impl From<PortError> for MarkerError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(msg) => MarkerError::NotFound(msg),
            PortError::Backend(msg) => MarkerError::Internal(msg),
        }
    }
}
