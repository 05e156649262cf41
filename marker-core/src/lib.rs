//! Core library for the marker-management service: marker CRUD, bulk
//! shift, the action log / purge reconciler, and the in-memory marker
//! cache. Everything here is transport-agnostic; `marker-server` is the
//! only crate that knows about HTTP.

pub mod cache;
pub mod db;
pub mod engine;
pub mod error;
pub mod locks;
pub mod service;

pub use engine::shift::ShiftResult;
pub use error::{MarkerError, Result};
pub use service::{Service, ServiceState};

pub mod prelude {
    pub use crate::cache::MarkerCache;
    pub use crate::engine::shift::ShiftResult;
    pub use crate::error::{MarkerError, Result};
    pub use crate::service::{Service, ServiceState};
}
