//! Adapter implementations for the two storage ports `marker-contracts`
//! defines: the foreign library database and the service's own action log.

pub mod memory;

#[cfg(feature = "database")]
pub mod action_log_sqlite;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::{MemoryActionLogStore, MemoryLibraryAdapter};

#[cfg(feature = "database")]
pub use action_log_sqlite::SqliteActionLogStore;
#[cfg(feature = "database")]
pub use postgres::PostgresLibraryAdapter;
