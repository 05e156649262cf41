//! The `Service` value: the single owner of the library adapter, the action
//! log store, the marker cache, and the lock tables. Engine operations
//! (`engine::crud`, `engine::shift`, `engine::purge`, `engine::query`) are
//! implemented as methods on this type in their own modules, following
//! `spec.md` §9's redesign note that process-wide singletons become fields
//! of one value constructed once at startup and injected explicitly —
//! mirroring how `ferrex-core`'s own top-level service wires its
//! repositories, auth state, and config together in one struct.

use std::collections::HashMap;
use std::sync::Arc;

use marker_contracts::{ActionLogStore, LibraryAdapter};
use marker_model::{MediaItemId, PurgedMarker, SectionId};
use parking_lot::RwLock as SyncRwLock;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::RwLock as AsyncRwLock;
use tracing::info;

use crate::cache::MarkerCache;
use crate::error::{MarkerError, Result};
use crate::locks::LockTable;

/// `FirstBoot` is handled entirely in `marker-server` before a `Service` is
/// constructed, so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Running,
    Suspended,
    ShuttingDown,
}

/// `section -> parent -> purge candidates`, rebuilt at startup by walking
/// the action log and refreshed incrementally by `engine::purge`.
pub(crate) type PurgeIndex = HashMap<SectionId, HashMap<MediaItemId, Vec<PurgedMarker>>>;

pub struct Service {
    pub(crate) library: Arc<dyn LibraryAdapter>,
    pub(crate) action_log: Option<Arc<dyn ActionLogStore>>,
    pub(crate) cache: MarkerCache,
    pub(crate) locks: LockTable,
    pub(crate) action_log_lock: AsyncMutex<()>,
    pub(crate) extended_marker_stats: bool,
    pub(crate) backup_actions: bool,
    pub(crate) state: AsyncRwLock<ServiceState>,
    pub(crate) purges: SyncRwLock<PurgeIndex>,
}

impl Service {
    /// Constructs a service in `Running` state. Does not populate the
    /// cache or the purge index; call [`Service::bootstrap`] once the set
    /// of sections to track is known.
    pub fn new(
        library: Arc<dyn LibraryAdapter>,
        action_log: Option<Arc<dyn ActionLogStore>>,
        backup_actions: bool,
        extended_marker_stats: bool,
    ) -> Self {
        Self {
            library,
            action_log,
            cache: MarkerCache::new(),
            locks: LockTable::new(),
            action_log_lock: AsyncMutex::new(()),
            extended_marker_stats,
            backup_actions,
            state: AsyncRwLock::new(ServiceState::Running),
            purges: SyncRwLock::new(HashMap::new()),
        }
    }

    /// Rebuilds the marker cache for `sections` via `SectionOverview`, then
    /// walks the action log to rebuild the purge candidate index
    /// (`spec.md` §4.F step 1). Called once at startup and again on
    /// `resume` if the cache was evicted.
    pub async fn bootstrap(&self, sections: &[SectionId]) -> Result<()> {
        if self.extended_marker_stats {
            for section_id in sections {
                let counts = self.library.section_overview(*section_id).await?;
                self.cache.rebuild_section(*section_id, counts);
            }
        }
        if self.backup_actions {
            self.rebuild_purge_index().await?;
        }
        Ok(())
    }

    /// Acquires a read guard on service state, failing fast with
    /// `Unavailable` unless the service is `Running`. Held for the
    /// duration of the calling operation so `suspend` (which takes the
    /// write lock) waits for every in-flight operation to finish before
    /// transitioning, per `spec.md` §5.
    pub(crate) async fn guard_running(&self) -> Result<tokio::sync::RwLockReadGuard<'_, ServiceState>> {
        let guard = self.state.read().await;
        if *guard != ServiceState::Running {
            return Err(MarkerError::Unavailable("service is not running".into()));
        }
        Ok(guard)
    }

    pub(crate) fn require_backup_actions(&self) -> Result<()> {
        if !self.backup_actions {
            return Err(MarkerError::FeatureDisabled("action log / purge reconciliation is disabled".into()));
        }
        Ok(())
    }

    pub fn extended_marker_stats_enabled(&self) -> bool {
        self.extended_marker_stats
    }

    /// Transitions `Running -> Suspended`. Blocks until every in-flight
    /// operation holding the state read-lock releases it.
    pub async fn suspend(&self) -> Result<()> {
        let mut guard = self.state.write().await;
        if *guard == ServiceState::ShuttingDown {
            return Err(MarkerError::Unavailable("service is shutting down".into()));
        }
        info!("suspending service");
        *guard = ServiceState::Suspended;
        Ok(())
    }

    /// Transitions `Suspended -> Running`, rebuilding the cache and purge
    /// index for `sections` since both may have been evicted.
    pub async fn resume(&self, sections: &[SectionId]) -> Result<()> {
        let mut guard = self.state.write().await;
        if *guard == ServiceState::ShuttingDown {
            return Err(MarkerError::Unavailable("service is shutting down".into()));
        }
        *guard = ServiceState::Running;
        drop(guard);
        info!("resuming service");
        self.bootstrap(sections).await
    }

    /// Transitions to `ShuttingDown`; no further mutating operation will
    /// be admitted after this returns.
    pub async fn begin_shutdown(&self) {
        let mut guard = self.state.write().await;
        *guard = ServiceState::ShuttingDown;
    }
}
