//! Per-parent and per-subtree write locks (`spec.md` §5).
//!
//! CRUD operations serialize on the parent they mutate; the Shift Engine
//! serializes on the subtree root and additionally takes every affected
//! parent's lock (in ascending `MediaItemId` order, to avoid deadlocking
//! against a concurrent CRUD call racing for the same two parents) before
//! writing. This is the same "concurrent map of fine-grained locks" shape
//! `ferrex-core::auth::state_manager::AuthStateManager` uses for its
//! per-device state, just keyed by `MediaItemId` instead of device id.

use std::sync::Arc;

use dashmap::DashMap;
use marker_model::MediaItemId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A table of lazily-created, reference-counted per-key locks.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: DashMap<MediaItemId, Arc<Mutex<()>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    fn entry(&self, key: MediaItemId) -> Arc<Mutex<()>> {
        self.locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    pub async fn lock(&self, key: MediaItemId) -> OwnedMutexGuard<()> {
        self.entry(key).lock_owned().await
    }

    /// Locks every key in `keys`, sorted ascending, so two callers racing
    /// over an overlapping key set always acquire them in the same order.
    pub async fn lock_many(&self, keys: &[MediaItemId]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted = keys.to_vec();
        sorted.sort();
        sorted.dedup();
        let mut guards = Vec::with_capacity(sorted.len());
        for key in sorted {
            guards.push(self.lock(key).await);
        }
        guards
    }
}
