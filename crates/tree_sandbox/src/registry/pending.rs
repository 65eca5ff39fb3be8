//! Changes waiting for a registry entry that does not exist yet.
//!
//! Created once at startup and shared with the patcher. A change is tracked when a
//! patch targets a missing key, replaced by later patches to the same key, removed
//! by [`PendingChanges::forget`], and handed back by [`PendingChanges::drain`] when
//! the host rebuilds its registry.
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::registry::{LiveFeature, RegistryKey};

#[derive(Debug, Default)]
pub struct PendingChanges {
    changes: Mutex<BTreeMap<RegistryKey, LiveFeature>>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<RegistryKey, LiveFeature>> {
        self.changes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `replacement` for `key`, returning the change it superseded.
    pub fn track(&self, key: RegistryKey, replacement: LiveFeature) -> Option<LiveFeature> {
        self.lock().insert(key, replacement)
    }

    /// Drops the tracked change for `key`.
    pub fn forget(&self, key: &RegistryKey) -> Option<LiveFeature> {
        self.lock().remove(key)
    }

    pub fn get(&self, key: &RegistryKey) -> Option<LiveFeature> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &RegistryKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn keys(&self) -> Vec<RegistryKey> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes and returns every tracked change in key order.
    pub fn drain(&self) -> Vec<(RegistryKey, LiveFeature)> {
        std::mem::take(&mut *self.lock()).into_iter().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
