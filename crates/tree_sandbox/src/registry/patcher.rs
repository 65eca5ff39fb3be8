//! In-place patching of live registry entries.
//!
//! A patch builds a fresh replacement object through the [`FeatureFactory`] and
//! copies it onto the live entry field by field. Shapes must match; frozen or
//! failing fields are skipped with a warning and never roll back earlier fields.
//! When the key has no live entry the replacement is tracked in
//! [`PendingChanges`] until the host rebuilds its registry; a later applied
//! patch for the same key drops the tracked change.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::definition::TreeDefinition;
use crate::error::Result;
use crate::registry::{
    FeatureFactory, LiveEntry, LiveFeature, LiveRegistry, PendingChanges, RegistryKey,
};
use crate::replacer::Replacer;

/// Result of a single patch.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchOutcome {
    /// Fields were copied onto the live entry.
    Applied,
    /// No live entry; the change waits in [`PendingChanges`].
    Tracked,
    /// The live entry has a different shape and was left untouched.
    ShapeMismatch,
}

/// Applies definitions and replacers to a live registry.
pub struct RegistryPatcher {
    registry: Arc<dyn LiveRegistry>,
    factory: Arc<dyn FeatureFactory>,
    pending: Arc<PendingChanges>,
    key_locks: Mutex<HashMap<RegistryKey, Arc<Mutex<()>>>>,
}

impl RegistryPatcher {
    pub fn new(
        registry: Arc<dyn LiveRegistry>,
        factory: Arc<dyn FeatureFactory>,
        pending: Arc<PendingChanges>,
    ) -> Self {
        Self {
            registry,
            factory,
            pending,
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn pending(&self) -> &Arc<PendingChanges> {
        &self.pending
    }

    /// Runs `f` while holding the lock of `key`, then drops the lock if unused.
    fn with_key_lock<T>(&self, key: &RegistryKey, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.key_locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        // Clones are only taken under the map lock, so a count of one here
        // means no other caller holds or waits on this key.
        let mut locks = self.key_locks.lock().unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if locks.get(key).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(key);
        }
        result
    }

    /// Copies `replacement` onto `existing`, or tracks it when `existing` is `None`.
    pub fn patch_in_place(
        &self,
        key: &RegistryKey,
        existing: Option<&LiveEntry>,
        replacement: LiveFeature,
    ) -> PatchOutcome {
        self.with_key_lock(key, || self.patch_locked(key, existing, replacement))
    }

    fn patch_locked(
        &self,
        key: &RegistryKey,
        existing: Option<&LiveEntry>,
        replacement: LiveFeature,
    ) -> PatchOutcome {
        let Some(entry) = existing else {
            info!("No live entry for '{}'; tracking change until restart.", key);
            self.pending.track(key.clone(), replacement);
            return PatchOutcome::Tracked;
        };

        let mut live = entry.write();
        if live.shape() != replacement.shape() {
            warn!(
                "Live entry '{}' is {:?} but replacement is {:?}; leaving it untouched.",
                key,
                live.shape(),
                replacement.shape()
            );
            return PatchOutcome::ShapeMismatch;
        }

        let mut copied = 0;
        for &field in live.fields() {
            let written = entry
                .check_writable(field)
                .and_then(|()| live.copy_field(field, &replacement));
            match written {
                Ok(()) => copied += 1,
                Err(e) => warn!("Cannot copy '{}' of '{}': {}; skipping.", field, key, e),
            }
        }
        info!(
            "Patched '{}' in place ({} of {} fields).",
            key,
            copied,
            live.fields().len()
        );
        if self.pending.forget(key).is_some() {
            info!("Dropped the change tracked for '{}'; a newer one is live.", key);
        }
        PatchOutcome::Applied
    }

    fn apply(&self, key: &RegistryKey, replacement: LiveFeature) -> PatchOutcome {
        self.with_key_lock(key, || {
            let existing = self.registry.lookup(key);
            self.patch_locked(key, existing.as_deref(), replacement)
        })
    }

    /// Builds `definition` and patches it onto the entry at `key`.
    pub fn apply_patch(
        &self,
        key: &RegistryKey,
        definition: &TreeDefinition,
    ) -> Result<PatchOutcome> {
        let replacement = self.factory.build(definition)?;
        Ok(self.apply(key, replacement))
    }

    /// Builds `definition` and tracks it for `key` without touching the live entry.
    pub fn defer_patch(
        &self,
        key: &RegistryKey,
        definition: &TreeDefinition,
    ) -> Result<PatchOutcome> {
        let replacement = self.factory.build(definition)?;
        Ok(self.patch_in_place(key, None, replacement))
    }

    /// Builds the selector for `replacer` and tracks it for its target.
    pub fn defer_replacer(&self, replacer: &Replacer) -> Result<PatchOutcome> {
        replacer.validate()?;
        let replacement = self.factory.build_replacer(replacer)?;
        Ok(self.patch_in_place(&RegistryKey::new(replacer.target.clone()), None, replacement))
    }

    /// Builds the selector for `replacer` and patches it onto its target.
    pub fn apply_replacer(&self, replacer: &Replacer) -> Result<PatchOutcome> {
        replacer.validate()?;
        let replacement = self.factory.build_replacer(replacer)?;
        Ok(self.apply(&RegistryKey::new(replacer.target.clone()), replacement))
    }

    /// Drops a tracked change. Returns whether one existed.
    pub fn forget(&self, key: &RegistryKey) -> bool {
        self.pending.forget(key).is_some()
    }

    /// Patches every `(key, definition)` pair, continuing past failures.
    pub fn reload_all<I>(&self, definitions: I) -> Vec<(RegistryKey, Result<PatchOutcome>)>
    where
        I: IntoIterator<Item = (RegistryKey, TreeDefinition)>,
    {
        let results: Vec<_> = definitions
            .into_iter()
            .map(|(key, definition)| {
                let outcome = self.apply_patch(&key, &definition);
                if let Err(e) = &outcome {
                    warn!("Reload of '{}' failed: {}; continuing.", key, e);
                }
                (key, outcome)
            })
            .collect();
        info!("Reloaded {} definitions.", results.len());
        results
    }
}
