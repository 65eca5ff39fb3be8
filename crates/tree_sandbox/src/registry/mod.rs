//! Live registry objects and the seams the patcher talks to.
//!
//! The host owns its registry; the core only sees it through two collaborators:
//! [`LiveRegistry`] looks up a live entry by key and [`FeatureFactory`] builds a
//! fresh host object from a definition or replacer. A live entry is shared as a
//! [`Handle`] (`Arc<LiveEntry>`), so patching its contents in place is visible to
//! every holder without a new lookup. [`MemoryRegistry`] is an in-process registry
//! for sandboxes, tests and demos.
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::definition::{CanopyShape, FeatureSize, TreeDefinition, TrunkShape};
use crate::error::Result;
use crate::replacer::{Replacer, ReplacerStrategy, WeightedAlternative};
use crate::world::material::MaterialState;

pub mod fields;
pub mod patcher;
pub mod pending;

use fields::{patchable_fields, FieldWriteError};
pub use patcher::{PatchOutcome, RegistryPatcher};
pub use pending::PendingChanges;

/// Key of a registry entry, e.g. `tree_engine:my_oak`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryKey(String);

impl RegistryKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegistryKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RegistryKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Live tree feature configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveTreeConfig {
    pub trunk_provider: MaterialState,
    pub foliage_provider: MaterialState,
    pub trunk_placer: TrunkShape,
    pub foliage_placer: CanopyShape,
    pub minimum_size: FeatureSize,
    pub ignore_vines: bool,
}

patchable_fields!(LiveTreeConfig {
    trunk_provider,
    foliage_provider,
    trunk_placer,
    foliage_placer,
    minimum_size,
    ignore_vines,
});

impl From<&TreeDefinition> for LiveTreeConfig {
    fn from(definition: &TreeDefinition) -> Self {
        Self {
            trunk_provider: definition.trunk_material.clone(),
            foliage_provider: definition.foliage_material.clone(),
            trunk_placer: definition.trunk,
            foliage_placer: definition.canopy,
            minimum_size: definition.minimum_size,
            ignore_vines: definition.ignore_vines,
        }
    }
}

/// Live weighted selector: ordered chances with a default.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSelectorConfig {
    pub features: Vec<WeightedAlternative>,
    pub default_feature: TreeDefinition,
}

patchable_fields!(LiveSelectorConfig {
    features,
    default_feature,
});

/// Live uniform selector.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSimpleSelectorConfig {
    pub features: Vec<TreeDefinition>,
}

patchable_fields!(LiveSimpleSelectorConfig { features });

/// Declared shape of a live object; patches only copy between equal shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureShape {
    Tree,
    Selector,
    SimpleSelector,
}

/// A host configuration object.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveFeature {
    Tree(LiveTreeConfig),
    Selector(LiveSelectorConfig),
    SimpleSelector(LiveSimpleSelectorConfig),
}

impl LiveFeature {
    pub fn shape(&self) -> FeatureShape {
        match self {
            LiveFeature::Tree(_) => FeatureShape::Tree,
            LiveFeature::Selector(_) => FeatureShape::Selector,
            LiveFeature::SimpleSelector(_) => FeatureShape::SimpleSelector,
        }
    }

    /// Names of the fields a patch copies for this shape.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            LiveFeature::Tree(_) => LiveTreeConfig::FIELDS,
            LiveFeature::Selector(_) => LiveSelectorConfig::FIELDS,
            LiveFeature::SimpleSelector(_) => LiveSimpleSelectorConfig::FIELDS,
        }
    }

    /// Copies one field from `other`, which must have the same shape.
    pub fn copy_field(
        &mut self,
        name: &str,
        other: &LiveFeature,
    ) -> std::result::Result<(), FieldWriteError> {
        match (self, other) {
            (LiveFeature::Tree(a), LiveFeature::Tree(b)) => a.write_field(name, b),
            (LiveFeature::Selector(a), LiveFeature::Selector(b)) => a.write_field(name, b),
            (LiveFeature::SimpleSelector(a), LiveFeature::SimpleSelector(b)) => {
                a.write_field(name, b)
            }
            _ => Err(FieldWriteError::ShapeMismatch {
                field: name.to_owned(),
            }),
        }
    }
}

/// A live registry entry. Contents change in place; identity never does.
#[derive(Debug)]
pub struct LiveEntry {
    key: RegistryKey,
    feature: RwLock<LiveFeature>,
    frozen: BTreeSet<&'static str>,
}

/// Shared reference to a live entry.
pub type Handle = Arc<LiveEntry>;

impl LiveEntry {
    pub fn new(key: impl Into<RegistryKey>, feature: LiveFeature) -> Handle {
        Self::with_frozen(key, feature, [])
    }

    /// Entry whose `frozen` fields cannot be written by a patch.
    pub fn with_frozen(
        key: impl Into<RegistryKey>,
        feature: LiveFeature,
        frozen: impl IntoIterator<Item = &'static str>,
    ) -> Handle {
        Arc::new(Self {
            key: key.into(),
            feature: RwLock::new(feature),
            frozen: frozen.into_iter().collect(),
        })
    }

    pub fn key(&self) -> &RegistryKey {
        &self.key
    }

    pub fn is_frozen(&self, field: &str) -> bool {
        self.frozen.contains(field)
    }

    /// Fails with [`FieldWriteError::Frozen`] when a patch may not write `field`.
    pub fn check_writable(&self, field: &str) -> std::result::Result<(), FieldWriteError> {
        if self.is_frozen(field) {
            Err(FieldWriteError::Frozen(field.to_owned()))
        } else {
            Ok(())
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, LiveFeature> {
        self.feature.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, LiveFeature> {
        self.feature.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone of the current contents.
    pub fn snapshot(&self) -> LiveFeature {
        self.read().clone()
    }
}

/// Host registry lookup.
pub trait LiveRegistry: Send + Sync {
    fn lookup(&self, key: &RegistryKey) -> Option<Handle>;
}

/// Builds fresh host objects.
pub trait FeatureFactory: Send + Sync {
    fn build(&self, definition: &TreeDefinition) -> Result<LiveFeature>;

    fn build_replacer(&self, replacer: &Replacer) -> Result<LiveFeature> {
        Ok(match &replacer.strategy {
            ReplacerStrategy::Uniform { candidates } => {
                LiveFeature::SimpleSelector(LiveSimpleSelectorConfig {
                    features: candidates.clone(),
                })
            }
            ReplacerStrategy::Weighted {
                default,
                alternatives,
            } => LiveFeature::Selector(LiveSelectorConfig {
                features: alternatives.clone(),
                default_feature: default.clone(),
            }),
        })
    }
}

/// Factory producing [`LiveFeature::Tree`] straight from a definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeFeatureFactory;

impl FeatureFactory for TreeFeatureFactory {
    fn build(&self, definition: &TreeDefinition) -> Result<LiveFeature> {
        definition.validate()?;
        Ok(LiveFeature::Tree(LiveTreeConfig::from(definition)))
    }
}

/// In-process registry keyed by [`RegistryKey`].
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: RwLock<HashMap<RegistryKey, Handle>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `feature` under `key`, returning its handle.
    pub fn register(&self, key: impl Into<RegistryKey>, feature: LiveFeature) -> Handle {
        let handle = LiveEntry::new(key, feature);
        self.insert(Arc::clone(&handle));
        handle
    }

    pub fn insert(&self, handle: Handle) -> Option<Handle> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.key().clone(), handle)
    }

    pub fn remove(&self, key: &RegistryKey) -> Option<Handle> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LiveRegistry for MemoryRegistry {
    fn lookup(&self, key: &RegistryKey) -> Option<Handle> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
