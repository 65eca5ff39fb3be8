//! Placement legality: which existing materials a natural-growth placement may overwrite.
use std::collections::BTreeSet;

use crate::world::material::{MaterialCatalog, MaterialCategory, MaterialId, MaterialState};

/// Pure overwrite predicate backed by a [`MaterialCatalog`].
///
/// A candidate may replace an existing material only when the existing material's
/// category is in the yielding set. The candidate itself is not inspected.
#[derive(Clone, Debug)]
pub struct LegalityPolicy {
    catalog: MaterialCatalog,
    yielding: BTreeSet<MaterialCategory>,
}

impl Default for LegalityPolicy {
    fn default() -> Self {
        Self::new(MaterialCatalog::with_defaults())
    }
}

impl LegalityPolicy {
    /// Creates a policy with the default yielding categories.
    pub fn new(catalog: MaterialCatalog) -> Self {
        Self {
            catalog,
            yielding: MaterialCategory::YIELDING.into_iter().collect(),
        }
    }

    /// Adds a category to the yielding set.
    pub fn with_yielding(mut self, category: MaterialCategory) -> Self {
        self.yielding.insert(category);
        self
    }

    /// Removes a category from the yielding set.
    pub fn without_yielding(mut self, category: MaterialCategory) -> Self {
        self.yielding.remove(&category);
        self
    }

    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    pub fn category_of(&self, id: &MaterialId) -> MaterialCategory {
        self.catalog.category_of(id)
    }

    pub fn is_yielding(&self, state: &MaterialState) -> bool {
        self.yielding.contains(&self.category_of(&state.id))
    }

    /// True when `state` counts as empty space.
    pub fn is_empty_space(&self, state: &MaterialState) -> bool {
        self.category_of(&state.id) == MaterialCategory::Empty
    }

    /// Decides whether `candidate` may overwrite `existing`.
    pub fn can_replace(&self, existing: &MaterialState, _candidate: &MaterialState) -> bool {
        self.is_yielding(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_materials_block_every_candidate() {
        let policy = LegalityPolicy::default();
        let candidates = ["oak_log", "oak_leaves", "air", "stone", "water"];
        for existing in ["oak_log", "stone", "dirt", "grass_block", "oak_planks"] {
            for candidate in candidates {
                assert!(
                    !policy.can_replace(&existing.into(), &candidate.into()),
                    "{candidate} must not replace {existing}"
                );
            }
        }
    }

    #[test]
    fn yielding_materials_accept_overwrite() {
        let policy = LegalityPolicy::default();
        for existing in [
            "air",
            "oak_leaves",
            "short_grass",
            "fern",
            "vine",
            "moss_carpet",
            "oak_sapling",
            "water",
        ] {
            assert!(
                policy.can_replace(&existing.into(), &"oak_log".into()),
                "{existing} should yield"
            );
        }
    }

    #[test]
    fn yielding_set_is_configurable() {
        let policy = LegalityPolicy::default().without_yielding(MaterialCategory::Fluid);
        assert!(!policy.can_replace(&"water".into(), &"oak_log".into()));

        let policy = LegalityPolicy::default().with_yielding(MaterialCategory::Soil);
        assert!(policy.can_replace(&"dirt".into(), &"oak_log".into()));
    }
}
