//! Resolves a [`Replacer`] into a concrete definition per draw.
use rand::RngCore;
use tracing::debug;

use crate::definition::TreeDefinition;
use crate::error::Result;
use crate::growth::{GenerationAlgorithm, TreeGrower};
use crate::replacer::selection::{pick_first_triggered, total_chance, uniform_index};
use crate::replacer::{Replacer, ReplacerStrategy};
use crate::world::{Coordinate, SandboxWorld};

/// Validated choice logic for one replacer.
#[derive(Debug, Clone)]
pub struct ReplacerResolver {
    replacer: Replacer,
}

impl ReplacerResolver {
    /// Validates `replacer`. Weighted chances summing above 1 are kept as-is and logged.
    pub fn new(replacer: Replacer) -> Result<Self> {
        replacer.validate()?;
        if let ReplacerStrategy::Weighted { alternatives, .. } = &replacer.strategy {
            let total = total_chance(alternatives);
            if total > 1.0 {
                debug!(
                    "Replacer '{}' has total chance {:.3} > 1; later alternatives and the default may be unreachable.",
                    replacer.target, total
                );
            }
        }
        Ok(Self { replacer })
    }

    pub fn target(&self) -> &str {
        &self.replacer.target
    }

    pub fn replacer(&self) -> &Replacer {
        &self.replacer
    }

    /// Draws one definition.
    pub fn resolve(&self, rng: &mut dyn RngCore) -> &TreeDefinition {
        match &self.replacer.strategy {
            ReplacerStrategy::Uniform { candidates } => {
                // Validation guarantees a non-empty pool.
                let index = uniform_index(candidates.len(), rng).unwrap_or(0);
                &candidates[index]
            }
            ReplacerStrategy::Weighted {
                default,
                alternatives,
            } => pick_first_triggered(alternatives, rng)
                .map(|a| &a.definition)
                .unwrap_or(default),
        }
    }
}

/// Grows whatever definition a replacer resolves to.
///
/// The definition handed to [`GenerationAlgorithm::generate`] is ignored in favour
/// of the resolved one, so a replacer can be previewed like a single tree.
#[derive(Debug, Clone)]
pub struct SelectorGrower<A = TreeGrower> {
    resolver: ReplacerResolver,
    inner: A,
}

impl SelectorGrower {
    pub fn new(resolver: ReplacerResolver) -> Self {
        Self::with_algorithm(resolver, TreeGrower)
    }
}

impl<A: GenerationAlgorithm> SelectorGrower<A> {
    pub fn with_algorithm(resolver: ReplacerResolver, inner: A) -> Self {
        Self { resolver, inner }
    }

    pub fn resolver(&self) -> &ReplacerResolver {
        &self.resolver
    }
}

impl<A: GenerationAlgorithm> GenerationAlgorithm for SelectorGrower<A> {
    fn generate(
        &self,
        world: &mut dyn SandboxWorld,
        rng: &mut dyn RngCore,
        origin: Coordinate,
        _definition: &TreeDefinition,
    ) -> bool {
        let chosen = self.resolver.resolve(rng);
        self.inner.generate(world, rng, origin, chosen)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::IVec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::replacer::WeightedAlternative;
    use crate::world::{MaterialState, MockEnvironment};

    fn counts(resolver: &ReplacerResolver, draws: usize, seed: u64) -> HashMap<String, usize> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = HashMap::new();
        for _ in 0..draws {
            *counts.entry(resolver.resolve(&mut rng).id.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn weighted_alternative_hits_about_its_chance() {
        let replacer = Replacer::weighted(
            "minecraft:oak",
            TreeDefinition::oak("oak_small"),
            vec![WeightedAlternative::new(0.3, TreeDefinition::oak("oak_giant"))],
        );
        let resolver = ReplacerResolver::new(replacer).unwrap();
        let counts = counts(&resolver, 1000, 2024);

        let giant = counts.get("oak_giant").copied().unwrap_or(0);
        let small = counts.get("oak_small").copied().unwrap_or(0);
        assert_eq!(giant + small, 1000);
        assert!((240..=360).contains(&giant), "oak_giant drawn {giant} times");
    }

    #[test]
    fn uniform_candidates_are_balanced() {
        let candidates = ["birch", "oak", "spruce", "cherry"]
            .into_iter()
            .map(TreeDefinition::oak)
            .collect();
        let replacer = Replacer::uniform("minecraft:oak", candidates).unwrap();
        let resolver = ReplacerResolver::new(replacer).unwrap();
        let counts = counts(&resolver, 4000, 7);
        assert_eq!(counts.len(), 4);
        for (id, n) in counts {
            assert!((850..=1150).contains(&n), "{id} drawn {n} times");
        }
    }

    #[test]
    fn oversubscribed_chances_never_reach_default() {
        let replacer = Replacer::weighted(
            "minecraft:oak",
            TreeDefinition::oak("fallback"),
            vec![
                WeightedAlternative::new(1.0, TreeDefinition::oak("always")),
                WeightedAlternative::new(0.5, TreeDefinition::oak("never")),
            ],
        );
        let resolver = ReplacerResolver::new(replacer).unwrap();
        let counts = counts(&resolver, 200, 1);
        assert_eq!(counts.get("always"), Some(&200));
    }

    #[test]
    fn selector_grower_uses_resolved_definition() {
        let birch = TreeDefinition::oak("birch").with_materials("birch_log", "birch_leaves");
        let replacer = Replacer::uniform("minecraft:oak", vec![birch]).unwrap();
        let resolver = ReplacerResolver::new(replacer).unwrap();
        let grower = SelectorGrower::new(resolver);

        let mut env = MockEnvironment::new();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(grower.generate(&mut env, &mut rng, IVec3::ZERO, &TreeDefinition::oak("ignored")));
        let placements = env.into_placements();
        assert!(placements
            .iter()
            .any(|p| p.state.id == MaterialState::new("birch_log").id));
        assert!(placements.iter().all(|p| p.state.id.path() != "oak_log"));
    }
}
