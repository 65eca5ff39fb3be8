//! Replacers: rules that swap one generation rule for a choice among definitions.
//!
//! A [`Replacer`] names the target it overrides and a [`ReplacerStrategy`]:
//! - [`ReplacerStrategy::Uniform`]: every candidate is equally likely.
//! - [`ReplacerStrategy::Weighted`]: alternatives are tried in order against fresh
//!   draws; the first hit wins and the default is the fallback.
//!
//! [`resolver::ReplacerResolver`] turns a validated replacer into the choice
//! logic, and [`resolver::SelectorGrower`] plugs it into a generation algorithm.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::definition::TreeDefinition;
use crate::error::{Error, Result};

pub mod resolver;
pub mod selection;

pub use resolver::{ReplacerResolver, SelectorGrower};

/// One weighted alternative.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedAlternative {
    /// Probability this alternative triggers when its turn comes.
    pub chance: f32,
    pub definition: TreeDefinition,
}

impl WeightedAlternative {
    pub fn new(chance: f32, definition: TreeDefinition) -> Self {
        Self { chance, definition }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub enum ReplacerStrategy {
    Uniform {
        candidates: Vec<TreeDefinition>,
    },
    Weighted {
        default: TreeDefinition,
        alternatives: Vec<WeightedAlternative>,
    },
}

/// A target rule and how to choose its replacement.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Replacer {
    /// Key of the rule being overridden, e.g. `minecraft:oak`.
    pub target: String,
    pub strategy: ReplacerStrategy,
}

impl Replacer {
    /// Uniform replacer; rejects an empty candidate pool.
    pub fn uniform(target: impl Into<String>, candidates: Vec<TreeDefinition>) -> Result<Self> {
        let replacer = Self {
            target: target.into(),
            strategy: ReplacerStrategy::Uniform { candidates },
        };
        replacer.validate()?;
        Ok(replacer)
    }

    pub fn weighted(
        target: impl Into<String>,
        default: TreeDefinition,
        alternatives: Vec<WeightedAlternative>,
    ) -> Self {
        Self {
            target: target.into(),
            strategy: ReplacerStrategy::Weighted {
                default,
                alternatives,
            },
        }
    }

    /// Every definition this replacer can produce.
    pub fn definitions(&self) -> Vec<&TreeDefinition> {
        match &self.strategy {
            ReplacerStrategy::Uniform { candidates } => candidates.iter().collect(),
            ReplacerStrategy::Weighted {
                default,
                alternatives,
            } => std::iter::once(default)
                .chain(alternatives.iter().map(|a| &a.definition))
                .collect(),
        }
    }

    /// Validates the replacer, returning an error if invalid.
    ///
    /// Chances are only checked to be finite and non-negative; their sum is not bounded.
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(Error::InvalidConfig("replacer target must not be empty".into()));
        }
        match &self.strategy {
            ReplacerStrategy::Uniform { candidates } if candidates.is_empty() => {
                return Err(Error::InvalidConfig(format!(
                    "replacer '{}': replacement pool cannot be empty",
                    self.target
                )));
            }
            ReplacerStrategy::Uniform { .. } => {}
            ReplacerStrategy::Weighted { alternatives, .. } => {
                if let Some(bad) = alternatives
                    .iter()
                    .find(|a| !a.chance.is_finite() || a.chance < 0.0)
                {
                    return Err(Error::InvalidConfig(format!(
                        "replacer '{}': chance {} for '{}' must be a finite value >= 0",
                        self.target, bad.chance, bad.definition.id
                    )));
                }
            }
        }
        for definition in self.definitions() {
            definition.validate()?;
        }
        Ok(())
    }
}
