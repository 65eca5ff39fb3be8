//! Flat authoring drafts and parent-chain resolution.
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::definition::{CanopyShape, FeatureSize, TreeDefinition, TrunkHeight, TrunkShape};
use crate::error::{Error, Result};
use crate::world::material::MaterialState;

/// Maximum number of parent hops followed while resolving a draft.
pub const MAX_INHERITANCE_DEPTH: usize = 10;

pub const DEFAULT_TRUNK_HEIGHT_MIN: i32 = 4;
pub const DEFAULT_TRUNK_HEIGHT_MAX: i32 = 6;
pub const DEFAULT_FOLIAGE_RADIUS: i32 = 2;
pub const DEFAULT_FOLIAGE_OFFSET: i32 = 0;
pub const DEFAULT_FOLIAGE_HEIGHT: i32 = 3;
pub const DEFAULT_TRUNK_KIND: &str = "straight";
pub const DEFAULT_CANOPY_KIND: &str = "blob";

/// A tree as an author writes it: every field optional, with an optional parent.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDraft {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent: Option<String>,
    pub trunk_block: Option<String>,
    pub foliage_block: Option<String>,
    pub trunk_height_min: Option<i32>,
    pub trunk_height_max: Option<i32>,
    pub foliage_radius: Option<i32>,
    pub foliage_offset: Option<i32>,
    pub trunk_placer_type: Option<String>,
    pub trunk_base_height: Option<i32>,
    pub trunk_height_rand_a: Option<i32>,
    pub trunk_height_rand_b: Option<i32>,
    pub foliage_placer_type: Option<String>,
    pub foliage_height: Option<i32>,
    pub foliage_layers: Option<i32>,
}

fn fill<T: Clone>(slot: &mut Option<T>, from: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(from);
    }
}

fn non_negative(id: &str, field: &str, value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        Error::InvalidConfig(format!("definition '{id}': {field} must be >= 0, got {value}"))
    })
}

impl TreeDraft {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_blocks(mut self, trunk: impl Into<String>, foliage: impl Into<String>) -> Self {
        self.trunk_block = Some(trunk.into());
        self.foliage_block = Some(foliage.into());
        self
    }

    /// Fills every unset field from `parent`. The id and parent link are kept.
    pub fn merge(&mut self, parent: &TreeDraft) {
        fill(&mut self.name, &parent.name);
        fill(&mut self.description, &parent.description);
        fill(&mut self.trunk_block, &parent.trunk_block);
        fill(&mut self.foliage_block, &parent.foliage_block);
        fill(&mut self.trunk_height_min, &parent.trunk_height_min);
        fill(&mut self.trunk_height_max, &parent.trunk_height_max);
        fill(&mut self.foliage_radius, &parent.foliage_radius);
        fill(&mut self.foliage_offset, &parent.foliage_offset);
        fill(&mut self.trunk_placer_type, &parent.trunk_placer_type);
        fill(&mut self.trunk_base_height, &parent.trunk_base_height);
        fill(&mut self.trunk_height_rand_a, &parent.trunk_height_rand_a);
        fill(&mut self.trunk_height_rand_b, &parent.trunk_height_rand_b);
        fill(&mut self.foliage_placer_type, &parent.foliage_placer_type);
        fill(&mut self.foliage_height, &parent.foliage_height);
        fill(&mut self.foliage_layers, &parent.foliage_layers);
    }

    fn trunk_height(&self) -> Result<TrunkHeight> {
        let min = self.trunk_height_min.unwrap_or(DEFAULT_TRUNK_HEIGHT_MIN);
        let max = self.trunk_height_max.unwrap_or(DEFAULT_TRUNK_HEIGHT_MAX);
        let base = self.trunk_base_height.unwrap_or(min);
        let rand_a = self
            .trunk_height_rand_a
            .unwrap_or_else(|| max.saturating_sub(min).max(0));
        let rand_b = self.trunk_height_rand_b.unwrap_or(0);
        Ok(TrunkHeight::new(
            non_negative(&self.id, "trunk base height", base)?,
            non_negative(&self.id, "trunk_height_rand_a", rand_a)?,
            non_negative(&self.id, "trunk_height_rand_b", rand_b)?,
        ))
    }

    /// Builds a definition from this draft, applying the authoring defaults.
    ///
    /// Unknown trunk or canopy kinds fall back to `straight` and `blob`.
    pub fn to_definition(&self) -> Result<TreeDefinition> {
        let trunk_block = self.trunk_block.as_deref().ok_or_else(|| {
            Error::InvalidConfig(format!("definition '{}' has no trunk_block", self.id))
        })?;
        let foliage_block = self.foliage_block.as_deref().ok_or_else(|| {
            Error::InvalidConfig(format!("definition '{}' has no foliage_block", self.id))
        })?;

        let height = self.trunk_height()?;
        let trunk_kind = self
            .trunk_placer_type
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| DEFAULT_TRUNK_KIND.to_owned());
        let trunk = TrunkShape::from_kind(&trunk_kind, height).unwrap_or_else(|| {
            warn!(
                "Definition '{}' has unknown trunk kind '{}'; using straight.",
                self.id, trunk_kind
            );
            TrunkShape::Straight(height)
        });

        let radius = self.foliage_radius.unwrap_or(DEFAULT_FOLIAGE_RADIUS);
        let offset = self.foliage_offset.unwrap_or(DEFAULT_FOLIAGE_OFFSET);
        let foliage_height = self
            .foliage_height
            .or(self.foliage_layers)
            .unwrap_or(DEFAULT_FOLIAGE_HEIGHT);
        let canopy_kind = self
            .foliage_placer_type
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| DEFAULT_CANOPY_KIND.to_owned());
        let canopy = CanopyShape::from_kind(&canopy_kind, radius, offset, foliage_height)
            .unwrap_or_else(|| {
                warn!(
                    "Definition '{}' has unknown canopy kind '{}'; using blob.",
                    self.id, canopy_kind
                );
                CanopyShape::Blob {
                    radius,
                    offset,
                    height: foliage_height,
                }
            });

        let definition = TreeDefinition {
            id: self.id.clone(),
            trunk_material: MaterialState::new(trunk_block),
            foliage_material: MaterialState::new(foliage_block),
            trunk,
            canopy,
            minimum_size: FeatureSize::default(),
            ignore_vines: false,
        };
        definition.validate()?;
        Ok(definition)
    }
}

/// Drafts keyed by id, resolved through their parent chains on demand.
#[derive(Debug, Clone, Default)]
pub struct DefinitionLibrary {
    drafts: HashMap<String, TreeDraft>,
}

impl DefinitionLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `draft` under its id, returning the draft it replaced.
    pub fn insert(&mut self, draft: TreeDraft) -> Option<TreeDraft> {
        self.drafts.insert(draft.id.clone(), draft)
    }

    pub fn with(mut self, draft: TreeDraft) -> Self {
        self.insert(draft);
        self
    }

    pub fn get(&self, id: &str) -> Option<&TreeDraft> {
        self.drafts.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<TreeDraft> {
        self.drafts.remove(id)
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.drafts.keys().map(String::as_str)
    }

    /// Merges the parent chain of `id` into a single draft, nearest ancestor first.
    ///
    /// Stops after [`MAX_INHERITANCE_DEPTH`] hops or at a missing parent; both cases
    /// log a warning and return what was merged so far.
    pub fn resolve(&self, id: &str) -> Result<TreeDraft> {
        let mut resolved = self
            .drafts
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownDefinition { id: id.to_owned() })?;

        let mut next = resolved.parent.clone();
        let mut depth = 0;
        while let Some(parent_id) = next {
            if depth >= MAX_INHERITANCE_DEPTH {
                warn!(
                    "Definition '{}' exceeds inheritance depth {}; using partial result.",
                    id, MAX_INHERITANCE_DEPTH
                );
                break;
            }
            let Some(parent) = self.drafts.get(&parent_id) else {
                warn!("Definition '{}' references missing parent '{}'; skipping.", id, parent_id);
                break;
            };
            resolved.merge(parent);
            next = parent.parent.clone();
            depth += 1;
        }
        Ok(resolved)
    }

    /// Resolves and builds the definition for `id`.
    pub fn build(&self, id: &str) -> Result<TreeDefinition> {
        self.resolve(id)?.to_definition()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_fields_win_over_parent() {
        let base = TreeDraft {
            trunk_height_min: Some(5),
            foliage_radius: Some(3),
            ..TreeDraft::new("base").with_blocks("oak_log", "oak_leaves")
        };
        let child = TreeDraft {
            foliage_radius: Some(1),
            trunk_block: Some("birch_log".into()),
            ..TreeDraft::new("child").with_parent("base")
        };
        let library = DefinitionLibrary::new().with(base).with(child);

        let resolved = library.resolve("child").unwrap();
        assert_eq!(resolved.id, "child");
        assert_eq!(resolved.foliage_radius, Some(1));
        assert_eq!(resolved.trunk_height_min, Some(5));
        assert_eq!(resolved.trunk_block.as_deref(), Some("birch_log"));
        assert_eq!(resolved.foliage_block.as_deref(), Some("oak_leaves"));
    }

    #[test]
    fn cyclic_chain_stops_at_depth_bound() {
        let a = TreeDraft::new("a").with_parent("b");
        let b = TreeDraft {
            foliage_radius: Some(4),
            ..TreeDraft::new("b").with_parent("a")
        };
        let library = DefinitionLibrary::new().with(a).with(b);

        let resolved = library.resolve("a").unwrap();
        assert_eq!(resolved.foliage_radius, Some(4));
        assert_eq!(resolved.parent.as_deref(), Some("b"));
    }

    #[test]
    fn long_chain_is_cut_after_ten_hops() {
        let mut library = DefinitionLibrary::new();
        for i in 0..12 {
            let mut draft = TreeDraft::new(format!("t{i}")).with_parent(format!("t{}", i + 1));
            if i == 11 {
                draft.foliage_offset = Some(7);
            }
            if i == 10 {
                draft.foliage_height = Some(9);
            }
            library.insert(draft);
        }

        let resolved = library.resolve("t0").unwrap();
        assert_eq!(resolved.foliage_height, Some(9));
        assert_eq!(resolved.foliage_offset, None);
    }

    #[test]
    fn missing_draft_is_unknown_definition() {
        let library = DefinitionLibrary::new();
        assert!(matches!(
            library.resolve("nope"),
            Err(Error::UnknownDefinition { .. })
        ));
    }

    #[test]
    fn build_applies_defaults() {
        let library = DefinitionLibrary::new()
            .with(TreeDraft::new("plain").with_blocks("oak_log", "oak_leaves"));
        let def = library.build("plain").unwrap();
        assert_eq!(def.trunk, TrunkShape::Straight(TrunkHeight::new(4, 2, 0)));
        assert_eq!(
            def.canopy,
            CanopyShape::Blob {
                radius: 2,
                offset: 0,
                height: 3
            }
        );
        assert_eq!(def.trunk_material, MaterialState::new("oak_log"));
    }

    #[test]
    fn unknown_kinds_fall_back() {
        let draft = TreeDraft {
            trunk_placer_type: Some("Twisting".into()),
            foliage_placer_type: Some("FANCY".into()),
            ..TreeDraft::new("odd").with_blocks("oak_log", "oak_leaves")
        };
        let def = draft.to_definition().unwrap();
        assert_eq!(def.trunk.kind(), "straight");
        assert_eq!(def.canopy.kind(), "blob");

        let draft = TreeDraft {
            foliage_placer_type: Some("Spruce".into()),
            ..TreeDraft::new("spruce").with_blocks("spruce_log", "spruce_leaves")
        };
        assert_eq!(draft.to_definition().unwrap().canopy.kind(), "spruce");
    }

    #[test]
    fn extreme_heights_are_rejected_not_wrapped() {
        let draft = TreeDraft {
            trunk_height_min: Some(-2),
            trunk_height_max: Some(i32::MAX),
            ..TreeDraft::new("huge").with_blocks("oak_log", "oak_leaves")
        };
        assert!(matches!(draft.to_definition(), Err(Error::InvalidConfig(_))));

        let draft = TreeDraft {
            trunk_height_min: Some(4),
            trunk_height_max: Some(40),
            ..TreeDraft::new("tall").with_blocks("oak_log", "oak_leaves")
        };
        assert!(matches!(draft.to_definition(), Err(Error::InvalidConfig(_))));

        let draft = TreeDraft {
            foliage_radius: Some(i32::MAX),
            ..TreeDraft::new("wide").with_blocks("oak_log", "oak_leaves")
        };
        assert!(matches!(draft.to_definition(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn missing_blocks_are_invalid() {
        let err = TreeDraft::new("bare").to_definition().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
