//! Tree configuration definitions.
//!
//! A [`TreeDefinition`] is the immutable parameter tree a generation algorithm
//! interprets. Trunk and canopy are closed tagged unions ([`TrunkShape`],
//! [`CanopyShape`]) carrying kind-specific parameters; [`FeatureSize`] describes the
//! clearance a tree needs around its trunk.
//!
//! Authors usually write flat [`draft::TreeDraft`]s with optional fields and a
//! parent; [`draft::DefinitionLibrary`] resolves those into definitions.
use std::fmt::Display;
use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::world::material::MaterialState;

#[cfg(feature = "serde")]
pub mod codec;
pub mod draft;

pub use draft::{DefinitionLibrary, TreeDraft};

/// Accepted trunk `base_height` values.
pub const BASE_HEIGHT_RANGE: RangeInclusive<u32> = 1..=32;
/// Accepted values of each random trunk height term.
pub const HEIGHT_RAND_RANGE: RangeInclusive<u32> = 0..=24;
/// Accepted canopy radius and offset values.
pub const FOLIAGE_RADIUS_RANGE: RangeInclusive<i32> = 0..=16;
/// Accepted canopy heights for the stacked-layer kinds.
pub const FOLIAGE_HEIGHT_RANGE: RangeInclusive<i32> = 0..=24;
/// Accepted vertical spread of the random spread canopy.
pub const SPREAD_HEIGHT_RANGE: RangeInclusive<i32> = 0..=512;
pub const LEAF_PLACEMENT_ATTEMPTS_RANGE: RangeInclusive<u32> = 0..=256;
/// Accepted branch counts, lengths and steps of the branching trunks.
pub const BRANCH_RANGE: RangeInclusive<u32> = 0..=16;
/// Accepted cherry branch offsets relative to the trunk top.
pub const BRANCH_OFFSET_RANGE: RangeInclusive<i32> = -16..=16;
/// Accepted feature size band limits.
pub const LAYER_LIMIT_RANGE: RangeInclusive<u32> = 0..=80;
/// Accepted feature size band radii.
pub const LAYER_SIZE_RANGE: RangeInclusive<u32> = 0..=16;
const CHANCE_RANGE: RangeInclusive<f32> = 0.0..=1.0;

fn check_range<T: PartialOrd + Display>(
    id: &str,
    field: &str,
    value: T,
    range: &RangeInclusive<T>,
) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "definition '{id}': {field} {value} is outside {}..={}",
            range.start(),
            range.end()
        )))
    }
}

/// Trunk height as `base_height + rand(0..=height_rand_a) + rand(0..=height_rand_b)`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrunkHeight {
    pub base_height: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub height_rand_a: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub height_rand_b: u32,
}

impl TrunkHeight {
    pub const fn new(base_height: u32, height_rand_a: u32, height_rand_b: u32) -> Self {
        Self {
            base_height,
            height_rand_a,
            height_rand_b,
        }
    }

    /// Largest height this range can produce.
    pub fn max_height(&self) -> u32 {
        self.base_height
            .saturating_add(self.height_rand_a)
            .saturating_add(self.height_rand_b)
    }

    fn validate(&self, id: &str) -> Result<()> {
        check_range(id, "trunk base_height", self.base_height, &BASE_HEIGHT_RANGE)?;
        check_range(id, "trunk height_rand_a", self.height_rand_a, &HEIGHT_RAND_RANGE)?;
        check_range(id, "trunk height_rand_b", self.height_rand_b, &HEIGHT_RAND_RANGE)
    }
}

/// Parameters of the cherry trunk's side branches.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CherryBranches {
    pub height: TrunkHeight,
    /// Number of side branches, at most 2.
    pub branch_count: u32,
    pub branch_horizontal_length: u32,
    /// Inclusive range of how far below the trunk top a branch starts.
    pub branch_start_offset_min: i32,
    pub branch_start_offset_max: i32,
    pub branch_end_offset: i32,
}

/// Parameters of the upwards branching trunk.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpwardsBranches {
    pub height: TrunkHeight,
    pub extra_branch_steps: u32,
    pub extra_branch_length: u32,
    pub place_branch_per_log_probability: f32,
}

/// How the trunk is laid out.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrunkShape {
    Straight(TrunkHeight),
    Forking(TrunkHeight),
    Giant(TrunkHeight),
    MegaJungle(TrunkHeight),
    DarkOak(TrunkHeight),
    Cherry(CherryBranches),
    UpwardsBranching(UpwardsBranches),
}

impl TrunkShape {
    /// Every trunk kind name, in declaration order.
    pub const KINDS: [&'static str; 7] = [
        "straight",
        "forking",
        "giant",
        "mega_jungle",
        "dark_oak",
        "cherry",
        "upwards_branching",
    ];

    /// Builds the kind named `kind` with the given height range and kind defaults.
    pub fn from_kind(kind: &str, height: TrunkHeight) -> Option<Self> {
        let shape = match kind {
            "straight" => TrunkShape::Straight(height),
            "forking" => TrunkShape::Forking(height),
            "giant" => TrunkShape::Giant(height),
            "mega_jungle" => TrunkShape::MegaJungle(height),
            "dark_oak" => TrunkShape::DarkOak(height),
            "cherry" => TrunkShape::Cherry(CherryBranches {
                height,
                branch_count: 2,
                branch_horizontal_length: 3,
                branch_start_offset_min: -2,
                branch_start_offset_max: -1,
                branch_end_offset: -1,
            }),
            "upwards_branching" => TrunkShape::UpwardsBranching(UpwardsBranches {
                height,
                extra_branch_steps: 2,
                extra_branch_length: 1,
                place_branch_per_log_probability: 0.25,
            }),
            _ => return None,
        };
        Some(shape)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TrunkShape::Straight(_) => "straight",
            TrunkShape::Forking(_) => "forking",
            TrunkShape::Giant(_) => "giant",
            TrunkShape::MegaJungle(_) => "mega_jungle",
            TrunkShape::DarkOak(_) => "dark_oak",
            TrunkShape::Cherry(_) => "cherry",
            TrunkShape::UpwardsBranching(_) => "upwards_branching",
        }
    }

    pub fn height(&self) -> &TrunkHeight {
        match self {
            TrunkShape::Straight(h)
            | TrunkShape::Forking(h)
            | TrunkShape::Giant(h)
            | TrunkShape::MegaJungle(h)
            | TrunkShape::DarkOak(h) => h,
            TrunkShape::Cherry(c) => &c.height,
            TrunkShape::UpwardsBranching(u) => &u.height,
        }
    }

    /// True for the 2x2 trunk kinds.
    pub fn is_wide(&self) -> bool {
        matches!(
            self,
            TrunkShape::Giant(_) | TrunkShape::MegaJungle(_) | TrunkShape::DarkOak(_)
        )
    }

    fn validate(&self, id: &str) -> Result<()> {
        self.height().validate(id)?;
        match self {
            TrunkShape::Cherry(c) => {
                check_range(id, "cherry branch_count", c.branch_count, &BRANCH_RANGE)?;
                check_range(
                    id,
                    "cherry branch_horizontal_length",
                    c.branch_horizontal_length,
                    &BRANCH_RANGE,
                )?;
                for (field, value) in [
                    ("cherry branch_start_offset_min", c.branch_start_offset_min),
                    ("cherry branch_start_offset_max", c.branch_start_offset_max),
                    ("cherry branch_end_offset", c.branch_end_offset),
                ] {
                    check_range(id, field, value, &BRANCH_OFFSET_RANGE)?;
                }
                if c.branch_start_offset_min > c.branch_start_offset_max {
                    return Err(Error::InvalidConfig(format!(
                        "definition '{id}': cherry branch start offset range is inverted"
                    )));
                }
            }
            TrunkShape::UpwardsBranching(u) => {
                check_range(id, "extra_branch_steps", u.extra_branch_steps, &BRANCH_RANGE)?;
                check_range(id, "extra_branch_length", u.extra_branch_length, &BRANCH_RANGE)?;
                check_range(
                    id,
                    "place_branch_per_log_probability",
                    u.place_branch_per_log_probability,
                    &CHANCE_RANGE,
                )?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// How foliage is laid out around each attachment point.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanopyShape {
    Blob {
        radius: i32,
        offset: i32,
        height: i32,
    },
    Spruce {
        radius: i32,
        offset: i32,
        trunk_height: i32,
    },
    Pine {
        radius: i32,
        offset: i32,
        height: i32,
    },
    Jungle {
        radius: i32,
        offset: i32,
        height: i32,
    },
    Acacia {
        radius: i32,
        offset: i32,
    },
    DarkOak {
        radius: i32,
        offset: i32,
    },
    MegaPine {
        radius: i32,
        offset: i32,
        crown_height: i32,
    },
    RandomSpread {
        radius: i32,
        offset: i32,
        foliage_height: i32,
        leaf_placement_attempts: u32,
    },
    Cherry {
        radius: i32,
        offset: i32,
        height: i32,
        wide_bottom_layer_hole_chance: f32,
        corner_hole_chance: f32,
        hanging_leaves_chance: f32,
        hanging_leaves_extension_chance: f32,
    },
}

impl CanopyShape {
    /// Every canopy kind name, in declaration order.
    pub const KINDS: [&'static str; 9] = [
        "blob",
        "spruce",
        "pine",
        "jungle",
        "acacia",
        "dark_oak",
        "mega_pine",
        "random_spread",
        "cherry",
    ];

    /// Builds the kind named `kind` from the flat authoring parameters.
    pub fn from_kind(kind: &str, radius: i32, offset: i32, height: i32) -> Option<Self> {
        let shape = match kind {
            "blob" => CanopyShape::Blob {
                radius,
                offset,
                height,
            },
            "spruce" => CanopyShape::Spruce {
                radius,
                offset,
                trunk_height: height,
            },
            "pine" => CanopyShape::Pine {
                radius,
                offset,
                height,
            },
            "jungle" => CanopyShape::Jungle {
                radius,
                offset,
                height,
            },
            "acacia" => CanopyShape::Acacia { radius, offset },
            "dark_oak" => CanopyShape::DarkOak { radius, offset },
            "mega_pine" => CanopyShape::MegaPine {
                radius,
                offset,
                crown_height: height,
            },
            "random_spread" => CanopyShape::RandomSpread {
                radius,
                offset,
                foliage_height: height,
                leaf_placement_attempts: 50,
            },
            "cherry" => CanopyShape::Cherry {
                radius,
                offset,
                height,
                wide_bottom_layer_hole_chance: 0.25,
                corner_hole_chance: 0.5,
                hanging_leaves_chance: 1.0 / 6.0,
                hanging_leaves_extension_chance: 1.0 / 3.0,
            },
            _ => return None,
        };
        Some(shape)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CanopyShape::Blob { .. } => "blob",
            CanopyShape::Spruce { .. } => "spruce",
            CanopyShape::Pine { .. } => "pine",
            CanopyShape::Jungle { .. } => "jungle",
            CanopyShape::Acacia { .. } => "acacia",
            CanopyShape::DarkOak { .. } => "dark_oak",
            CanopyShape::MegaPine { .. } => "mega_pine",
            CanopyShape::RandomSpread { .. } => "random_spread",
            CanopyShape::Cherry { .. } => "cherry",
        }
    }

    pub fn radius(&self) -> i32 {
        match *self {
            CanopyShape::Blob { radius, .. }
            | CanopyShape::Spruce { radius, .. }
            | CanopyShape::Pine { radius, .. }
            | CanopyShape::Jungle { radius, .. }
            | CanopyShape::Acacia { radius, .. }
            | CanopyShape::DarkOak { radius, .. }
            | CanopyShape::MegaPine { radius, .. }
            | CanopyShape::RandomSpread { radius, .. }
            | CanopyShape::Cherry { radius, .. } => radius,
        }
    }

    pub fn offset(&self) -> i32 {
        match *self {
            CanopyShape::Blob { offset, .. }
            | CanopyShape::Spruce { offset, .. }
            | CanopyShape::Pine { offset, .. }
            | CanopyShape::Jungle { offset, .. }
            | CanopyShape::Acacia { offset, .. }
            | CanopyShape::DarkOak { offset, .. }
            | CanopyShape::MegaPine { offset, .. }
            | CanopyShape::RandomSpread { offset, .. }
            | CanopyShape::Cherry { offset, .. } => offset,
        }
    }

    fn validate(&self, id: &str) -> Result<()> {
        check_range(id, "canopy radius", self.radius(), &FOLIAGE_RADIUS_RANGE)?;
        check_range(id, "canopy offset", self.offset(), &FOLIAGE_RADIUS_RANGE)?;
        match *self {
            CanopyShape::Blob { height, .. }
            | CanopyShape::Pine { height, .. }
            | CanopyShape::Jungle { height, .. } => {
                check_range(id, "canopy height", height, &FOLIAGE_HEIGHT_RANGE)
            }
            CanopyShape::Spruce { trunk_height, .. } => {
                check_range(id, "spruce trunk_height", trunk_height, &FOLIAGE_HEIGHT_RANGE)
            }
            CanopyShape::MegaPine { crown_height, .. } => {
                check_range(id, "mega pine crown_height", crown_height, &FOLIAGE_HEIGHT_RANGE)
            }
            CanopyShape::RandomSpread {
                foliage_height,
                leaf_placement_attempts,
                ..
            } => {
                check_range(id, "foliage_height", foliage_height, &SPREAD_HEIGHT_RANGE)?;
                check_range(
                    id,
                    "leaf_placement_attempts",
                    leaf_placement_attempts,
                    &LEAF_PLACEMENT_ATTEMPTS_RANGE,
                )
            }
            CanopyShape::Cherry {
                height,
                wide_bottom_layer_hole_chance,
                corner_hole_chance,
                hanging_leaves_chance,
                hanging_leaves_extension_chance,
                ..
            } => {
                check_range(id, "cherry canopy height", height, &FOLIAGE_HEIGHT_RANGE)?;
                for (field, value) in [
                    ("wide_bottom_layer_hole_chance", wide_bottom_layer_hole_chance),
                    ("corner_hole_chance", corner_hole_chance),
                    ("hanging_leaves_chance", hanging_leaves_chance),
                    ("hanging_leaves_extension_chance", hanging_leaves_extension_chance),
                ] {
                    check_range(id, field, value, &CHANCE_RANGE)?;
                }
                Ok(())
            }
            CanopyShape::Acacia { .. } | CanopyShape::DarkOak { .. } => Ok(()),
        }
    }
}

/// Clearance a tree needs, as a radius per height band.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSize {
    TwoLayers {
        limit: u32,
        lower_size: u32,
        upper_size: u32,
    },
    ThreeLayers {
        limit: u32,
        upper_limit: u32,
        lower_size: u32,
        middle_size: u32,
        upper_size: u32,
    },
}

impl Default for FeatureSize {
    fn default() -> Self {
        FeatureSize::TwoLayers {
            limit: 1,
            lower_size: 0,
            upper_size: 1,
        }
    }
}

impl FeatureSize {
    /// Required free radius at `y` levels above the origin of a tree `height` tall.
    pub fn radius_at(&self, height: u32, y: u32) -> u32 {
        match *self {
            FeatureSize::TwoLayers {
                limit,
                lower_size,
                upper_size,
            } => {
                if y < limit {
                    lower_size
                } else {
                    upper_size
                }
            }
            FeatureSize::ThreeLayers {
                limit,
                upper_limit,
                lower_size,
                middle_size,
                upper_size,
            } => {
                if y < limit {
                    lower_size
                } else if y >= height.saturating_sub(upper_limit) {
                    upper_size
                } else {
                    middle_size
                }
            }
        }
    }

    fn validate(&self, id: &str) -> Result<()> {
        match *self {
            FeatureSize::TwoLayers {
                limit,
                lower_size,
                upper_size,
            } => {
                check_range(id, "minimum_size limit", limit, &LAYER_LIMIT_RANGE)?;
                check_range(id, "minimum_size lower_size", lower_size, &LAYER_SIZE_RANGE)?;
                check_range(id, "minimum_size upper_size", upper_size, &LAYER_SIZE_RANGE)
            }
            FeatureSize::ThreeLayers {
                limit,
                upper_limit,
                lower_size,
                middle_size,
                upper_size,
            } => {
                check_range(id, "minimum_size limit", limit, &LAYER_LIMIT_RANGE)?;
                check_range(id, "minimum_size upper_limit", upper_limit, &LAYER_LIMIT_RANGE)?;
                check_range(id, "minimum_size lower_size", lower_size, &LAYER_SIZE_RANGE)?;
                check_range(id, "minimum_size middle_size", middle_size, &LAYER_SIZE_RANGE)?;
                check_range(id, "minimum_size upper_size", upper_size, &LAYER_SIZE_RANGE)
            }
        }
    }
}

/// Immutable configuration a generation algorithm interprets.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TreeDefinition {
    pub id: String,
    pub trunk_material: MaterialState,
    pub foliage_material: MaterialState,
    pub trunk: TrunkShape,
    pub canopy: CanopyShape,
    #[cfg_attr(feature = "serde", serde(default))]
    pub minimum_size: FeatureSize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ignore_vines: bool,
}

impl TreeDefinition {
    /// A small oak: straight 4..6 trunk with a radius-2 blob canopy.
    pub fn oak(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            trunk_material: MaterialState::new("oak_log"),
            foliage_material: MaterialState::new("oak_leaves"),
            trunk: TrunkShape::Straight(TrunkHeight::new(4, 2, 0)),
            canopy: CanopyShape::Blob {
                radius: 2,
                offset: 0,
                height: 3,
            },
            minimum_size: FeatureSize::default(),
            ignore_vines: false,
        }
    }

    pub fn with_trunk(mut self, trunk: TrunkShape) -> Self {
        self.trunk = trunk;
        self
    }

    pub fn with_canopy(mut self, canopy: CanopyShape) -> Self {
        self.canopy = canopy;
        self
    }

    pub fn with_materials(
        mut self,
        trunk: impl Into<MaterialState>,
        foliage: impl Into<MaterialState>,
    ) -> Self {
        self.trunk_material = trunk.into();
        self.foliage_material = foliage.into();
        self
    }

    pub fn with_minimum_size(mut self, size: FeatureSize) -> Self {
        self.minimum_size = size;
        self
    }

    /// Validates the definition, returning an error if invalid.
    ///
    /// Every numeric parameter must fall inside its accepted range (see the
    /// `*_RANGE` constants), so a valid definition never grows unbounded.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidConfig("definition id must not be empty".into()));
        }
        self.trunk.validate(&self.id)?;
        self.canopy.validate(&self.id)?;
        self.minimum_size.validate(&self.id)
    }
}
