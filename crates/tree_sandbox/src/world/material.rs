//! Material identifiers, material states, and the category catalog.
//!
//! A [`MaterialState`] describes what occupies a coordinate: a namespaced
//! [`MaterialId`] plus ordered named properties (e.g. `axis=y`). The
//! [`MaterialCatalog`] maps identifiers to a closed set of [`MaterialCategory`]
//! values, which is what the legality policy reasons about.
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Namespace assumed when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Namespaced material identifier such as `minecraft:oak_log`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(String);

impl MaterialId {
    /// Creates an identifier, prefixing [`DEFAULT_NAMESPACE`] when no namespace is given.
    pub fn new(id: impl AsRef<str>) -> Self {
        let id = id.as_ref().trim();
        if id.contains(':') {
            Self(id.to_owned())
        } else {
            Self(format!("{DEFAULT_NAMESPACE}:{id}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or("")
    }

    pub fn path(&self) -> &str {
        self.0.split_once(':').map(|(_, p)| p).unwrap_or(&self.0)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MaterialId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MaterialId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<MaterialId> for String {
    fn from(value: MaterialId) -> Self {
        value.0
    }
}

/// An immutable material state: identifier plus ordered named properties.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MaterialState {
    #[cfg_attr(feature = "serde", serde(rename = "Name"))]
    pub id: MaterialId,
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "Properties",
            default,
            skip_serializing_if = "BTreeMap::is_empty"
        )
    )]
    pub properties: BTreeMap<String, String>,
}

impl MaterialState {
    pub fn new(id: impl Into<MaterialId>) -> Self {
        Self {
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// The canonical empty-space material.
    pub fn air() -> Self {
        Self::new("minecraft:air")
    }

    /// Returns a copy with the given property set.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

impl From<&str> for MaterialState {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<MaterialId> for MaterialState {
    fn from(value: MaterialId) -> Self {
        Self::new(value)
    }
}

/// Closed set of material categories known to the legality policy.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialCategory {
    /// Empty space (air and its variants).
    Empty,
    /// Leaves and other canopy blocks.
    Foliage,
    /// Grass, ferns and other loose plants.
    Vegetation,
    Vine,
    Moss,
    Sapling,
    Fluid,
    Log,
    Soil,
    Stone,
    /// Anything else; treated as player-built structure.
    Structural,
}

impl MaterialCategory {
    /// Categories a natural-growth placement may overwrite by default.
    pub const YIELDING: [MaterialCategory; 7] = [
        MaterialCategory::Empty,
        MaterialCategory::Foliage,
        MaterialCategory::Vegetation,
        MaterialCategory::Vine,
        MaterialCategory::Moss,
        MaterialCategory::Sapling,
        MaterialCategory::Fluid,
    ];

    pub fn is_yielding_by_default(self) -> bool {
        Self::YIELDING.contains(&self)
    }
}

/// Keyword fallback for identifiers the catalog has no explicit entry for.
///
/// Order matters: the first keyword contained in the identifier path wins.
const KEYWORD_CATEGORIES: &[(&str, MaterialCategory)] = &[
    ("leaves", MaterialCategory::Foliage),
    ("vine", MaterialCategory::Vine),
    ("moss", MaterialCategory::Moss),
    ("grass", MaterialCategory::Vegetation),
    ("fern", MaterialCategory::Vegetation),
    ("sapling", MaterialCategory::Sapling),
    ("log", MaterialCategory::Log),
    ("wood", MaterialCategory::Log),
    ("stem", MaterialCategory::Log),
];

/// Explicit id to category table, with a keyword fallback for unknown ids.
#[derive(Clone, Debug, Default)]
pub struct MaterialCatalog {
    entries: HashMap<MaterialId, MaterialCategory>,
}

impl MaterialCatalog {
    /// Creates an empty catalog; every lookup goes through the keyword fallback.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Catalog preloaded with the common overworld materials.
    pub fn with_defaults() -> Self {
        use MaterialCategory::*;

        let mut catalog = Self::new();
        for id in ["air", "cave_air", "void_air"] {
            catalog.register(id, Empty);
        }
        for id in ["water", "lava", "bubble_column"] {
            catalog.register(id, Fluid);
        }
        for id in ["mangrove_propagule", "azalea", "flowering_azalea"] {
            catalog.register(id, Sapling);
        }
        for id in [
            "dirt",
            "coarse_dirt",
            "rooted_dirt",
            "podzol",
            "mycelium",
            "mud",
            "farmland",
            "grass_block",
            "sand",
            "gravel",
            "clay",
        ] {
            catalog.register(id, Soil);
        }
        for id in [
            "stone",
            "cobblestone",
            "deepslate",
            "granite",
            "diorite",
            "andesite",
            "bedrock",
            "sandstone",
        ] {
            catalog.register(id, Stone);
        }
        for id in ["mangrove_roots", "muddy_mangrove_roots"] {
            catalog.register(id, Log);
        }
        catalog
    }

    /// Registers or overrides the category of a material.
    pub fn register(&mut self, id: impl Into<MaterialId>, category: MaterialCategory) -> &mut Self {
        self.entries.insert(id.into(), category);
        self
    }

    /// Builder-style variant of [`MaterialCatalog::register`].
    pub fn with(mut self, id: impl Into<MaterialId>, category: MaterialCategory) -> Self {
        self.register(id, category);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the category of a material id.
    pub fn category_of(&self, id: &MaterialId) -> MaterialCategory {
        if let Some(category) = self.entries.get(id) {
            return *category;
        }
        let path = id.path();
        KEYWORD_CATEGORIES
            .iter()
            .find(|(keyword, _)| path.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or(MaterialCategory::Structural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_id_defaults_namespace() {
        let id = MaterialId::new("oak_log");
        assert_eq!(id.as_str(), "minecraft:oak_log");
        assert_eq!(id.namespace(), "minecraft");
        assert_eq!(id.path(), "oak_log");

        let modded = MaterialId::new("mytrees:glow_leaves");
        assert_eq!(modded.namespace(), "mytrees");
        assert_eq!(modded.path(), "glow_leaves");
    }

    #[test]
    fn material_state_equality_includes_properties() {
        let plain = MaterialState::new("oak_log");
        let rotated = MaterialState::new("oak_log").with_property("axis", "x");
        assert_ne!(plain, rotated);
        assert_eq!(plain.id, rotated.id);
        assert_eq!(rotated.property("axis"), Some("x"));
    }

    #[test]
    fn catalog_prefers_explicit_entries_over_keywords() {
        let catalog = MaterialCatalog::with_defaults();
        assert_eq!(
            catalog.category_of(&MaterialId::new("grass_block")),
            MaterialCategory::Soil
        );
        assert_eq!(
            catalog.category_of(&MaterialId::new("short_grass")),
            MaterialCategory::Vegetation
        );
    }

    #[test]
    fn keyword_fallback_covers_documented_yielding_families() {
        let catalog = MaterialCatalog::new();
        let cases = [
            ("oak_leaves", MaterialCategory::Foliage),
            ("cave_vines", MaterialCategory::Vine),
            ("moss_carpet", MaterialCategory::Moss),
            ("tall_grass", MaterialCategory::Vegetation),
            ("seagrass", MaterialCategory::Vegetation),
            ("large_fern", MaterialCategory::Vegetation),
            ("birch_sapling", MaterialCategory::Sapling),
            ("spruce_log", MaterialCategory::Log),
            ("oak_planks", MaterialCategory::Structural),
        ];
        for (id, expected) in cases {
            assert_eq!(catalog.category_of(&MaterialId::new(id)), expected, "{id}");
        }
    }

    #[test]
    fn registration_overrides_keyword_match() {
        let catalog =
            MaterialCatalog::new().with("mytrees:leaves_wall", MaterialCategory::Structural);
        assert_eq!(
            catalog.category_of(&MaterialId::new("mytrees:leaves_wall")),
            MaterialCategory::Structural
        );
    }
}
