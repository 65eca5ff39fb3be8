//! JSON and RON payloads for definitions, drafts, replacers and placements.
//!
//! Decoding always validates: a payload that parses but describes an invalid
//! tree is rejected before any run can use it.
use crate::definition::{TreeDefinition, TreeDraft};
use crate::error::{Error, Result};
use crate::replacer::Replacer;
use crate::world::PlacementRecord;

/// Decodes and validates a [`TreeDefinition`] from JSON.
pub fn decode_definition(json: &str) -> Result<TreeDefinition> {
    let definition: TreeDefinition =
        serde_json::from_str(json).map_err(|e| Error::decode("tree definition", e))?;
    definition.validate()?;
    Ok(definition)
}

/// Encodes a definition as pretty JSON.
pub fn encode_definition(definition: &TreeDefinition) -> Result<String> {
    serde_json::to_string_pretty(definition).map_err(|e| Error::Other(e.to_string()))
}

/// Decodes a draft. Drafts are not validated until they are built.
pub fn decode_draft(json: &str) -> Result<TreeDraft> {
    serde_json::from_str(json).map_err(|e| Error::decode("tree draft", e))
}

pub fn encode_draft(draft: &TreeDraft) -> Result<String> {
    serde_json::to_string_pretty(draft).map_err(|e| Error::Other(e.to_string()))
}

/// Decodes and validates a [`Replacer`] from JSON.
pub fn decode_replacer(json: &str) -> Result<Replacer> {
    let replacer: Replacer = serde_json::from_str(json).map_err(|e| Error::decode("replacer", e))?;
    replacer.validate()?;
    Ok(replacer)
}

pub fn encode_replacer(replacer: &Replacer) -> Result<String> {
    serde_json::to_string_pretty(replacer).map_err(|e| Error::Other(e.to_string()))
}

/// Encodes placements as a JSON array of `{x, y, z, blockState}` objects.
pub fn encode_placements(placements: &[PlacementRecord]) -> Result<String> {
    serde_json::to_string(placements).map_err(|e| Error::Other(e.to_string()))
}

/// Decodes and validates a [`TreeDefinition`] from a RON document.
#[cfg(feature = "ron")]
pub fn decode_definition_ron(text: &str) -> Result<TreeDefinition> {
    let definition: TreeDefinition =
        ron::from_str(text).map_err(|e| Error::decode("tree definition", e))?;
    definition.validate()?;
    Ok(definition)
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::*;
    use crate::definition::{CanopyShape, FeatureSize, TrunkHeight, TrunkShape};
    use crate::replacer::{ReplacerStrategy, WeightedAlternative};
    use crate::world::material::MaterialState;

    #[test]
    fn tagged_trunk_and_canopy_decode() {
        let json = r#"{
            "id": "mytrees:tall_pine",
            "trunk_material": {"Name": "minecraft:spruce_log"},
            "foliage_material": {"Name": "minecraft:spruce_leaves"},
            "trunk": {"type": "giant", "base_height": 13, "height_rand_a": 2},
            "canopy": {"type": "mega_pine", "radius": 0, "offset": 0, "crown_height": 13},
            "minimum_size": {"type": "two_layers", "limit": 1, "lower_size": 1, "upper_size": 2}
        }"#;
        let definition = decode_definition(json).unwrap();

        assert_eq!(definition.trunk, TrunkShape::Giant(TrunkHeight::new(13, 2, 0)));
        assert_eq!(definition.canopy.kind(), "mega_pine");
        assert_eq!(
            definition.minimum_size,
            FeatureSize::TwoLayers {
                limit: 1,
                lower_size: 1,
                upper_size: 2
            }
        );
        assert!(!definition.ignore_vines);
    }

    #[test]
    fn definition_survives_encoding() {
        let definition = TreeDefinition::oak("mytrees:cherry")
            .with_trunk(TrunkShape::from_kind("cherry", TrunkHeight::new(7, 1, 0)).unwrap())
            .with_canopy(CanopyShape::from_kind("cherry", 4, 0, 5).unwrap());
        let decoded = decode_definition(&encode_definition(&definition).unwrap()).unwrap();
        assert_eq!(decoded, definition);
    }

    #[test]
    fn unknown_trunk_kind_is_a_decode_error() {
        let json = r#"{
            "id": "x",
            "trunk_material": {"Name": "oak_log"},
            "foliage_material": {"Name": "oak_leaves"},
            "trunk": {"type": "spiral", "base_height": 4},
            "canopy": {"type": "blob", "radius": 2, "offset": 0, "height": 3}
        }"#;
        assert!(matches!(
            decode_definition(json),
            Err(Error::Decode { what: "tree definition", .. })
        ));
    }

    #[test]
    fn invalid_definition_is_rejected_after_parsing() {
        let mut definition = TreeDefinition::oak("ok");
        definition.id = String::new();
        let json = encode_definition(&definition).unwrap();
        assert!(matches!(decode_definition(&json), Err(Error::InvalidConfig(_))));
    }

    fn payload(trunk: &str, canopy: &str) -> String {
        format!(
            r#"{{
                "id": "mytrees:odd",
                "trunk_material": {{"Name": "oak_log"}},
                "foliage_material": {{"Name": "oak_leaves"}},
                "trunk": {trunk},
                "canopy": {canopy}
            }}"#
        )
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let blob = r#"{"type": "blob", "radius": 2, "offset": 0, "height": 3}"#;
        let straight = r#"{"type": "straight", "base_height": 4}"#;
        assert!(decode_definition(&payload(straight, blob)).is_ok());

        let payloads = [
            payload(
                r#"{"type": "straight", "base_height": 4, "height_rand_a": 4294967295}"#,
                blob,
            ),
            payload(r#"{"type": "giant", "base_height": 200}"#, blob),
            payload(
                straight,
                r#"{"type": "blob", "radius": 2147483647, "offset": 0, "height": 3}"#,
            ),
            payload(
                straight,
                r#"{"type": "random_spread", "radius": 3, "offset": 0,
                    "foliage_height": 2, "leaf_placement_attempts": 100000}"#,
            ),
        ];
        for json in &payloads {
            assert!(
                matches!(decode_definition(json), Err(Error::InvalidConfig(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn weighted_replacer_decodes_in_order() {
        let oak = encode_definition(&TreeDefinition::oak("oak")).unwrap();
        let json = format!(
            r#"{{"target": "minecraft:oak", "strategy": {{"type": "weighted", "default": {oak},
                "alternatives": [
                    {{"chance": 0.3, "definition": {oak}}},
                    {{"chance": 0.1, "definition": {oak}}}
                ]}}}}"#
        );
        let replacer = decode_replacer(&json).unwrap();
        let ReplacerStrategy::Weighted { alternatives, .. } = &replacer.strategy else {
            panic!("expected weighted strategy");
        };
        let chances: Vec<f32> = alternatives
            .iter()
            .map(|a: &WeightedAlternative| a.chance)
            .collect();
        assert_eq!(chances, vec![0.3, 0.1]);
    }

    #[test]
    fn empty_uniform_pool_is_rejected() {
        let json =
            r#"{"target": "minecraft:oak", "strategy": {"type": "uniform", "candidates": []}}"#;
        assert!(matches!(decode_replacer(json), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn drafts_keep_only_set_fields() {
        let draft =
            decode_draft(r#"{"id": "child", "parent": "base", "foliage_radius": 3}"#).unwrap();
        assert_eq!(draft.parent.as_deref(), Some("base"));
        assert_eq!(draft.foliage_radius, Some(3));
        assert!(draft.trunk_block.is_none());
    }

    #[test]
    fn placements_use_flat_wire_shape() {
        let record = PlacementRecord::new(
            IVec3::new(1, 2, -3),
            MaterialState::new("oak_log").with_property("axis", "y"),
        );
        let json = encode_placements(&[record]).unwrap();
        assert_eq!(
            json,
            r#"[{"x":1,"y":2,"z":-3,"blockState":{"Name":"minecraft:oak_log","Properties":{"axis":"y"}}}]"#
        );
    }

    #[cfg(feature = "ron")]
    #[test]
    fn ron_definition_loads() {
        let text = r#"(
            id: "mytrees:birch",
            trunk_material: (Name: "birch_log"),
            foliage_material: (Name: "birch_leaves"),
            trunk: (type: "straight", base_height: 5, height_rand_a: 2),
            canopy: (type: "blob", radius: 2, offset: 0, height: 3),
        )"#;
        let definition = decode_definition_ron(text).unwrap();
        assert_eq!(definition.trunk_material, MaterialState::new("minecraft:birch_log"));
    }
}
