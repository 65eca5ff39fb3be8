//! Grows one tree per trunk kind and renders a side view of each.
//!
//! Pass a JSON definition path to preview that definition instead.
use std::fs;

use glam::IVec3;
use tree_sandbox::prelude::*;
use tree_sandbox_examples::{init_tracing, render_placements_to_png, Projection, RenderConfig};

fn kind_definition(kind: &str) -> Option<TreeDefinition> {
    let trunk = TrunkShape::from_kind(kind, TrunkHeight::new(7, 2, 1))?;
    let (canopy, wood) = match kind {
        "giant" => (CanopyShape::from_kind("mega_pine", 0, 0, 13)?, "spruce"),
        "mega_jungle" => (CanopyShape::from_kind("jungle", 2, 0, 2)?, "jungle"),
        "dark_oak" => (CanopyShape::from_kind("dark_oak", 0, 0, 0)?, "dark_oak"),
        "cherry" => (CanopyShape::from_kind("cherry", 4, 0, 5)?, "cherry"),
        "forking" => (CanopyShape::from_kind("acacia", 2, 0, 0)?, "acacia"),
        "upwards_branching" => (CanopyShape::from_kind("random_spread", 3, 0, 2)?, "mangrove"),
        _ => (CanopyShape::from_kind("blob", 2, 0, 3)?, "oak"),
    };
    let (trunk_material, foliage_material) = (format!("{wood}_log"), format!("{wood}_leaves"));
    Some(
        TreeDefinition::oak(format!("preview:{kind}"))
            .with_trunk(trunk)
            .with_canopy(canopy)
            .with_materials(trunk_material.as_str(), foliage_material.as_str()),
    )
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let sandbox = TreeSandbox::new(EngineConfig::new())?;
    let seed = 2024;

    let definitions = match std::env::args().nth(1) {
        Some(path) => vec![decode_definition(&fs::read_to_string(&path)?)?],
        None => TrunkShape::KINDS.iter().filter_map(|k| kind_definition(k)).collect(),
    };

    for definition in &definitions {
        let handle = sandbox.submit_sandbox(definition, IVec3::ZERO, seed)?;
        let output = handle.wait()?;
        println!(
            "{:<32} generated={} placed={} rejected={}",
            definition.id,
            output.generated,
            output.placements.len(),
            output.rejected
        );
        if output.placements.is_empty() {
            continue;
        }

        let name = definition.id.replace(':', "_");
        render_placements_to_png(
            &output.placements,
            &RenderConfig::default(),
            format!("{name}_side.png"),
        )?;
        render_placements_to_png(
            &output.placements,
            &RenderConfig::default().with_projection(Projection::Top),
            format!("{name}_top.png"),
        )?;
        fs::write(format!("{name}.json"), encode_placements(&output.placements)?)?;
    }
    Ok(())
}
