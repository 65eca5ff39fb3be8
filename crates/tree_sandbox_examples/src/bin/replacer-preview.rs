//! Previews a weighted replacer over many seeds and renders a row of results.
use std::collections::BTreeMap;

use glam::IVec3;
use tree_sandbox::prelude::*;
use tree_sandbox_examples::{init_tracing, render_placements_to_png, RenderConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let sandbox = TreeSandbox::new(EngineConfig::new())?;

    let birch = TreeDefinition::oak("mytrees:birch").with_materials("birch_log", "birch_leaves");
    let cherry_trunk = TrunkShape::from_kind("cherry", TrunkHeight::new(7, 1, 0))
        .ok_or_else(|| anyhow::anyhow!("no cherry trunk"))?;
    let cherry_canopy = CanopyShape::from_kind("cherry", 4, 0, 5)
        .ok_or_else(|| anyhow::anyhow!("no cherry canopy"))?;
    let cherry = TreeDefinition::oak("mytrees:cherry")
        .with_trunk(cherry_trunk)
        .with_canopy(cherry_canopy)
        .with_materials("cherry_log", "cherry_leaves");
    let replacer = Replacer::weighted(
        "minecraft:oak",
        TreeDefinition::oak("minecraft:oak"),
        vec![WeightedAlternative::new(0.3, birch), WeightedAlternative::new(0.2, cherry)],
    );

    let mut row = Vec::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for (i, seed) in (0..8u64).enumerate() {
        let origin = IVec3::new(i as i32 * 12, 0, 0);
        let placements = sandbox.preview_replacer(&replacer, origin, seed)?;
        if let Some(log) = placements.iter().find(|p| p.state.id.path().ends_with("_log")) {
            *counts.entry(log.state.id.to_string()).or_default() += 1;
        }
        row.extend(placements);
    }

    for (trunk, count) in &counts {
        println!("{trunk:<24} {count}");
    }
    render_placements_to_png(&row, &RenderConfig::default(), "replacer_preview.png")
}
