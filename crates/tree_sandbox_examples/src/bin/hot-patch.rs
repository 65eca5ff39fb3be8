//! Authors drafts with inheritance and hot-patches them into a live registry.
use std::sync::Arc;

use tree_sandbox::prelude::*;
use tree_sandbox::registry::{LiveSimpleSelectorConfig, LiveTreeConfig};
use tree_sandbox_examples::init_tracing;

const ENGINE_CONFIG: &str = "(tree_generation_threads: 2, hot_reload_enabled: true)";

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = EngineConfig::from_ron_str(ENGINE_CONFIG)?;

    let library = DefinitionLibrary::new()
        .with(TreeDraft::new("mytrees:base_birch").with_blocks("birch_log", "birch_leaves"))
        .with({
            let mut draft = TreeDraft::new("mytrees:tall_birch").with_parent("mytrees:base_birch");
            draft.trunk_height_min = Some(8);
            draft.trunk_height_max = Some(11);
            draft.foliage_radius = Some(3);
            draft
        });
    let tall_birch = library.build("mytrees:tall_birch")?;
    println!("built {} with trunk {:?}", tall_birch.id, tall_birch.trunk);

    let registry = Arc::new(MemoryRegistry::new());
    let live_oak = registry.register(
        "tree_engine:oak",
        LiveFeature::Tree(LiveTreeConfig::from(&TreeDefinition::oak("oak"))),
    );
    registry.register(
        "minecraft:birch",
        LiveFeature::SimpleSelector(LiveSimpleSelectorConfig { features: vec![] }),
    );

    let pending = Arc::new(PendingChanges::new());
    let sandbox = TreeSandbox::new(config)?.with_registry(
        registry.clone(),
        Arc::new(TreeFeatureFactory),
        Arc::clone(&pending),
    );

    let held = Arc::clone(&live_oak);
    for key in ["tree_engine:oak", "tree_engine:new_tree", "minecraft:birch"] {
        println!("{:<20} -> {:?}", key, sandbox.apply_patch(key, &tall_birch)?);
    }
    if let LiveFeature::Tree(config) = &*held.read() {
        println!("held handle now grows {}", config.trunk_provider.id);
    }

    let replacer = Replacer::weighted(
        "minecraft:birch",
        TreeDefinition::oak("oak"),
        vec![WeightedAlternative::new(0.25, tall_birch)],
    );
    println!("replacer             -> {:?}", sandbox.apply_replacer(&replacer)?);

    for (key, change) in pending.drain() {
        println!("pending until restart: {key} ({:?})", change.shape());
    }
    Ok(())
}
