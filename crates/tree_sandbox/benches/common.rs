#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use tree_sandbox::prelude::{CanopyShape, TreeDefinition, TrunkHeight, TrunkShape};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(3);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// One definition per trunk kind, each with a canopy that suits it.
pub fn definitions_by_trunk() -> Vec<TreeDefinition> {
    TrunkShape::KINDS
        .iter()
        .filter_map(|&kind| {
            let trunk = TrunkShape::from_kind(kind, TrunkHeight::new(8, 3, 1))?;
            let canopy = match kind {
                "giant" => CanopyShape::from_kind("mega_pine", 0, 0, 13)?,
                "mega_jungle" => CanopyShape::from_kind("jungle", 2, 0, 2)?,
                "dark_oak" => CanopyShape::from_kind("dark_oak", 0, 0, 0)?,
                "cherry" => CanopyShape::from_kind("cherry", 4, 0, 5)?,
                "forking" => CanopyShape::from_kind("acacia", 2, 0, 0)?,
                _ => CanopyShape::from_kind("blob", 2, 0, 3)?,
            };
            Some(
                TreeDefinition::oak(format!("bench:{kind}"))
                    .with_trunk(trunk)
                    .with_canopy(canopy),
            )
        })
        .collect()
}
