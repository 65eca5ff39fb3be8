//! Generation algorithms that grow trees inside a [`SandboxWorld`].
//!
//! [`GenerationAlgorithm`] is the pluggable seam the sandbox, the benchmark harness
//! and the worker pool drive. [`TreeGrower`] is the reference implementation: it
//! interprets a [`TreeDefinition`] by laying out the trunk ([`trunk`]) and then
//! the canopy ([`canopy`]) around every attachment point the trunk produced.
//! All writes go through [`crate::world::MaterialMutator::try_place`], so the
//! legality policy applies to every block.
use glam::IVec3;
use rand::RngCore;
use tracing::{trace, warn};

use crate::definition::TreeDefinition;
use crate::random::rand_below;
use crate::world::{Coordinate, HostView, MaterialCategory, SandboxWorld};

pub mod canopy;
pub mod trunk;

/// A procedure that queries and mutates a world to produce a structure.
pub trait GenerationAlgorithm: Send + Sync {
    /// Grows `definition` at `origin`. Returns whether anything was generated.
    fn generate(
        &self,
        world: &mut dyn SandboxWorld,
        rng: &mut dyn RngCore,
        origin: Coordinate,
        definition: &TreeDefinition,
    ) -> bool;
}

impl<F> GenerationAlgorithm for F
where
    F: Fn(&mut dyn SandboxWorld, &mut dyn RngCore, Coordinate, &TreeDefinition) -> bool
        + Send
        + Sync,
{
    fn generate(
        &self,
        world: &mut dyn SandboxWorld,
        rng: &mut dyn RngCore,
        origin: Coordinate,
        definition: &TreeDefinition,
    ) -> bool {
        self(world, rng, origin, definition)
    }
}

/// Point where a canopy is grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoliageAttachment {
    pub center: Coordinate,
    /// Added to the canopy radius at this point.
    pub radius_bonus: i32,
    /// True when the attachment sits on a 2x2 trunk.
    pub giant: bool,
}

impl FoliageAttachment {
    pub fn new(center: Coordinate, radius_bonus: i32, giant: bool) -> Self {
        Self {
            center,
            radius_bonus,
            giant,
        }
    }
}

/// Reference tree generation algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeGrower;

impl TreeGrower {
    pub fn new() -> Self {
        Self
    }

    fn rooted(world: &dyn SandboxWorld, origin: Coordinate, wide: bool) -> bool {
        let footprint: &[IVec3] = if wide {
            &[IVec3::ZERO, IVec3::X, IVec3::Z, IVec3::new(1, 0, 1)]
        } else {
            &[IVec3::ZERO]
        };
        footprint.iter().all(|&offset| {
            let base = origin + offset;
            world.can_place_at(base)
                && world.category_at(base - IVec3::Y) == MaterialCategory::Soil
        })
    }

    /// True when every coordinate within the minimum-size envelope can take a block.
    fn has_clearance(
        world: &dyn SandboxWorld,
        origin: Coordinate,
        height: u32,
        definition: &TreeDefinition,
    ) -> bool {
        let extra = i32::from(definition.trunk.is_wide());
        (0..=height + 1).all(|y| {
            let radius = definition.minimum_size.radius_at(height, y) as i32;
            (-radius..=radius + extra).all(|dx| {
                (-radius..=radius + extra)
                    .all(|dz| world.can_place_at(origin + IVec3::new(dx, y as i32, dz)))
            })
        })
    }
}

impl GenerationAlgorithm for TreeGrower {
    fn generate(
        &self,
        world: &mut dyn SandboxWorld,
        rng: &mut dyn RngCore,
        origin: Coordinate,
        definition: &TreeDefinition,
    ) -> bool {
        if let Err(err) = definition.validate() {
            warn!("Tree '{}' is not growable: {}; skipping.", definition.id, err);
            return false;
        }
        let range = definition.trunk.height();
        let height = range.base_height
            + rand_below(rng, range.height_rand_a + 1)
            + rand_below(rng, range.height_rand_b + 1);

        let in_bounds = {
            let host = HostView::new(&mut *world);
            host.is_in_build_height(origin - IVec3::Y)
                && origin.y + height as i32 + 1 <= host.top_y()
        };
        if !in_bounds {
            trace!("Tree '{}' at {} is outside the build height.", definition.id, origin);
            return false;
        }
        if !Self::rooted(world, origin, definition.trunk.is_wide()) {
            trace!("Tree '{}' at {} has no ground to root in.", definition.id, origin);
            return false;
        }
        if !Self::has_clearance(world, origin, height, definition) {
            trace!(
                "Tree '{}' at {} lacks clearance for height {}.",
                definition.id,
                origin,
                height
            );
            return false;
        }

        let attachments = trunk::place(world, rng, origin, height, definition);
        for attachment in &attachments {
            canopy::place(world, rng, height, attachment, definition);
        }
        true
    }
}
