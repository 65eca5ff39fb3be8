//! Canopy layouts, one per [`CanopyShape`] variant.
//!
//! Every canopy is built from horizontal squares of leaves around an attachment
//! point. Each shape decides which corners of a square stay empty and how the
//! squares are stacked.
use glam::IVec3;
use rand::RngCore;

use crate::definition::{CanopyShape, TreeDefinition};
use crate::growth::FoliageAttachment;
use crate::random::{chance, rand_below};
use crate::world::{Coordinate, SandboxWorld};

/// Difference of two draws below `bound`, peaking at zero.
fn jitter(rng: &mut dyn RngCore, bound: u32) -> i32 {
    rand_below(rng, bound) as i32 - rand_below(rng, bound) as i32
}

/// Places leaves for one attachment point.
pub fn place(
    world: &mut dyn SandboxWorld,
    rng: &mut dyn RngCore,
    trunk_height: u32,
    attachment: &FoliageAttachment,
    definition: &TreeDefinition,
) {
    let mut canopy = Canopy {
        world,
        rng,
        definition,
        giant: attachment.giant,
    };
    let shape = definition.canopy;
    let center = attachment.center;
    let radius = shape.radius() + attachment.radius_bonus;
    let offset = shape.offset();

    match shape {
        CanopyShape::Blob { height, .. } => {
            for y in (offset - height..=offset).rev() {
                let r = (radius - 1 - y / 2).max(0);
                canopy.square(center, r, y);
            }
        }
        CanopyShape::Spruce { trunk_height: crown, .. } => {
            let foliage_height = (trunk_height as i32 - crown).max(4);
            let mut r = rand_below(canopy.rng, 2) as i32;
            let mut max_r = 1;
            let mut next_r = 0;
            for y in (-foliage_height..=offset).rev() {
                canopy.square(center, r, y);
                if r >= max_r {
                    r = next_r;
                    next_r = 1;
                    max_r = (max_r + 1).min(radius);
                } else {
                    r += 1;
                }
            }
        }
        CanopyShape::Pine { height, .. } => {
            let mut r = 0;
            for y in (offset - height..=offset).rev() {
                canopy.square(center, r, y);
                if r >= 1 && y == offset - height + 1 {
                    r -= 1;
                } else if r < radius {
                    r += 1;
                }
            }
        }
        CanopyShape::Jungle { height, .. } => {
            let layers = if attachment.giant {
                height
            } else {
                1 + rand_below(canopy.rng, 2) as i32
            };
            for y in (offset - layers..=offset).rev() {
                canopy.square(center, radius + 1 - y, y);
            }
        }
        CanopyShape::Acacia { .. } => {
            let raised = center + IVec3::Y * offset;
            canopy.square(raised, radius, -1);
            canopy.square(raised, radius - 1, 0);
        }
        CanopyShape::DarkOak { .. } => {
            let raised = center + IVec3::Y * offset;
            if attachment.giant {
                canopy.square(raised, radius + 2, -1);
                canopy.square(raised, radius + 3, 0);
                canopy.square(raised, radius + 2, 1);
                if chance(canopy.rng, 0.5) {
                    canopy.square(raised, radius, 2);
                }
            } else {
                canopy.square(raised, radius + 2, -1);
                canopy.square(raised, radius + 1, 0);
            }
        }
        CanopyShape::MegaPine { crown_height, .. } => {
            let crown_height = crown_height.max(1);
            let mut previous = 0;
            for y in (center.y - crown_height + offset)..=(center.y + offset) {
                let depth = center.y - y;
                let r = radius + (depth as f32 / crown_height as f32 * 3.5).floor() as i32;
                let widened = if depth > 0 && r == previous && y & 1 == 0 {
                    r + 1
                } else {
                    r
                };
                canopy.square(IVec3::new(center.x, y, center.z), widened, 0);
                previous = r;
            }
        }
        CanopyShape::RandomSpread {
            foliage_height,
            leaf_placement_attempts,
            ..
        } => {
            let spread = radius.max(0) as u32;
            let vertical = foliage_height.max(0) as u32;
            for _ in 0..leaf_placement_attempts {
                let dx = jitter(canopy.rng, spread);
                let dy = jitter(canopy.rng, vertical);
                let dz = jitter(canopy.rng, spread);
                canopy.leaf(center + IVec3::new(dx, dy, dz));
            }
        }
        CanopyShape::Cherry {
            height,
            hanging_leaves_chance,
            hanging_leaves_extension_chance,
            ..
        } => {
            let raised = center + IVec3::Y * offset;
            let r = radius - 1;
            canopy.square(raised, r - 2, height - 3);
            canopy.square(raised, r - 1, height - 4);
            for y in (0..=height - 5).rev() {
                canopy.square(raised, r, y);
            }
            for (r, y) in [(r, -1), (r - 1, -2)] {
                for leaf in canopy.square(raised, r, y) {
                    let edge = (leaf.x - raised.x).abs() == r || (leaf.z - raised.z).abs() == r;
                    if edge && chance(canopy.rng, hanging_leaves_chance) {
                        let below = leaf - IVec3::Y;
                        if canopy.leaf(below)
                            && chance(canopy.rng, hanging_leaves_extension_chance)
                        {
                            canopy.leaf(below - IVec3::Y);
                        }
                    }
                }
            }
        }
    }
}

struct Canopy<'a> {
    world: &'a mut dyn SandboxWorld,
    rng: &'a mut dyn RngCore,
    definition: &'a TreeDefinition,
    giant: bool,
}

impl Canopy<'_> {
    fn leaf(&mut self, position: Coordinate) -> bool {
        self.world.try_place(position, self.definition.foliage_material.clone())
    }

    /// Places a square of leaves at `center + y`; returns the positions that took.
    fn square(&mut self, center: Coordinate, radius: i32, y: i32) -> Vec<Coordinate> {
        if radius < 0 {
            return Vec::new();
        }
        let extra = i32::from(self.giant);
        let mut placed = Vec::new();
        for dx in -radius..=radius + extra {
            for dz in -radius..=radius + extra {
                if self.excluded(dx, y, dz, radius) {
                    continue;
                }
                let position = center + IVec3::new(dx, y, dz);
                if self.leaf(position) {
                    placed.push(position);
                }
            }
        }
        placed
    }

    fn excluded(&mut self, dx: i32, y: i32, dz: i32, radius: i32) -> bool {
        let (dx, dz) = if self.giant {
            (dx.abs().min((dx - 1).abs()), dz.abs().min((dz - 1).abs()))
        } else {
            (dx.abs(), dz.abs())
        };
        let corner = dx == radius && dz == radius;
        match self.definition.canopy {
            CanopyShape::Blob { .. } => corner && (y == 0 || rand_below(self.rng, 2) == 0),
            CanopyShape::Spruce { .. } | CanopyShape::Pine { .. } => corner && radius > 0,
            CanopyShape::Jungle { .. } | CanopyShape::MegaPine { .. } => {
                dx + dz >= 7 || dx * dx + dz * dz > radius * radius
            }
            CanopyShape::Acacia { .. } => {
                if y == 0 {
                    (dx > 1 || dz > 1) && dx != 0 && dz != 0
                } else {
                    corner && radius > 0
                }
            }
            CanopyShape::DarkOak { .. } => {
                if y == -1 && !self.giant {
                    corner
                } else if y == 1 {
                    dx + dz > radius * 2 - 2
                } else {
                    false
                }
            }
            CanopyShape::RandomSpread { .. } => false,
            CanopyShape::Cherry {
                wide_bottom_layer_hole_chance,
                corner_hole_chance,
                ..
            } => {
                if y == -1 && !self.giant {
                    corner && chance(self.rng, wide_bottom_layer_hole_chance)
                } else if radius > 2 {
                    corner || (dx + dz > radius * 2 - 2 && chance(self.rng, corner_hole_chance))
                } else {
                    corner && chance(self.rng, corner_hole_chance)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::world::MockEnvironment;

    fn leaves(shape: CanopyShape, attachment: FoliageAttachment) -> Vec<Coordinate> {
        let mut env = MockEnvironment::new();
        let mut rng = StdRng::seed_from_u64(0);
        let def = TreeDefinition::oak("c").with_canopy(shape);
        place(&mut env, &mut rng, 6, &attachment, &def);
        env.into_placements().into_iter().map(|r| r.position).collect()
    }

    #[test]
    fn blob_canopy_is_bounded_by_radius() {
        let center = IVec3::new(0, 6, 0);
        let positions = leaves(
            CanopyShape::Blob {
                radius: 2,
                offset: 0,
                height: 3,
            },
            FoliageAttachment::new(center, 0, false),
        );
        assert!(!positions.is_empty());
        for p in &positions {
            let d = *p - center;
            assert!(d.x.abs() <= 2 && d.z.abs() <= 2, "{p}");
            assert!((-3..=0).contains(&d.y), "{p}");
        }
        assert!(positions.contains(&center));
    }

    #[test]
    fn pine_canopy_tapers() {
        let center = IVec3::new(0, 10, 0);
        let positions = leaves(
            CanopyShape::Pine {
                radius: 3,
                offset: 1,
                height: 4,
            },
            FoliageAttachment::new(center, 0, false),
        );
        let width_at = |y: i32| {
            positions
                .iter()
                .filter(|p| p.y == y)
                .map(|p| p.x.abs())
                .max()
                .unwrap_or(-1)
        };
        assert_eq!(width_at(11), 0);
        assert!(width_at(9) > width_at(11));
    }

    #[test]
    fn giant_attachment_widens_square() {
        let center = IVec3::new(0, 8, 0);
        let positions = leaves(
            CanopyShape::DarkOak { radius: 0, offset: 0 },
            FoliageAttachment::new(center, 0, true),
        );
        assert!(positions.iter().any(|p| p.x == 3));
        assert!(positions.iter().any(|p| p.x == -3));
    }
}
