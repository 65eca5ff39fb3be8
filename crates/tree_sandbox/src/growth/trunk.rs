//! Trunk layouts, one per [`TrunkShape`] variant.
use glam::IVec3;
use rand::RngCore;

use crate::definition::{CherryBranches, TreeDefinition, TrunkShape, UpwardsBranches};
use crate::growth::FoliageAttachment;
use crate::random::{chance, rand01, rand_below, rand_inclusive, random_horizontal};
use crate::world::{Coordinate, MaterialState, SandboxWorld};

const WIDE_FOOTPRINT: [IVec3; 4] = [IVec3::ZERO, IVec3::X, IVec3::Z, IVec3::new(1, 0, 1)];

fn axis_of(direction: IVec3) -> &'static str {
    if direction.x != 0 {
        "x"
    } else if direction.z != 0 {
        "z"
    } else {
        "y"
    }
}

fn log(definition: &TreeDefinition, axis: &str) -> MaterialState {
    definition.trunk_material.clone().with_property("axis", axis)
}

fn place_log(
    world: &mut dyn SandboxWorld,
    definition: &TreeDefinition,
    position: Coordinate,
    axis: &str,
) -> bool {
    world.try_place(position, log(definition, axis))
}

fn column(
    world: &mut dyn SandboxWorld,
    definition: &TreeDefinition,
    origin: Coordinate,
    height: u32,
) {
    for y in 0..height as i32 {
        place_log(world, definition, origin + IVec3::Y * y, "y");
    }
}

fn wide_column(
    world: &mut dyn SandboxWorld,
    definition: &TreeDefinition,
    origin: Coordinate,
    height: u32,
) {
    for y in 0..height as i32 {
        for offset in WIDE_FOOTPRINT {
            place_log(world, definition, origin + offset + IVec3::Y * y, "y");
        }
    }
}

/// Lays out the trunk and returns the points where canopies attach.
pub fn place(
    world: &mut dyn SandboxWorld,
    rng: &mut dyn RngCore,
    origin: Coordinate,
    height: u32,
    definition: &TreeDefinition,
) -> Vec<FoliageAttachment> {
    let top = origin + IVec3::Y * height as i32;
    match &definition.trunk {
        TrunkShape::Straight(_) => {
            column(world, definition, origin, height);
            vec![FoliageAttachment::new(top, 0, false)]
        }
        TrunkShape::Forking(_) => forking(world, rng, origin, height, definition),
        TrunkShape::Giant(_) => {
            wide_column(world, definition, origin, height);
            vec![FoliageAttachment::new(top, 0, true)]
        }
        TrunkShape::MegaJungle(_) => mega_jungle(world, rng, origin, height, definition),
        TrunkShape::DarkOak(_) => dark_oak(world, rng, origin, height, definition),
        TrunkShape::Cherry(branches) => cherry(world, rng, origin, height, branches, definition),
        TrunkShape::UpwardsBranching(branches) => {
            upwards_branching(world, rng, origin, height, branches, definition)
        }
    }
}

fn forking(
    world: &mut dyn SandboxWorld,
    rng: &mut dyn RngCore,
    origin: Coordinate,
    height: u32,
    definition: &TreeDefinition,
) -> Vec<FoliageAttachment> {
    let height = height as i32;
    let mut attachments = Vec::with_capacity(2);
    let lean = random_horizontal(rng);
    let lean_start = height - rand_below(rng, 4) as i32 - 1;
    let mut lean_left = 3 - rand_below(rng, 3) as i32;

    let mut cursor = origin;
    let mut last = None;
    for y in 0..height {
        if y >= lean_start && lean_left > 0 {
            cursor += lean;
            lean_left -= 1;
        }
        let position = IVec3::new(cursor.x, origin.y + y, cursor.z);
        if place_log(world, definition, position, "y") {
            last = Some(position);
        }
    }
    if let Some(last) = last {
        attachments.push(FoliageAttachment::new(last + IVec3::Y, 1, false));
    }

    let fork = random_horizontal(rng);
    if fork != lean {
        let fork_start = lean_start - rand_below(rng, 2) as i32 - 1;
        let mut steps = 1 + rand_below(rng, 3) as i32;
        let mut cursor = origin;
        let mut last = None;
        let mut y = fork_start;
        while y < height && steps > 0 {
            if y >= 1 {
                cursor += fork;
                let position = IVec3::new(cursor.x, origin.y + y, cursor.z);
                if place_log(world, definition, position, "y") {
                    last = Some(position);
                }
            }
            y += 1;
            steps -= 1;
        }
        if let Some(last) = last {
            attachments.push(FoliageAttachment::new(last + IVec3::Y, 0, false));
        }
    }
    attachments
}

fn mega_jungle(
    world: &mut dyn SandboxWorld,
    rng: &mut dyn RngCore,
    origin: Coordinate,
    height: u32,
    definition: &TreeDefinition,
) -> Vec<FoliageAttachment> {
    wide_column(world, definition, origin, height);
    let height = height as i32;
    let mut attachments = vec![FoliageAttachment::new(origin + IVec3::Y * height, 0, true)];

    let mut y = height - 2 - rand_below(rng, 4) as i32;
    while y > height / 2 {
        let angle = rand01(rng) * std::f32::consts::TAU;
        let mut end = IVec3::ZERO;
        for step in 0..5 {
            end.x = (1.5 + angle.cos() * step as f32) as i32;
            end.z = (1.5 + angle.sin() * step as f32) as i32;
            let position = origin + IVec3::new(end.x, y - 3 + step / 2, end.z);
            place_log(world, definition, position, "y");
        }
        attachments.push(FoliageAttachment::new(origin + IVec3::new(end.x, y, end.z), -2, false));
        y -= 2 + rand_below(rng, 4) as i32;
    }
    attachments
}

fn dark_oak(
    world: &mut dyn SandboxWorld,
    rng: &mut dyn RngCore,
    origin: Coordinate,
    height: u32,
    definition: &TreeDefinition,
) -> Vec<FoliageAttachment> {
    let height = height as i32;
    let lean = random_horizontal(rng);
    let lean_start = height - rand_below(rng, 4) as i32;
    let mut lean_left = 2 - rand_below(rng, 3) as i32;

    let mut cursor = origin;
    for y in 0..height {
        if y >= lean_start && lean_left > 0 {
            cursor += lean;
            lean_left -= 1;
        }
        for offset in WIDE_FOOTPRINT {
            let position = IVec3::new(cursor.x, origin.y + y, cursor.z) + offset;
            place_log(world, definition, position, "y");
        }
    }
    let top_y = origin.y + height;
    let mut attachments = vec![FoliageAttachment::new(
        IVec3::new(cursor.x, top_y, cursor.z),
        0,
        true,
    )];

    for dx in -1..=2 {
        for dz in -1..=2 {
            let outside = !(0..=1).contains(&dx) || !(0..=1).contains(&dz);
            if !outside || rand_below(rng, 3) != 0 {
                continue;
            }
            let length = rand_below(rng, 3) as i32 + 2;
            for n in 0..length {
                let position = IVec3::new(cursor.x + dx, top_y - n - 1, cursor.z + dz);
                place_log(world, definition, position, "y");
            }
            attachments.push(FoliageAttachment::new(
                IVec3::new(cursor.x + dx, top_y, cursor.z + dz),
                0,
                false,
            ));
        }
    }
    attachments
}

fn cherry(
    world: &mut dyn SandboxWorld,
    rng: &mut dyn RngCore,
    origin: Coordinate,
    height: u32,
    branches: &CherryBranches,
    definition: &TreeDefinition,
) -> Vec<FoliageAttachment> {
    column(world, definition, origin, height);
    let height = height as i32;
    let mut attachments = vec![FoliageAttachment::new(origin + IVec3::Y * height, 0, false)];

    let first = random_horizontal(rng);
    let directions = [first, -first];
    let length = branches.branch_horizontal_length.max(1) as i32;
    for direction in directions.into_iter().take(branches.branch_count.min(2) as usize) {
        let offset = rand_inclusive(
            rng,
            branches.branch_start_offset_min,
            branches.branch_start_offset_max,
        );
        let start = (height - 1 + offset).max(1);
        let end = (height + branches.branch_end_offset).max(start);
        let mut tip = origin + IVec3::Y * start;
        for step in 1..=length {
            let y = start + (end - start) * step / length;
            tip = origin + direction * step + IVec3::Y * y;
            place_log(world, definition, tip, axis_of(direction));
        }
        attachments.push(FoliageAttachment::new(tip + IVec3::Y, 0, false));
    }
    attachments
}

fn upwards_branching(
    world: &mut dyn SandboxWorld,
    rng: &mut dyn RngCore,
    origin: Coordinate,
    height: u32,
    branches: &UpwardsBranches,
    definition: &TreeDefinition,
) -> Vec<FoliageAttachment> {
    let height = height as i32;
    let mut attachments = vec![FoliageAttachment::new(origin + IVec3::Y * height, 0, false)];

    for y in 0..height {
        let trunk = origin + IVec3::Y * y;
        place_log(world, definition, trunk, "y");
        if y >= height - 1 || !chance(rng, branches.place_branch_per_log_probability) {
            continue;
        }

        let direction = random_horizontal(rng);
        let steps = branches.extra_branch_steps as i32
            + rand_below(rng, branches.extra_branch_length + 1) as i32;
        let mut last = None;
        for step in 1..=steps {
            let position = trunk + direction * step + IVec3::Y * step;
            if position.y - origin.y >= height {
                break;
            }
            if place_log(world, definition, position, axis_of(direction)) {
                last = Some(position);
            }
        }
        if let Some(last) = last {
            attachments.push(FoliageAttachment::new(last + IVec3::Y, 0, false));
        }
    }
    attachments
}
