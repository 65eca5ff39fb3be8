//! Host-shaped facade over a [`SandboxWorld`].
//!
//! Generation code written against a live world asks for far more than materials:
//! light, biomes, entities, chunk residency, world border, height bounds. [`HostView`]
//! answers all of it with fixed values and forwards material reads and writes to
//! the wrapped world. None of these calls fail.
use glam::IVec3;

use crate::world::material::{MaterialCategory, MaterialId, MaterialState};
use crate::world::{Coordinate, SandboxWorld};

pub const FULL_LIGHT: u8 = 15;
pub const BOTTOM_Y: i32 = -64;
pub const TOP_Y: i32 = 320;
pub const SEA_LEVEL: i32 = 63;
pub const DEFAULT_BIOME: &str = "minecraft:plains";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightLayer {
    Sky,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    Empty,
    Features,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Peaceful,
    Easy,
    Normal,
    Hard,
}

/// Opaque entity reference; the sandbox never has any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Fluid occupying a coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FluidState {
    Empty,
    Source(MaterialId),
}

impl FluidState {
    pub fn is_empty(&self) -> bool {
        matches!(self, FluidState::Empty)
    }
}

/// World border that contains every coordinate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldBorder;

impl WorldBorder {
    pub fn contains(&self, _position: Coordinate) -> bool {
        true
    }
}

/// Borrowing adapter exposing host-style calls over any sandbox world.
pub struct HostView<'a, W: ?Sized> {
    world: &'a mut W,
}

impl<'a, W: SandboxWorld + ?Sized> HostView<'a, W> {
    pub fn new(world: &'a mut W) -> Self {
        Self { world }
    }

    pub fn block_state(&self, position: Coordinate) -> MaterialState {
        self.world.material_at(position)
    }

    /// Writes through legality; `_flags` is accepted for call-shape compatibility.
    pub fn set_block_state(
        &mut self,
        position: Coordinate,
        state: MaterialState,
        _flags: u32,
    ) -> bool {
        self.world.try_place(position, state)
    }

    pub fn remove_block(&mut self, position: Coordinate) -> bool {
        self.world.remove(position)
    }

    /// Breaking a block is reported as done and leaves the ledger alone.
    pub fn break_block(&mut self, _position: Coordinate, _drop_items: bool) -> bool {
        true
    }

    pub fn is_air(&self, position: Coordinate) -> bool {
        self.world.is_empty(position)
    }

    pub fn test_block_state(
        &self,
        position: Coordinate,
        predicate: impl Fn(&MaterialState) -> bool,
    ) -> bool {
        self.world.test_material(position, &predicate)
    }

    /// Fluid at `position`; only placed or synthetic fluid materials report one.
    pub fn fluid_state(&self, position: Coordinate) -> FluidState {
        match self.world.category_at(position) {
            MaterialCategory::Fluid => FluidState::Source(self.world.material_at(position).id),
            _ => FluidState::Empty,
        }
    }

    pub fn light_level(&self, _layer: LightLayer, _position: Coordinate) -> u8 {
        FULL_LIGHT
    }

    pub fn ambient_darkness(&self) -> u8 {
        0
    }

    pub fn brightness(&self, _position: Coordinate) -> f32 {
        1.0
    }

    pub fn biome_at(&self, _position: Coordinate) -> MaterialId {
        MaterialId::new(DEFAULT_BIOME)
    }

    pub fn entities_in(&self, _min: Coordinate, _max: Coordinate) -> Vec<EntityId> {
        Vec::new()
    }

    pub fn players(&self) -> Vec<EntityId> {
        Vec::new()
    }

    pub fn is_chunk_loaded(&self, _chunk_x: i32, _chunk_z: i32) -> bool {
        true
    }

    pub fn chunk_status(&self, _chunk_x: i32, _chunk_z: i32) -> ChunkStatus {
        ChunkStatus::Full
    }

    pub fn world_border(&self) -> WorldBorder {
        WorldBorder
    }

    pub fn bottom_y(&self) -> i32 {
        BOTTOM_Y
    }

    pub fn top_y(&self) -> i32 {
        TOP_Y
    }

    pub fn height(&self) -> i32 {
        TOP_Y - BOTTOM_Y
    }

    /// True when `position` lies within the vertical build range.
    pub fn is_in_build_height(&self, position: Coordinate) -> bool {
        (BOTTOM_Y..TOP_Y).contains(&position.y)
    }

    pub fn sea_level(&self) -> i32 {
        SEA_LEVEL
    }

    pub fn seed(&self) -> u64 {
        0
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::Normal
    }

    pub fn play_sound(&mut self, _position: Coordinate, _sound: &str, _volume: f32, _pitch: f32) {}

    pub fn add_particle(&mut self, _particle: &str, _position: glam::Vec3, _velocity: glam::Vec3) {}

    pub fn emit_game_event(&mut self, _event: &str, _position: Coordinate) {}

    pub fn sync_world_event(&mut self, _event: i32, _position: Coordinate, _data: i32) {}

    pub fn spawn_entity(&mut self, _kind: &str, _position: Coordinate) -> bool {
        false
    }

    pub fn top_y_at(&self, _x: i32, _z: i32) -> i32 {
        TOP_Y
    }

    pub fn origin_chunk(&self, position: Coordinate) -> IVec3 {
        IVec3::new(position.x >> 4, 0, position.z >> 4)
    }
}
