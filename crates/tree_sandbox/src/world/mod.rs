//! Headless spatial environment for running generation algorithms.
//!
//! A generation algorithm only sees two capabilities: [`MaterialQuery`] to read
//! what occupies a coordinate and [`MaterialMutator`] to place materials.
//! [`MockEnvironment`] implements both on top of a [`PlacementLedger`] and a
//! [`LegalityPolicy`]; [`HostView`] layers host-shaped calls (lighting, biomes,
//! entities, chunks, ...) over any such world with fixed answers.
use glam::IVec3;

pub mod environment;
pub mod events;
pub mod host;
pub mod ledger;
pub mod legality;
pub mod material;

pub use environment::{EnvironmentTemplate, MockEnvironment};
pub use host::HostView;
pub use ledger::{PlacementLedger, PlacementRecord};
pub use legality::LegalityPolicy;
pub use material::{MaterialCatalog, MaterialCategory, MaterialId, MaterialState};

/// Integer position in the sandboxed space.
pub type Coordinate = IVec3;

/// Read access to the materials of a world.
pub trait MaterialQuery {
    /// Material occupying `position`; never fails.
    fn material_at(&self, position: Coordinate) -> MaterialState;

    /// Category of the material occupying `position`.
    fn category_at(&self, position: Coordinate) -> MaterialCategory;

    /// True when nothing was placed at `position` or the placed material is empty space.
    fn is_empty(&self, position: Coordinate) -> bool;

    /// True when a placement at `position` would pass the legality policy.
    fn can_place_at(&self, position: Coordinate) -> bool;

    fn test_material(
        &self,
        position: Coordinate,
        predicate: &dyn Fn(&MaterialState) -> bool,
    ) -> bool {
        predicate(&self.material_at(position))
    }
}

/// Write access to the materials of a world.
pub trait MaterialMutator {
    /// Places `state` at `position` if legal. Returns whether the write happened.
    fn try_place(&mut self, position: Coordinate, state: MaterialState) -> bool;

    /// Replaces the material at `position` with empty space, subject to the same legality.
    fn remove(&mut self, position: Coordinate) -> bool;
}

/// Everything a generation algorithm needs from its environment.
pub trait SandboxWorld: MaterialQuery + MaterialMutator {}

impl<T: MaterialQuery + MaterialMutator + ?Sized> SandboxWorld for T {}
