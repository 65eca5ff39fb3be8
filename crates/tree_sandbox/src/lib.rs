#![forbid(unsafe_code)]
//! tree_sandbox: headless tree generation sandbox with hot-patching of live definitions.
//!
//! Modules:
//! - world: mock spatial environment, placement ledger, legality policy, events
//! - definition: tree definitions, authoring drafts with inheritance, codecs
//! - growth: the generation algorithm seam and the reference tree grower
//! - replacer: uniform / weighted choice among alternative definitions
//! - registry: live registry entries, in-place patching, pending changes
//! - executor: worker pool, generation tasks, benchmark harness
//! - sandbox: the service facade tying them together
//!
//! For examples, see the `tree_sandbox_examples` crate.
pub mod config;
pub mod definition;
pub mod error;
pub mod executor;
pub mod growth;
mod random;
pub mod registry;
pub mod replacer;
pub mod sandbox;
pub mod world;

/// Convenient re-exports for common types. Import with `use tree_sandbox::prelude::*;`.
pub mod prelude {
    pub use crate::config::{EngineConfig, SandboxConfig};
    #[cfg(feature = "serde")]
    pub use crate::definition::codec::{
        decode_definition, decode_draft, decode_replacer, encode_definition, encode_placements,
    };
    pub use crate::definition::{
        CanopyShape, DefinitionLibrary, FeatureSize, TreeDefinition, TreeDraft, TrunkHeight,
        TrunkShape,
    };
    pub use crate::error::{Error, Result};
    pub use crate::executor::{
        BenchmarkConfig, BenchmarkMode, BenchmarkResult, GenerationOutput, GenerationTask,
        TaskHandle, WorkerPool,
    };
    pub use crate::growth::{GenerationAlgorithm, TreeGrower};
    pub use crate::registry::{
        FeatureFactory, LiveEntry, LiveFeature, LiveRegistry, MemoryRegistry, PatchOutcome,
        PendingChanges, RegistryKey, RegistryPatcher, TreeFeatureFactory,
    };
    pub use crate::replacer::{
        Replacer, ReplacerResolver, ReplacerStrategy, SelectorGrower, WeightedAlternative,
    };
    pub use crate::sandbox::TreeSandbox;
    pub use crate::world::events::{EventSink, FnSink, SandboxEvent, SandboxEventKind, VecSink};
    pub use crate::world::{
        Coordinate, EnvironmentTemplate, HostView, LegalityPolicy, MaterialCategory, MaterialId,
        MaterialMutator, MaterialQuery, MaterialState, MockEnvironment, PlacementLedger,
        PlacementRecord, SandboxWorld,
    };
}
