//! A single sandbox generation, packaged to run on any thread.
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::definition::TreeDefinition;
use crate::growth::GenerationAlgorithm;
use crate::world::events::{EventSink, SandboxEvent, SandboxEventKind};
use crate::world::{Coordinate, EnvironmentTemplate, PlacementRecord};

/// Everything one sandbox run needs. Each run gets its own environment and RNG.
#[derive(Clone)]
pub struct GenerationTask {
    pub algorithm: Arc<dyn GenerationAlgorithm>,
    pub template: EnvironmentTemplate,
    pub definition: Arc<TreeDefinition>,
    pub origin: Coordinate,
    pub seed: u64,
}

/// Output of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    pub generated: bool,
    pub placements: Vec<PlacementRecord>,
    pub rejected: usize,
}

impl GenerationTask {
    pub fn new(
        algorithm: Arc<dyn GenerationAlgorithm>,
        template: EnvironmentTemplate,
        definition: Arc<TreeDefinition>,
        origin: Coordinate,
        seed: u64,
    ) -> Self {
        Self {
            algorithm,
            template,
            definition,
            origin,
            seed,
        }
    }

    pub fn run(&self) -> GenerationOutput {
        self.run_with_events(&mut ())
    }

    /// Runs the task, reporting run and placement events into `sink`.
    pub fn run_with_events<S: EventSink>(&self, sink: &mut S) -> GenerationOutput {
        if sink.wants(SandboxEventKind::RunStarted) {
            sink.send(SandboxEvent::RunStarted {
                definition_id: self.definition.id.clone(),
                origin: self.origin,
                seed: self.seed,
            });
        }

        let mut env = self.template.spawn_with_sink(&mut *sink);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let generated = self
            .algorithm
            .generate(&mut env, &mut rng, self.origin, &self.definition);
        let rejected = env.rejected();
        let (ledger, _) = env.into_parts();
        let placements = ledger.into_placements();

        debug!(
            "Run of '{}' at {} (seed {}) placed {} blocks, {} rejected.",
            self.definition.id,
            self.origin,
            self.seed,
            placements.len(),
            rejected
        );
        if sink.wants(SandboxEventKind::RunFinished) {
            sink.send(SandboxEvent::RunFinished {
                placed: placements.len(),
                rejected,
            });
        }

        GenerationOutput {
            generated,
            placements,
            rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::*;
    use crate::growth::TreeGrower;
    use crate::world::events::VecSink;

    fn task(seed: u64) -> GenerationTask {
        GenerationTask::new(
            Arc::new(TreeGrower),
            EnvironmentTemplate::default(),
            Arc::new(TreeDefinition::oak("oak")),
            IVec3::ZERO,
            seed,
        )
    }

    #[test]
    fn same_seed_same_placements() {
        assert_eq!(task(17).run(), task(17).run());
    }

    #[test]
    fn events_bracket_placements() {
        let mut sink = VecSink::new();
        let output = task(4).run_with_events(&mut sink);
        let events = sink.into_inner();

        assert_eq!(events.first().map(SandboxEvent::kind), Some(SandboxEventKind::RunStarted));
        assert_eq!(events.last().map(SandboxEvent::kind), Some(SandboxEventKind::RunFinished));
        let made = events
            .iter()
            .filter(|e| e.kind() == SandboxEventKind::PlacementMade)
            .count();
        assert!(made >= output.placements.len());
    }
}
