//! Sandbox service facade.
//!
//! [`TreeSandbox`] bundles the worker pool, the generation algorithm, the
//! environment template and the registry patcher behind the inbound calls a
//! host exposes: run a sandbox, run a benchmark, preview a replacer and apply a
//! saved definition to the live registry.
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::definition::TreeDefinition;
use crate::error::{Error, Result};
use crate::executor::{
    run_benchmark, BenchmarkConfig, BenchmarkResult, GenerationOutput, GenerationTask, TaskHandle,
    WorkerPool,
};
use crate::growth::{GenerationAlgorithm, TreeGrower};
use crate::registry::{
    FeatureFactory, LiveRegistry, MemoryRegistry, PatchOutcome, PendingChanges, RegistryKey,
    RegistryPatcher, TreeFeatureFactory,
};
use crate::replacer::{Replacer, ReplacerResolver, SelectorGrower};
use crate::world::events::EventSink;
use crate::world::{Coordinate, EnvironmentTemplate, LegalityPolicy, PlacementRecord};

pub struct TreeSandbox {
    config: EngineConfig,
    template: EnvironmentTemplate,
    algorithm: Arc<dyn GenerationAlgorithm>,
    patcher: RegistryPatcher,
    pool: WorkerPool,
}

impl TreeSandbox {
    /// Validates `config` and starts the worker pool.
    ///
    /// The sandbox grows trees with [`TreeGrower`] and patches an empty
    /// [`MemoryRegistry`] until [`Self::with_algorithm`] or
    /// [`Self::with_registry`] says otherwise.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let template = EnvironmentTemplate::from_config(&config.sandbox)?;
        let pool = WorkerPool::from_config(&config)?;
        let patcher = RegistryPatcher::new(
            Arc::new(MemoryRegistry::new()),
            Arc::new(TreeFeatureFactory),
            Arc::new(PendingChanges::new()),
        );
        Ok(Self {
            config,
            template,
            algorithm: Arc::new(TreeGrower),
            patcher,
            pool,
        })
    }

    pub fn with_algorithm(mut self, algorithm: Arc<dyn GenerationAlgorithm>) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_policy(mut self, policy: LegalityPolicy) -> Result<Self> {
        self.template = EnvironmentTemplate::new(&self.config.sandbox, policy)?;
        Ok(self)
    }

    /// Patches `registry` through `factory`, tracking misses in `pending`.
    pub fn with_registry(
        mut self,
        registry: Arc<dyn LiveRegistry>,
        factory: Arc<dyn FeatureFactory>,
        pending: Arc<PendingChanges>,
    ) -> Self {
        self.patcher = RegistryPatcher::new(registry, factory, pending);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn template(&self) -> &EnvironmentTemplate {
        &self.template
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn patcher(&self) -> &RegistryPatcher {
        &self.patcher
    }

    /// Validates `definition` and packages one run of it.
    pub fn task(
        &self,
        definition: &TreeDefinition,
        origin: Coordinate,
        seed: u64,
    ) -> Result<GenerationTask> {
        definition.validate()?;
        Ok(GenerationTask::new(
            Arc::clone(&self.algorithm),
            self.template.clone(),
            Arc::new(definition.clone()),
            origin,
            seed,
        ))
    }

    /// Queues one run on the pool.
    pub fn submit_sandbox(
        &self,
        definition: &TreeDefinition,
        origin: Coordinate,
        seed: u64,
    ) -> Result<TaskHandle<GenerationOutput>> {
        let task = self.task(definition, origin, seed)?;
        Ok(self.pool.submit(move || Ok(task.run())))
    }

    /// Grows `definition` at `origin` on the pool and returns the placements.
    pub fn run_sandbox(
        &self,
        definition: &TreeDefinition,
        origin: Coordinate,
        seed: u64,
    ) -> Result<Vec<PlacementRecord>> {
        let output = self.submit_sandbox(definition, origin, seed)?.wait()?;
        debug!(
            "Sandbox run of '{}' produced {} placements.",
            definition.id,
            output.placements.len()
        );
        Ok(output.placements)
    }

    /// Runs on the calling thread, streaming events into `sink` as blocks land.
    pub fn run_sandbox_with_events<S: EventSink>(
        &self,
        definition: &TreeDefinition,
        origin: Coordinate,
        seed: u64,
        sink: &mut S,
    ) -> Result<GenerationOutput> {
        Ok(self.task(definition, origin, seed)?.run_with_events(sink))
    }

    /// Decodes a JSON definition payload and runs it.
    #[cfg(feature = "serde")]
    pub fn run_sandbox_json(
        &self,
        payload: &str,
        origin: Coordinate,
        seed: u64,
    ) -> Result<Vec<PlacementRecord>> {
        let definition = crate::definition::codec::decode_definition(payload)?;
        self.run_sandbox(&definition, origin, seed)
    }

    /// Grows whichever definition `replacer` resolves to for `seed`.
    pub fn preview_replacer(
        &self,
        replacer: &Replacer,
        origin: Coordinate,
        seed: u64,
    ) -> Result<Vec<PlacementRecord>> {
        let resolver = ReplacerResolver::new(replacer.clone())?;
        let placeholder = replacer
            .definitions()
            .first()
            .map(|d| (*d).clone())
            .ok_or_else(|| {
                Error::InvalidConfig(format!("replacer '{}' has no definitions", replacer.target))
            })?;
        let task = GenerationTask::new(
            Arc::new(SelectorGrower::new(resolver)),
            self.template.clone(),
            Arc::new(placeholder),
            origin,
            seed,
        );
        Ok(self.pool.submit(move || Ok(task.run())).wait()?.placements)
    }

    /// Benchmarks `definition` for `iterations` parallel runs at the origin.
    pub fn run_benchmark(
        &self,
        definition: &TreeDefinition,
        iterations: usize,
    ) -> Result<BenchmarkResult> {
        self.run_benchmark_with(definition, &BenchmarkConfig::new(iterations))
    }

    pub fn run_benchmark_with(
        &self,
        definition: &TreeDefinition,
        config: &BenchmarkConfig,
    ) -> Result<BenchmarkResult> {
        let task = self.task(definition, Coordinate::ZERO, config.base_seed)?;
        run_benchmark(&self.pool, &task, config)
    }

    /// Applies a saved definition to the live entry at `key`.
    ///
    /// With hot reload disabled the change is only tracked for the next restart.
    pub fn apply_patch(
        &self,
        key: impl Into<RegistryKey>,
        definition: &TreeDefinition,
    ) -> Result<PatchOutcome> {
        let key = key.into();
        if !self.config.hot_reload_enabled {
            info!("Hot reload disabled; deferring '{}' until restart.", key);
            return self.patcher.defer_patch(&key, definition);
        }
        self.patcher.apply_patch(&key, definition)
    }

    /// Applies a saved replacer to its target entry.
    pub fn apply_replacer(&self, replacer: &Replacer) -> Result<PatchOutcome> {
        if !self.config.hot_reload_enabled {
            info!("Hot reload disabled; deferring replacer '{}' until restart.", replacer.target);
            return self.patcher.defer_replacer(replacer);
        }
        self.patcher.apply_replacer(replacer)
    }

    /// Stops the pool. Later submissions fail with [`Error::PoolShutdown`].
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}
