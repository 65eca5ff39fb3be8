//! Engine and sandbox configuration.
//!
//! Both structs follow the same shape: `Default`, `with_*` builders, and a
//! `validate` step that callers run before handing the config to a runner.
//! With the `ron` feature, [`EngineConfig::from_ron_str`] loads a config file.
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::world::material::MaterialId;

/// Lower bound for worker threads.
pub const MIN_WORKER_THREADS: usize = 1;
/// Upper bound for worker threads.
pub const MAX_WORKER_THREADS: usize = 16;
/// Grace period the pool waits for queued work at shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Synthetic terrain answered by the mock environment outside the ledger.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxConfig {
    /// Elevation of the first empty layer; ground sits one layer below.
    pub base_elevation: i32,
    /// Material of the single ground layer at `base_elevation - 1`.
    pub ground_material: MaterialId,
    /// Material filling everything below the ground layer.
    pub fill_material: MaterialId,
    /// Material reported for empty space.
    pub empty_material: MaterialId,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            base_elevation: 0,
            ground_material: MaterialId::new("minecraft:grass_block"),
            fill_material: MaterialId::new("minecraft:dirt"),
            empty_material: MaterialId::new("minecraft:air"),
        }
    }
}

impl SandboxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base elevation.
    pub fn with_base_elevation(mut self, base_elevation: i32) -> Self {
        self.base_elevation = base_elevation;
        self
    }

    /// Sets the ground material.
    pub fn with_ground_material(mut self, material: impl Into<MaterialId>) -> Self {
        self.ground_material = material.into();
        self
    }

    /// Sets the below-ground fill material.
    pub fn with_fill_material(mut self, material: impl Into<MaterialId>) -> Self {
        self.fill_material = material.into();
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.ground_material == self.empty_material {
            return Err(Error::InvalidConfig(
                "ground_material must differ from empty_material".into(),
            ));
        }
        if self.fill_material == self.empty_material {
            return Err(Error::InvalidConfig(
                "fill_material must differ from empty_material".into(),
            ));
        }
        Ok(())
    }
}

/// Process-level configuration for the sandbox service.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Requested worker threads; clamped to `[1, 16]`.
    pub tree_generation_threads: usize,
    /// Whether saved definitions are patched into the live registry.
    pub hot_reload_enabled: bool,
    /// Grace period for the worker pool at shutdown.
    #[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
    pub shutdown_grace: Duration,
    /// Synthetic terrain for sandbox runs.
    pub sandbox: SandboxConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tree_generation_threads: 4,
            hot_reload_enabled: true,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            sandbox: SandboxConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.tree_generation_threads = threads;
        self
    }

    /// Enables or disables registry hot reload.
    pub fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.hot_reload_enabled = enabled;
        self
    }

    /// Sets the pool shutdown grace period.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Sets the sandbox terrain configuration.
    pub fn with_sandbox(mut self, sandbox: SandboxConfig) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Worker thread count after clamping to `[1, 16]`.
    pub fn effective_threads(&self) -> usize {
        clamp_worker_threads(self.tree_generation_threads)
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.sandbox.validate()
    }

    /// Parses a RON document into a validated config.
    #[cfg(feature = "ron")]
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| Error::decode("engine config", e))?;
        config.validate()?;
        Ok(config)
    }
}

/// Clamps a requested worker count to `[MIN_WORKER_THREADS, MAX_WORKER_THREADS]`.
pub fn clamp_worker_threads(requested: usize) -> usize {
    requested.clamp(MIN_WORKER_THREADS, MAX_WORKER_THREADS)
}

#[cfg(feature = "serde")]
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_count_is_clamped() {
        assert_eq!(EngineConfig::new().with_threads(0).effective_threads(), 1);
        assert_eq!(EngineConfig::new().with_threads(64).effective_threads(), 16);
        assert_eq!(EngineConfig::new().with_threads(8).effective_threads(), 8);
    }

    #[test]
    fn validate_rejects_empty_ground() {
        let config = SandboxConfig::new().with_ground_material("air");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert!(SandboxConfig::default().validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"tree_generation_threads": 2, "shutdown_grace": 250}"#)
                .expect("config parses");
        assert_eq!(config.tree_generation_threads, 2);
        assert_eq!(config.shutdown_grace, Duration::from_millis(250));
        assert!(config.hot_reload_enabled);
        assert_eq!(config.sandbox, SandboxConfig::default());
    }

    #[cfg(feature = "ron")]
    #[test]
    fn ron_config_loads() {
        let config = EngineConfig::from_ron_str(
            "(tree_generation_threads: 3, sandbox: (base_elevation: 64))",
        )
        .expect("ron parses");
        assert_eq!(config.effective_threads(), 3);
        assert_eq!(config.sandbox.base_elevation, 64);
    }
}
