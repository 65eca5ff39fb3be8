//! In-memory stand-in for a live world.
//!
//! An [`EnvironmentTemplate`] is built once from a [`SandboxConfig`] and a
//! [`LegalityPolicy`]; every run spawns its own [`MockEnvironment`] from it, so
//! runs never share a ledger.
use std::sync::Arc;

use tracing::trace;

use crate::config::SandboxConfig;
use crate::error::Result;
use crate::world::events::{EventSink, SandboxEvent, SandboxEventKind};
use crate::world::ledger::{PlacementLedger, PlacementRecord};
use crate::world::legality::LegalityPolicy;
use crate::world::material::{MaterialCategory, MaterialState};
use crate::world::{Coordinate, HostView, MaterialMutator, MaterialQuery};

/// Layered synthetic terrain: fill below ground, one ground layer, empty above.
#[derive(Debug, Clone)]
struct FlatTerrain {
    base_elevation: i32,
    ground: MaterialState,
    fill: MaterialState,
    empty: MaterialState,
}

impl FlatTerrain {
    fn from_config(config: &SandboxConfig) -> Self {
        Self {
            base_elevation: config.base_elevation,
            ground: MaterialState::new(config.ground_material.clone()),
            fill: MaterialState::new(config.fill_material.clone()),
            empty: MaterialState::new(config.empty_material.clone()),
        }
    }

    fn at(&self, position: Coordinate) -> &MaterialState {
        let ground = self.base_elevation - 1;
        if position.y == ground {
            &self.ground
        } else if position.y < ground {
            &self.fill
        } else {
            &self.empty
        }
    }
}

/// Shared, immutable recipe for fresh environments.
#[derive(Debug, Clone)]
pub struct EnvironmentTemplate {
    terrain: Arc<FlatTerrain>,
    policy: Arc<LegalityPolicy>,
}

impl Default for EnvironmentTemplate {
    fn default() -> Self {
        Self {
            terrain: Arc::new(FlatTerrain::from_config(&SandboxConfig::default())),
            policy: Arc::new(LegalityPolicy::default()),
        }
    }
}

impl EnvironmentTemplate {
    /// Validates `config` and pairs its terrain with `policy`.
    pub fn new(config: &SandboxConfig, policy: LegalityPolicy) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            terrain: Arc::new(FlatTerrain::from_config(config)),
            policy: Arc::new(policy),
        })
    }

    /// Template with the default legality policy.
    pub fn from_config(config: &SandboxConfig) -> Result<Self> {
        Self::new(config, LegalityPolicy::default())
    }

    pub fn policy(&self) -> &LegalityPolicy {
        &self.policy
    }

    pub fn base_elevation(&self) -> i32 {
        self.terrain.base_elevation
    }

    /// A fresh environment with an empty ledger.
    pub fn spawn(&self) -> MockEnvironment {
        self.spawn_with_sink(())
    }

    /// A fresh environment that reports placements into `sink`.
    pub fn spawn_with_sink<S: EventSink>(&self, sink: S) -> MockEnvironment<S> {
        MockEnvironment {
            terrain: Arc::clone(&self.terrain),
            policy: Arc::clone(&self.policy),
            ledger: PlacementLedger::new(),
            rejected: 0,
            sink,
        }
    }
}

/// Fake world answering every query from its ledger or the synthetic terrain.
pub struct MockEnvironment<S: EventSink = ()> {
    terrain: Arc<FlatTerrain>,
    policy: Arc<LegalityPolicy>,
    ledger: PlacementLedger,
    rejected: usize,
    sink: S,
}

impl MockEnvironment {
    /// Environment over the default terrain and policy.
    pub fn new() -> Self {
        EnvironmentTemplate::default().spawn()
    }
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> MockEnvironment<S> {
    fn current(&self, position: Coordinate) -> &MaterialState {
        self.ledger
            .get(position)
            .unwrap_or_else(|| self.terrain.at(position))
    }

    pub fn ledger(&self) -> &PlacementLedger {
        &self.ledger
    }

    pub fn policy(&self) -> &LegalityPolicy {
        &self.policy
    }

    /// Number of placement attempts the legality policy refused.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Host-shaped view over this environment.
    pub fn host(&mut self) -> HostView<'_, Self> {
        HostView::new(self)
    }

    /// Drains the ledger into the ordered list of distinct placements.
    pub fn into_placements(self) -> Vec<PlacementRecord> {
        self.ledger.into_placements()
    }

    pub fn into_parts(self) -> (PlacementLedger, S) {
        (self.ledger, self.sink)
    }
}

impl<S: EventSink> MaterialQuery for MockEnvironment<S> {
    fn material_at(&self, position: Coordinate) -> MaterialState {
        self.current(position).clone()
    }

    fn category_at(&self, position: Coordinate) -> MaterialCategory {
        self.policy.category_of(&self.current(position).id)
    }

    fn is_empty(&self, position: Coordinate) -> bool {
        self.ledger
            .get(position)
            .is_none_or(|state| self.policy.is_empty_space(state))
    }

    fn can_place_at(&self, position: Coordinate) -> bool {
        self.policy.is_yielding(self.current(position))
    }

    fn test_material(
        &self,
        position: Coordinate,
        predicate: &dyn Fn(&MaterialState) -> bool,
    ) -> bool {
        predicate(self.current(position))
    }
}

impl<S: EventSink> MaterialMutator for MockEnvironment<S> {
    fn try_place(&mut self, position: Coordinate, state: MaterialState) -> bool {
        let existing = self.current(position);
        if !self.policy.can_replace(existing, &state) {
            let existing = existing.id.clone();
            self.rejected += 1;
            trace!("Rejected {} at {} over {}.", state.id, position, existing);
            if self.sink.wants(SandboxEventKind::PlacementRejected) {
                self.sink.send(SandboxEvent::PlacementRejected {
                    position,
                    existing,
                    candidate: state.id,
                });
            }
            return false;
        }

        if self.sink.wants(SandboxEventKind::PlacementMade) {
            self.sink.send(SandboxEvent::PlacementMade {
                record: PlacementRecord::new(position, state.clone()),
            });
        }
        self.ledger.record(position, state);
        true
    }

    fn remove(&mut self, position: Coordinate) -> bool {
        let empty = self.terrain.empty.clone();
        self.try_place(position, empty)
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::*;
    use crate::world::events::VecSink;

    #[test]
    fn synthetic_terrain_is_layered() {
        let env = MockEnvironment::new();
        assert_eq!(env.material_at(IVec3::new(0, -1, 0)), "grass_block".into());
        assert_eq!(env.material_at(IVec3::new(3, -5, 7)), "dirt".into());
        assert_eq!(env.material_at(IVec3::new(0, 0, 0)), "air".into());
        assert!(env.ledger().is_empty());
    }

    #[test]
    fn base_elevation_moves_the_ground() {
        let config = SandboxConfig::new().with_base_elevation(64);
        let env = EnvironmentTemplate::from_config(&config).unwrap().spawn();
        assert_eq!(env.material_at(IVec3::new(0, 63, 0)), "grass_block".into());
        assert_eq!(env.category_at(IVec3::new(0, 64, 0)), MaterialCategory::Empty);
    }

    #[test]
    fn logs_block_later_placements() {
        let mut env = MockEnvironment::new();
        let p = IVec3::new(0, 0, 0);
        assert!(env.try_place(p, "oak_log".into()));
        assert!(!env.try_place(p, "oak_leaves".into()));
        assert_eq!(env.material_at(p), "oak_log".into());
        assert_eq!(env.rejected(), 1);
    }

    #[test]
    fn ground_is_not_overwritten() {
        let mut env = MockEnvironment::new();
        assert!(!env.try_place(IVec3::new(0, -1, 0), "oak_log".into()));
        assert!(env.ledger().is_empty());
    }

    #[test]
    fn leaves_yield_to_logs() {
        let mut env = MockEnvironment::new();
        let p = IVec3::new(1, 2, 3);
        assert!(env.try_place(p, "oak_leaves".into()));
        assert!(env.try_place(p, "oak_log".into()));
        let placements = env.into_placements();
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].state, "oak_log".into());
    }

    #[test]
    fn is_empty_follows_the_ledger() {
        let mut env = MockEnvironment::new();
        let p = IVec3::new(0, 5, 0);
        assert!(env.is_empty(p));
        env.try_place(p, "oak_leaves".into());
        assert!(!env.is_empty(p));
        assert!(env.remove(p));
        assert!(env.is_empty(p));
        assert_eq!(env.ledger().len(), 1);
    }

    #[test]
    fn sink_receives_made_and_rejected() {
        let mut sink = VecSink::new();
        let mut env = EnvironmentTemplate::default().spawn_with_sink(&mut sink);
        env.try_place(IVec3::ZERO, "oak_log".into());
        env.try_place(IVec3::ZERO, "stone".into());
        drop(env);

        let kinds: Vec<_> = sink.as_slice().iter().map(SandboxEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![SandboxEventKind::PlacementMade, SandboxEventKind::PlacementRejected]
        );
    }

    #[test]
    fn spawned_environments_do_not_share_ledgers() {
        let template = EnvironmentTemplate::default();
        let mut a = template.spawn();
        let b = template.spawn();
        a.try_place(IVec3::ZERO, "oak_log".into());
        assert_eq!(a.ledger().len(), 1);
        assert!(b.ledger().is_empty());
    }
}
