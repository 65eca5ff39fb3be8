//! Per-run record of placed materials.
use std::collections::HashMap;

use glam::IVec3;

use crate::world::material::MaterialState;

/// A material placed at a coordinate by a successful mutation.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "PlacementRepr", into = "PlacementRepr")
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementRecord {
    pub position: IVec3,
    pub state: MaterialState,
}

impl PlacementRecord {
    pub fn new(position: IVec3, state: MaterialState) -> Self {
        Self { position, state }
    }
}

/// Flat wire shape `{x, y, z, blockState}` used by preview clients.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct PlacementRepr {
    x: i32,
    y: i32,
    z: i32,
    #[serde(rename = "blockState")]
    state: MaterialState,
}

#[cfg(feature = "serde")]
impl From<PlacementRecord> for PlacementRepr {
    fn from(value: PlacementRecord) -> Self {
        Self {
            x: value.position.x,
            y: value.position.y,
            z: value.position.z,
            state: value.state,
        }
    }
}

#[cfg(feature = "serde")]
impl From<PlacementRepr> for PlacementRecord {
    fn from(value: PlacementRepr) -> Self {
        Self {
            position: IVec3::new(value.x, value.y, value.z),
            state: value.state,
        }
    }
}

/// Sparse coordinate to material map with last-write-wins semantics.
///
/// Records keep the order in which their coordinate was first written; a later write to
/// the same coordinate replaces the state in place.
#[derive(Clone, Debug, Default)]
pub struct PlacementLedger {
    records: Vec<PlacementRecord>,
    index: HashMap<IVec3, usize>,
}

impl PlacementLedger {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            records: Vec::with_capacity(cap),
            index: HashMap::with_capacity(cap),
        }
    }

    /// Stored state at `position`, if any.
    pub fn get(&self, position: IVec3) -> Option<&MaterialState> {
        self.index.get(&position).map(|&i| &self.records[i].state)
    }

    pub fn contains(&self, position: IVec3) -> bool {
        self.index.contains_key(&position)
    }

    /// Writes `state` at `position`, returning the state it replaced.
    pub fn record(&mut self, position: IVec3, state: MaterialState) -> Option<MaterialState> {
        match self.index.get(&position) {
            Some(&i) => Some(std::mem::replace(&mut self.records[i].state, state)),
            None => {
                self.index.insert(position, self.records.len());
                self.records.push(PlacementRecord::new(position, state));
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[PlacementRecord] {
        &self.records
    }

    /// Consumes the ledger, yielding one record per distinct coordinate.
    pub fn into_placements(self) -> Vec<PlacementRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_write_replaces_earlier_in_place() {
        let mut ledger = PlacementLedger::new();
        let a = IVec3::new(0, 0, 0);
        let b = IVec3::new(1, 0, 0);

        assert!(ledger.record(a, MaterialState::new("oak_leaves")).is_none());
        ledger.record(b, MaterialState::new("oak_log"));
        let previous = ledger.record(a, MaterialState::new("birch_leaves"));

        assert_eq!(previous, Some(MaterialState::new("oak_leaves")));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get(a), Some(&MaterialState::new("birch_leaves")));

        let positions: Vec<_> = ledger.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![a, b]);
    }

    #[test]
    fn reading_does_not_create_entries() {
        let ledger = PlacementLedger::new();
        assert!(ledger.get(IVec3::ZERO).is_none());
        assert!(!ledger.contains(IVec3::ZERO));
        assert!(ledger.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn placement_serializes_flat_with_block_state() {
        let record = PlacementRecord::new(
            IVec3::new(1, 2, 3),
            MaterialState::new("oak_log").with_property("axis", "y"),
        );
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["x"], 1);
        assert_eq!(json["z"], 3);
        assert_eq!(json["blockState"]["Name"], "minecraft:oak_log");
        assert_eq!(json["blockState"]["Properties"]["axis"], "y");
    }
}
