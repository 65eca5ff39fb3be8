//! Event types and sinks for observing sandbox runs.
//!
//! A [`crate::world::MockEnvironment`] emits [`SandboxEvent`]s into an
//! [`EventSink`] as placements are accepted or rejected; the sandbox runner adds
//! run start/finish events. Sinks let preview clients stream blocks while a run
//! is still in progress.
use glam::IVec3;

use crate::world::ledger::PlacementRecord;
use crate::world::material::MaterialId;

/// Describes events emitted by sandbox operations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum SandboxEvent {
    /// Emitted before the generation algorithm is invoked.
    RunStarted {
        /// Definition id being grown.
        definition_id: String,
        /// Origin coordinate of the run.
        origin: IVec3,
        /// Seed of the run RNG.
        seed: u64,
    },

    /// Emitted when the algorithm returns.
    RunFinished {
        /// Number of distinct coordinates in the ledger.
        placed: usize,
        /// Number of rejected placement attempts.
        rejected: usize,
    },

    /// Emitted when a placement was accepted.
    PlacementMade {
        /// The placement data.
        record: PlacementRecord,
    },

    /// Emitted when the legality policy rejected a placement.
    PlacementRejected {
        /// Target coordinate.
        position: IVec3,
        /// Material that blocked the write.
        existing: MaterialId,
        /// Material the algorithm tried to place.
        candidate: MaterialId,
    },
}

/// Discriminant of [`SandboxEvent`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxEventKind {
    RunStarted,
    RunFinished,
    PlacementMade,
    PlacementRejected,
}

impl SandboxEvent {
    pub fn kind(&self) -> SandboxEventKind {
        match self {
            SandboxEvent::RunStarted { .. } => SandboxEventKind::RunStarted,
            SandboxEvent::RunFinished { .. } => SandboxEventKind::RunFinished,
            SandboxEvent::PlacementMade { .. } => SandboxEventKind::PlacementMade,
            SandboxEvent::PlacementRejected { .. } => SandboxEventKind::PlacementRejected,
        }
    }
}

/// A generic event sink that accepts [`SandboxEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: SandboxEvent);

    /// Whether events of `kind` should be built at all.
    #[inline]
    fn wants(&self, _kind: SandboxEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: SandboxEvent) {}

    #[inline]
    fn wants(&self, _kind: SandboxEventKind) -> bool {
        false
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    #[inline]
    fn send(&mut self, event: SandboxEvent) {
        (**self).send(event);
    }

    #[inline]
    fn wants(&self, kind: SandboxEventKind) -> bool {
        (**self).wants(kind)
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(SandboxEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(SandboxEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(SandboxEvent),
{
    #[inline]
    fn send(&mut self, event: SandboxEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<SandboxEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<SandboxEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[SandboxEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: SandboxEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::material::MaterialState;

    fn made(x: i32) -> SandboxEvent {
        SandboxEvent::PlacementMade {
            record: PlacementRecord::new(IVec3::new(x, 0, 0), MaterialState::new("oak_log")),
        }
    }

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(made(0));
        sink.send(SandboxEvent::RunFinished {
            placed: 1,
            rejected: 0,
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.as_slice()[0].kind(), SandboxEventKind::PlacementMade);
    }

    #[test]
    fn unit_sink_wants_nothing() {
        let sink = ();
        assert!(!sink.wants(SandboxEventKind::PlacementMade));
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        sink.send(made(1));
        sink.send(made(2));
        assert_eq!(count, 2);
    }
}
