//! Worker fleet observation
//!
//! Turns orchestrator pod state into the typed observations the reconciler
//! consumes.

mod observer;
mod pod;

pub use observer::FleetObserver;
pub use pod::{EventKind, ObservationEvent, PodPhase, WorkerCandidate};
