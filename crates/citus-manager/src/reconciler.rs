//! Reconciliation of observed pod state into registry mutations
//!
//! Poll mode diffs a full snapshot against the registered set and adds what
//! is missing; stream mode applies one event at a time. Neither mode ever
//! removes a node: deregistration requires shard rebalancing, which is an
//! external concern, so pod departures leave the registry untouched.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ManagerResult;
use crate::fleet::{EventKind, ObservationEvent, WorkerCandidate};
use crate::registry::{AddOutcome, NodeRegistry};

/// What one poll-mode cycle did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Nodes newly registered this cycle
    pub registered: usize,

    /// Registration attempts that failed this cycle
    pub failed: usize,
}

/// Applies observed pod state to the worker registry.
pub struct Reconciler<R> {
    registry: Arc<R>,
}

impl<R: NodeRegistry> Reconciler<R> {
    /// Create a reconciler over the given registry.
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    /// One poll-mode cycle: register every ready worker missing from the
    /// membership table.
    ///
    /// Registry failures are logged and absorbed; the next cycle retries
    /// from scratch. A failed listing is treated as an empty registered
    /// set, which is safe because every add is idempotent.
    pub async fn reconcile(&self, candidates: &[WorkerCandidate]) -> CycleOutcome {
        let desired: HashSet<&str> = candidates
            .iter()
            .filter(|c| c.is_ready_worker())
            .map(|c| c.ip.as_str())
            .collect();

        let actual = match self.registry.list_nodes().await {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list registered nodes, assuming none");
                HashSet::new()
            }
        };

        tracing::debug!(desired = ?desired, actual = ?actual, "Reconciling worker nodes");

        let mut outcome = CycleOutcome::default();
        for ip in desired {
            if actual.contains(ip) {
                continue;
            }
            match self.registry.add_node(ip).await {
                Ok(AddOutcome::Registered) => {
                    tracing::info!(ip = %ip, "Worker registered");
                    outcome.registered += 1;
                }
                Ok(AddOutcome::AlreadyRegistered) => {
                    tracing::debug!(ip = %ip, "Worker already registered");
                }
                Err(e) => {
                    tracing::error!(ip = %ip, error = %e, "Failed to register worker");
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    /// Register every discovered candidate, failing fast.
    ///
    /// Used at stream-mode bootstrap, where a missed registration has no
    /// later cycle to catch it; the process restart after the resulting
    /// crash re-runs discovery and retries.
    pub async fn register_all(&self, candidates: &[WorkerCandidate]) -> ManagerResult<()> {
        for candidate in candidates {
            self.register(&candidate.ip).await?;
        }
        Ok(())
    }

    /// Apply one stream event.
    ///
    /// Registration failures are fatal here for the same reason as in
    /// `register_all`: stream mode has no retry cycle, crash-and-rediscover
    /// is the recovery mechanism.
    pub async fn apply_event(&self, event: &ObservationEvent) -> ManagerResult<()> {
        if event.kind == EventKind::Deleted {
            self.handle_departure(event);
            return Ok(());
        }

        match event.wants_registration() {
            Some(ip) => self.register(ip).await,
            None => Ok(()),
        }
    }

    async fn register(&self, ip: &str) -> ManagerResult<()> {
        match self.registry.add_node(ip).await {
            Ok(AddOutcome::Registered) => {
                tracing::info!(ip = %ip, "Worker registered");
                Ok(())
            }
            Ok(AddOutcome::AlreadyRegistered) => {
                tracing::debug!(ip = %ip, "Worker already registered");
                Ok(())
            }
            Err(source) => Err(crate::error::ManagerError::Registration {
                ip: ip.to_string(),
                source,
            }),
        }
    }

    /// Policy: a departed pod leaves its node registered. Removing a node
    /// from a sharded coordinator requires rebalancing its shards first,
    /// and nothing here can guarantee that happened.
    fn handle_departure(&self, event: &ObservationEvent) {
        tracing::info!(ip = ?event.ip, "Worker pod deleted, node left registered");
    }
}
