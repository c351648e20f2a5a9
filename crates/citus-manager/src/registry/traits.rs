//! Registry trait definitions

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::RegistryResult;

/// Outcome of an idempotent node registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The node was newly added to the membership table
    Registered,

    /// The node was already present; nothing changed
    AlreadyRegistered,
}

/// Read/write access to the coordinator's worker membership table.
///
/// Registrations never shrink the table: node removal requires shard
/// rebalancing, which is out of scope, so no removal operation exists here.
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    /// List the IPs of all nodes registered at the worker port.
    async fn list_nodes(&self) -> RegistryResult<HashSet<String>>;

    /// Register a worker node, tolerating one that already exists.
    async fn add_node(&self, ip: &str) -> RegistryResult<AddOutcome>;
}
