//! In-memory registry implementation

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{AddOutcome, NodeRegistry};
use crate::error::RegistryResult;

/// In-memory registry for development and testing
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    nodes: RwLock<HashSet<String>>,
}

impl InMemoryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the given IP is registered
    pub async fn contains(&self, ip: &str) -> bool {
        self.nodes.read().await.contains(ip)
    }

    /// Number of registered nodes
    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }
}

#[async_trait]
impl NodeRegistry for InMemoryRegistry {
    async fn list_nodes(&self) -> RegistryResult<HashSet<String>> {
        Ok(self.nodes.read().await.clone())
    }

    async fn add_node(&self, ip: &str) -> RegistryResult<AddOutcome> {
        let mut nodes = self.nodes.write().await;
        if nodes.insert(ip.to_string()) {
            Ok(AddOutcome::Registered)
        } else {
            Ok(AddOutcome::AlreadyRegistered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_node_is_idempotent() {
        let registry = InMemoryRegistry::new();

        let first = registry.add_node("10.0.0.1").await.unwrap();
        let second = registry.add_node("10.0.0.1").await.unwrap();

        assert_eq!(first, AddOutcome::Registered);
        assert_eq!(second, AddOutcome::AlreadyRegistered);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_nodes_reflects_additions() {
        let registry = InMemoryRegistry::new();
        registry.add_node("10.0.0.1").await.unwrap();
        registry.add_node("10.0.0.2").await.unwrap();

        let nodes = registry.list_nodes().await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes.contains("10.0.0.1"));
        assert!(nodes.contains("10.0.0.2"));
    }
}
