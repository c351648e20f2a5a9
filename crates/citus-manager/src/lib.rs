//! Citus worker-fleet manager
//!
//! This crate provides the components of the manager daemon:
//! - Coordinator session and worker registry access
//! - Fleet observation (snapshot and watch strategies)
//! - Reconciliation of pod state into registry mutations
//! - Controller lifecycle and readiness signaling

pub mod config;
pub mod controller;
pub mod error;
pub mod fleet;
pub mod probe;
pub mod reconciler;
pub mod registry;
pub mod session;

pub use config::{Cli, ManagerConfig, SyncMode};
pub use controller::Controller;
pub use error::{ManagerError, ManagerResult, RegistryError};
pub use reconciler::Reconciler;
pub use registry::{AddOutcome, InMemoryRegistry, NodeRegistry, PostgresRegistry};
pub use session::CoordinatorSession;
