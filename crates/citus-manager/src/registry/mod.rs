//! Worker registry layer
//!
//! Read/write access to the coordinator's node-membership table, behind a
//! trait so the reconciler can be exercised against an in-memory
//! implementation.

mod memory;
mod postgres;
mod traits;

pub use memory::InMemoryRegistry;
pub use postgres::PostgresRegistry;
pub use traits::{AddOutcome, NodeRegistry};
