//! Citus-backed registry implementation

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::traits::{AddOutcome, NodeRegistry};
use crate::error::{RegistryError, RegistryResult};
use crate::session::CoordinatorSession;

/// Worker registry backed by the coordinator's `pg_dist_node` table.
#[derive(Debug, Clone)]
pub struct PostgresRegistry {
    pool: PgPool,
    worker_port: u16,
}

impl PostgresRegistry {
    /// Create a registry over an established coordinator session.
    pub fn new(session: &CoordinatorSession, worker_port: u16) -> Self {
        Self {
            pool: session.pool().clone(),
            worker_port,
        }
    }
}

#[async_trait]
impl NodeRegistry for PostgresRegistry {
    async fn list_nodes(&self) -> RegistryResult<HashSet<String>> {
        let rows = sqlx::query("SELECT nodename FROM pg_dist_node WHERE nodeport = $1")
            .bind(i32::from(self.worker_port))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RegistryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("nodename")
                    .map_err(|e| RegistryError::Query(e.to_string()))
            })
            .collect()
    }

    async fn add_node(&self, ip: &str) -> RegistryResult<AddOutcome> {
        // master_add_node errors on duplicates, so check existence first.
        // The manager is the only writer, which makes the check-then-act
        // race benign; a duplicate slipping through is still mapped to
        // AlreadyRegistered below.
        let existing =
            sqlx::query("SELECT nodeid FROM pg_dist_node WHERE nodename = $1 AND nodeport = $2")
                .bind(ip)
                .bind(i32::from(self.worker_port))
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RegistryError::Query(e.to_string()))?;

        if existing.is_some() {
            return Ok(AddOutcome::AlreadyRegistered);
        }

        match sqlx::query("SELECT master_add_node($1, $2)")
            .bind(ip)
            .bind(i32::from(self.worker_port))
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(AddOutcome::Registered),
            Err(e) if is_duplicate(&e) => Ok(AddOutcome::AlreadyRegistered),
            Err(e) => Err(RegistryError::Mutation(e.to_string())),
        }
    }
}

/// Duplicate registrations surface either as a unique violation or as a
/// Citus "already exists" error.
fn is_duplicate(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some("23505") || db.message().contains("already exists")
        }
        _ => false,
    }
}
