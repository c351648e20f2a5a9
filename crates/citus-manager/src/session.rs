//! Coordinator connection lifecycle

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::CoordinatorConfig;
use crate::error::{ManagerError, ManagerResult};

/// How long to sleep between failed connection attempts.
const RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// The single connection to the Citus coordinator.
///
/// Exclusively owns the pool; every other component borrows the session and
/// never manages its lifecycle. Each statement runs in its own implicit
/// transaction, which is all the controller needs since every mutation is a
/// single idempotent statement.
pub struct CoordinatorSession {
    pool: PgPool,
}

impl CoordinatorSession {
    /// Connect to the coordinator, retrying transient failures forever.
    ///
    /// There is no timeout: the manager has no useful degraded mode without
    /// a coordinator connection, so it keeps trying until the coordinator
    /// becomes resolvable and reachable. Non-transient errors (bad
    /// credentials, malformed options) propagate immediately.
    pub async fn connect(config: &CoordinatorConfig) -> ManagerResult<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        loop {
            match PgPoolOptions::new()
                .max_connections(1)
                .connect_with(options.clone())
                .await
            {
                Ok(pool) => {
                    tracing::info!(host = %config.host, "Connected to coordinator");
                    return Ok(Self { pool });
                }
                Err(e) if is_transient(&e) => {
                    tracing::warn!(
                        host = %config.host,
                        error = %e,
                        "Could not connect to coordinator, retrying"
                    );
                    tokio::time::sleep(RETRY_INTERVAL).await;
                }
                Err(e) => return Err(ManagerError::Coordinator(e.to_string())),
            }
        }
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connectivity failures worth retrying: the coordinator pod may simply not
/// be scheduled or resolvable yet. Anything the server actively rejected
/// (auth failure, unknown database) is not going to fix itself.
fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_transient() {
        let err = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert!(is_transient(&err));
    }

    #[test]
    fn test_row_not_found_is_not_transient() {
        assert!(!is_transient(&sqlx::Error::RowNotFound));
    }
}
