//! Configuration for the manager

use std::path::PathBuf;

use clap::Parser;

use crate::error::{ManagerError, ManagerResult};

/// Default readiness marker path, shared with the pod's probe spec.
pub const DEFAULT_HEALTHCHECK_FILE: &str = "/healthcheck/manager-ready";

/// Citus worker manager CLI
#[derive(Debug, Parser)]
#[command(name = "citus-managerd")]
#[command(about = "Keeps the Citus worker registry in sync with Kubernetes pods", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Citus coordinator hostname
    #[arg(long, env = "CITUS_HOST")]
    pub coordinator_host: String,

    /// PostgreSQL user
    #[arg(long, env = "POSTGRES_USER")]
    pub postgres_user: String,

    /// PostgreSQL password
    #[arg(long, env = "POSTGRES_PASSWORD")]
    pub postgres_password: String,

    /// PostgreSQL database
    #[arg(long, env = "POSTGRES_DB")]
    pub postgres_db: String,

    /// Port workers listen on, also the registry key
    #[arg(long, env = "CITUS_WORKER_PORT", default_value_t = 5432)]
    pub worker_port: u16,

    /// Namespace the worker pods live in
    #[arg(long, env = "POD_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Label selector identifying worker pods
    #[arg(long, env = "LABEL_SELECTOR")]
    pub label_selector: Option<String>,

    /// Synchronization mode
    #[arg(long, env = "SYNC_MODE", default_value = "poll")]
    pub mode: String,

    /// Seconds between poll-mode scans
    #[arg(long, env = "SCAN_INTERVAL_SECONDS", default_value_t = 20)]
    pub scan_interval_secs: u64,

    /// Readiness marker file path
    #[arg(long, env = "HEALTHCHECK_FILE", default_value = DEFAULT_HEALTHCHECK_FILE)]
    pub healthcheck_file: PathBuf,

    /// Log level
    #[arg(long, env = "MANAGER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "MANAGER_LOG_JSON")]
    pub json: bool,
}

/// Main manager configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Coordinator connection configuration
    pub coordinator: CoordinatorConfig,

    /// Worker fleet observation configuration
    pub fleet: FleetConfig,

    /// Steady-state synchronization configuration
    pub sync: SyncConfig,

    /// Readiness marker file path
    pub healthcheck_file: PathBuf,
}

/// Coordinator connection configuration
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Coordinator hostname
    pub host: String,

    /// PostgreSQL user
    pub user: String,

    /// PostgreSQL password
    pub password: String,

    /// PostgreSQL database
    pub database: String,

    /// Port workers are registered at
    pub worker_port: u16,
}

/// Worker fleet observation configuration
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Namespace to watch
    pub namespace: String,

    /// Label selector identifying worker pods
    pub label_selector: String,
}

/// Steady-state synchronization configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Observation strategy
    pub mode: SyncMode,

    /// Seconds between poll-mode scans
    pub scan_interval_secs: u64,
}

/// Observation strategy for the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Periodic full scan and diff
    Poll,

    /// Initial discovery followed by a live event stream
    Watch,
}

impl ManagerConfig {
    /// Fold CLI/environment input into a validated configuration.
    ///
    /// An unset label selector is a fatal startup error; without it the
    /// manager cannot tell worker pods apart from anything else in the
    /// namespace.
    pub fn from_cli(cli: &Cli) -> ManagerResult<Self> {
        let label_selector = match cli.label_selector.as_deref() {
            Some(selector) if !selector.trim().is_empty() => selector.to_string(),
            _ => {
                return Err(ManagerError::Config(
                    "LABEL_SELECTOR must be set to be able to find worker pods".to_string(),
                ));
            }
        };

        let mode = match cli.mode.to_lowercase().as_str() {
            "poll" => SyncMode::Poll,
            "watch" => SyncMode::Watch,
            other => {
                return Err(ManagerError::Config(format!(
                    "Unknown sync mode: {other} (expected poll or watch)"
                )));
            }
        };

        Ok(Self {
            coordinator: CoordinatorConfig {
                host: cli.coordinator_host.clone(),
                user: cli.postgres_user.clone(),
                password: cli.postgres_password.clone(),
                database: cli.postgres_db.clone(),
                worker_port: cli.worker_port,
            },
            fleet: FleetConfig {
                namespace: cli.namespace.clone(),
                label_selector,
            },
            sync: SyncConfig {
                mode,
                scan_interval_secs: cli.scan_interval_secs,
            },
            healthcheck_file: cli.healthcheck_file.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "citus-managerd",
            "--coordinator-host",
            "citus-master",
            "--postgres-user",
            "postgres",
            "--postgres-password",
            "secret",
            "--postgres-db",
            "citus",
        ]
    }

    #[test]
    fn test_missing_selector_is_fatal() {
        let cli = Cli::try_parse_from(base_args()).unwrap();
        let err = ManagerConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, ManagerError::Config(_)));
    }

    #[test]
    fn test_blank_selector_is_fatal() {
        let mut args = base_args();
        args.extend(["--label-selector", "  "]);
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(ManagerConfig::from_cli(&cli).is_err());
    }

    #[test]
    fn test_defaults() {
        let mut args = base_args();
        args.extend(["--label-selector", "app=citus-worker"]);
        let cli = Cli::try_parse_from(args).unwrap();
        let config = ManagerConfig::from_cli(&cli).unwrap();

        assert_eq!(config.sync.mode, SyncMode::Poll);
        assert_eq!(config.sync.scan_interval_secs, 20);
        assert_eq!(config.coordinator.worker_port, 5432);
        assert_eq!(config.fleet.namespace, "default");
        assert_eq!(
            config.healthcheck_file,
            PathBuf::from(DEFAULT_HEALTHCHECK_FILE)
        );
    }

    #[test]
    fn test_watch_mode_parses() {
        let mut args = base_args();
        args.extend(["--label-selector", "app=citus-worker", "--mode", "watch"]);
        let cli = Cli::try_parse_from(args).unwrap();
        let config = ManagerConfig::from_cli(&cli).unwrap();
        assert_eq!(config.sync.mode, SyncMode::Watch);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let mut args = base_args();
        args.extend(["--label-selector", "app=citus-worker", "--mode", "stream"]);
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(ManagerConfig::from_cli(&cli).is_err());
    }
}
