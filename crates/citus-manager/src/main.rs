//! Citus worker manager - registry synchronization daemon
//!
//! Keeps the coordinator's worker membership table consistent with the
//! live set of worker pods: connects to the coordinator, observes the
//! fleet (periodic scan or live watch), and applies idempotent
//! registration mutations.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use citus_manager::config::{Cli, ManagerConfig};
use citus_manager::controller::Controller;
use citus_manager::error::ManagerResult;
use citus_manager::probe::ReadinessFile;

#[tokio::main]
async fn main() -> ManagerResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Validated before any coordinator or Kubernetes client is built.
    let config = ManagerConfig::from_cli(&cli)?;

    // A marker surviving a crash would signal ready before we are.
    ReadinessFile::new(&config.healthcheck_file).clear()?;

    let client = kube::Client::try_default()
        .await
        .map_err(citus_manager::ManagerError::Orchestrator)?;

    let controller = Controller::new(config, client);

    tokio::select! {
        result = controller.run() => {
            if let Err(e) = &result {
                tracing::error!(error = %e, "Controller terminated");
            }
            result
        }
        _ = shutdown_signal() => {
            // Every mutation is a single atomic statement; nothing to drain.
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
