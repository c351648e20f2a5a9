//! Controller wiring and steady-state loops

use std::sync::Arc;
use std::time::Duration;

use futures_util::{pin_mut, StreamExt};
use kube::Client;

use crate::config::{ManagerConfig, SyncMode};
use crate::error::ManagerResult;
use crate::fleet::FleetObserver;
use crate::probe::ReadinessFile;
use crate::reconciler::Reconciler;
use crate::registry::{NodeRegistry, PostgresRegistry};
use crate::session::CoordinatorSession;

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Unstarted,
    Connecting,
    Discovering,
    Ready,
    SteadyState,
    Terminated,
}

/// Wires the session, observer, and reconciler together and drives the
/// steady-state loop for the configured mode.
///
/// Everything runs on one logical thread of control: one coordinator
/// connection, one Kubernetes client, observations processed strictly in
/// order. An error escaping `run` means the process should exit non-zero
/// and let the orchestrator restart it; both modes reconverge from scratch
/// after a restart.
pub struct Controller {
    config: ManagerConfig,
    client: Client,
    probe: ReadinessFile,
    state: ControllerState,
}

impl Controller {
    /// Create a controller from validated configuration.
    pub fn new(config: ManagerConfig, client: Client) -> Self {
        let probe = ReadinessFile::new(&config.healthcheck_file);
        Self {
            config,
            client,
            probe,
            state: ControllerState::Unstarted,
        }
    }

    /// Run until an unrecoverable error.
    pub async fn run(mut self) -> ManagerResult<()> {
        let result = self.drive().await;
        self.transition(ControllerState::Terminated);
        result
    }

    async fn drive(&mut self) -> ManagerResult<()> {
        self.transition(ControllerState::Connecting);
        let session = CoordinatorSession::connect(&self.config.coordinator).await?;
        let registry = Arc::new(PostgresRegistry::new(
            &session,
            self.config.coordinator.worker_port,
        ));
        let reconciler = Reconciler::new(registry);
        let observer = FleetObserver::new(self.client.clone(), &self.config.fleet);

        match self.config.sync.mode {
            SyncMode::Poll => {
                // No explicit discovery: the first poll cycle covers it.
                self.transition(ControllerState::Ready);
                self.probe.mark_ready()?;
                self.run_poll(&observer, &reconciler).await
            }
            SyncMode::Watch => {
                self.transition(ControllerState::Discovering);
                let (candidates, resource_version) = observer.discover().await?;
                tracing::info!(workers = candidates.len(), "Initial discovery complete");
                reconciler.register_all(&candidates).await?;

                self.transition(ControllerState::Ready);
                self.probe.mark_ready()?;
                self.run_watch(&observer, &reconciler, resource_version)
                    .await
            }
        }
    }

    /// Poll mode: scan, diff, apply, sleep, repeat.
    async fn run_poll<R: NodeRegistry>(
        &mut self,
        observer: &FleetObserver,
        reconciler: &Reconciler<R>,
    ) -> ManagerResult<()> {
        self.transition(ControllerState::SteadyState);
        tracing::info!(
            namespace = %self.config.fleet.namespace,
            selector = %self.config.fleet.label_selector,
            interval_secs = self.config.sync.scan_interval_secs,
            "Starting periodic worker synchronization"
        );

        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.config.sync.scan_interval_secs));
        loop {
            ticker.tick().await;

            // A failed pod listing is fatal: the restarted process
            // re-diffs from scratch, so crashing loses nothing. Registry
            // errors inside the cycle are absorbed by the reconciler.
            let candidates = observer.snapshot().await?;
            let outcome = reconciler.reconcile(&candidates).await;
            tracing::debug!(
                registered = outcome.registered,
                failed = outcome.failed,
                "Synchronization cycle complete"
            );
        }
    }

    /// Stream mode: apply events in arrival order; a terminated stream
    /// forces full rediscovery before watching again.
    async fn run_watch<R: NodeRegistry>(
        &mut self,
        observer: &FleetObserver,
        reconciler: &Reconciler<R>,
        mut resource_version: String,
    ) -> ManagerResult<()> {
        self.transition(ControllerState::SteadyState);
        tracing::info!(
            namespace = %self.config.fleet.namespace,
            selector = %self.config.fleet.label_selector,
            "Starting worker pod watch"
        );

        loop {
            // Failure to create the stream is fatal.
            let events = observer.watch(&resource_version).await?;
            pin_mut!(events);

            while let Some(delivery) = events.next().await {
                match delivery {
                    Ok(event) => reconciler.apply_event(&event).await?,
                    Err(e) => {
                        tracing::warn!(error = %e, "Watch stream error");
                        break;
                    }
                }
            }

            // The server closed the stream or invalidated our position;
            // events may have been missed, so rediscover before resuming.
            tracing::info!("Watch stream ended, performing full rediscovery");
            let (candidates, next_version) = observer.discover().await?;
            reconciler.register_all(&candidates).await?;
            resource_version = next_version;
        }
    }

    fn transition(&mut self, next: ControllerState) {
        tracing::info!(from = ?self.state, to = ?next, "Controller state transition");
        self.state = next;
    }
}
