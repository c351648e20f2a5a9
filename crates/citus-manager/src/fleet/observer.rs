//! Fleet observation strategies
//!
//! One observer, two modes: a point-in-time snapshot of matching pods, or
//! an initial discovery listing followed by a live watch stream. The
//! observer owns the Kubernetes API handle; consumers only see typed
//! candidates and events.

use futures_util::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams, WatchEvent, WatchParams};
use kube::Client;

use super::pod::{candidate_from_pod, event_from_pod, EventKind, ObservationEvent, WorkerCandidate};
use crate::config::FleetConfig;

/// Produces pod-state observations for the worker fleet.
pub struct FleetObserver {
    pods: Api<Pod>,
    selector: String,
}

impl FleetObserver {
    /// Create an observer scoped to the configured namespace and selector.
    pub fn new(client: Client, config: &FleetConfig) -> Self {
        Self {
            pods: Api::namespaced(client, &config.namespace),
            selector: config.label_selector.clone(),
        }
    }

    /// Point-in-time listing of every matching pod that has an IP.
    ///
    /// Candidates carry their phase and readiness; the reconciler applies
    /// the strict Running + Ready filter when computing the desired set.
    pub async fn snapshot(&self) -> Result<Vec<WorkerCandidate>, kube::Error> {
        let list = self
            .pods
            .list(&ListParams::default().labels(&self.selector))
            .await?;

        Ok(list.items.iter().filter_map(candidate_from_pod).collect())
    }

    /// Full bootstrap listing for stream mode.
    ///
    /// Looser than `snapshot`: any Running pod with an IP counts, readiness
    /// not required, so stale-but-running workers are captured before the
    /// watch starts. Also returns the resource version the follow-up watch
    /// must resume from.
    pub async fn discover(&self) -> Result<(Vec<WorkerCandidate>, String), kube::Error> {
        let list = self
            .pods
            .list(&ListParams::default().labels(&self.selector))
            .await?;

        let resource_version = list.metadata.resource_version.clone().unwrap_or_default();
        let candidates = list
            .items
            .iter()
            .filter_map(candidate_from_pod)
            .filter(WorkerCandidate::is_running)
            .collect();

        Ok((candidates, resource_version))
    }

    /// Live event stream, starting after `resource_version`.
    ///
    /// The stream ends when the server closes the connection; an in-band
    /// error (e.g. the resource version expired) is surfaced as an `Err`
    /// item. Either way the caller must rediscover before watching again —
    /// a terminated stream is a signal, never a silently-missed event.
    pub async fn watch(
        &self,
        resource_version: &str,
    ) -> Result<impl Stream<Item = Result<ObservationEvent, kube::Error>> + '_, kube::Error> {
        let params = WatchParams::default().labels(&self.selector);
        let events = self.pods.watch(&params, resource_version).await?;

        Ok(events.filter_map(|delivery| async move {
            match delivery {
                Ok(WatchEvent::Added(pod)) => Some(Ok(event_from_pod(EventKind::Added, &pod))),
                Ok(WatchEvent::Modified(pod)) => {
                    Some(Ok(event_from_pod(EventKind::Modified, &pod)))
                }
                Ok(WatchEvent::Deleted(pod)) => Some(Ok(event_from_pod(EventKind::Deleted, &pod))),
                Ok(WatchEvent::Bookmark(_)) => None,
                Ok(WatchEvent::Error(e)) => Some(Err(kube::Error::Api(e))),
                Err(e) => Some(Err(e)),
            }
        }))
    }
}
