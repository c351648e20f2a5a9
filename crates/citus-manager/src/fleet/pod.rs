//! Typed pod observations
//!
//! All duck typing stops here: Kubernetes pod objects are validated once,
//! at this boundary, into the tagged representations the rest of the
//! manager works with.

use k8s_openapi::api::core::v1::Pod;

/// Pod lifecycle phase as reported by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    fn parse(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => Self::Pending,
            Some("Running") => Self::Running,
            Some("Succeeded") => Self::Succeeded,
            Some("Failed") => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// A pod observed as a potential worker, derived fresh each scan or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCandidate {
    /// Pod IP, the registry key
    pub ip: String,

    /// Whether the pod carries a `Ready` condition equal to `True`
    pub ready: bool,

    /// Reported lifecycle phase
    pub phase: PodPhase,
}

impl WorkerCandidate {
    /// Strict worker test: Running, with an IP, and application-ready.
    ///
    /// The Ready condition matters because a pod can be network-reachable
    /// while its health check still fails.
    pub fn is_ready_worker(&self) -> bool {
        self.phase == PodPhase::Running && self.ready
    }

    /// Loose bootstrap test: Running with an IP, readiness not required.
    pub fn is_running(&self) -> bool {
        self.phase == PodPhase::Running
    }
}

/// Kind of an incremental pod lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Added,
    Modified,
    Deleted,
}

/// One incremental observation from the watch stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationEvent {
    /// What happened to the pod
    pub kind: EventKind,

    /// Pod IP, if the pod had one at event time
    pub ip: Option<String>,

    /// Reported lifecycle phase at event time
    pub phase: PodPhase,
}

impl ObservationEvent {
    /// The IP to register, if this event calls for a registration.
    pub fn wants_registration(&self) -> Option<&str> {
        match self.kind {
            EventKind::Added | EventKind::Modified if self.phase == PodPhase::Running => {
                self.ip.as_deref()
            }
            _ => None,
        }
    }
}

/// Extract a worker candidate from a pod, if the pod has an IP at all.
pub(crate) fn candidate_from_pod(pod: &Pod) -> Option<WorkerCandidate> {
    let status = pod.status.as_ref()?;
    let ip = status.pod_ip.clone().filter(|ip| !ip.is_empty())?;

    let ready = status
        .conditions
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|c| c.type_ == "Ready" && c.status == "True");

    Some(WorkerCandidate {
        ip,
        ready,
        phase: PodPhase::parse(status.phase.as_deref()),
    })
}

/// Convert a watch delivery into a typed observation event.
pub(crate) fn event_from_pod(kind: EventKind, pod: &Pod) -> ObservationEvent {
    let status = pod.status.as_ref();
    ObservationEvent {
        kind,
        ip: status
            .and_then(|s| s.pod_ip.clone())
            .filter(|ip| !ip.is_empty()),
        phase: PodPhase::parse(status.and_then(|s| s.phase.as_deref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{PodCondition, PodStatus};

    fn pod(phase: Option<&str>, ip: Option<&str>, ready: Option<&str>) -> Pod {
        Pod {
            status: Some(PodStatus {
                phase: phase.map(str::to_string),
                pod_ip: ip.map(str::to_string),
                conditions: ready.map(|status| {
                    vec![PodCondition {
                        type_: "Ready".to_string(),
                        status: status.to_string(),
                        ..Default::default()
                    }]
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_ready_running_pod_is_a_ready_worker() {
        let candidate = candidate_from_pod(&pod(Some("Running"), Some("10.0.0.1"), Some("True")))
            .expect("candidate");
        assert!(candidate.is_ready_worker());
        assert_eq!(candidate.ip, "10.0.0.1");
    }

    #[test]
    fn test_running_but_unready_pod_is_not_a_ready_worker() {
        let candidate = candidate_from_pod(&pod(Some("Running"), Some("10.0.0.1"), Some("False")))
            .expect("candidate");
        assert!(!candidate.is_ready_worker());
        assert!(candidate.is_running());
    }

    #[test]
    fn test_pod_without_conditions_is_not_ready() {
        let candidate =
            candidate_from_pod(&pod(Some("Running"), Some("10.0.0.1"), None)).expect("candidate");
        assert!(!candidate.ready);
    }

    #[test]
    fn test_pod_without_ip_yields_no_candidate() {
        assert!(candidate_from_pod(&pod(Some("Running"), None, Some("True"))).is_none());
        assert!(candidate_from_pod(&pod(Some("Running"), Some(""), Some("True"))).is_none());
    }

    #[test]
    fn test_unrecognized_phase_maps_to_unknown() {
        let candidate = candidate_from_pod(&pod(Some("Evicted"), Some("10.0.0.1"), Some("True")))
            .expect("candidate");
        assert_eq!(candidate.phase, PodPhase::Unknown);
        assert!(!candidate.is_ready_worker());
    }

    #[test]
    fn test_running_added_event_wants_registration() {
        let event = event_from_pod(
            EventKind::Added,
            &pod(Some("Running"), Some("10.0.0.2"), None),
        );
        assert_eq!(event.wants_registration(), Some("10.0.0.2"));
    }

    #[test]
    fn test_pending_event_wants_no_registration() {
        let event = event_from_pod(
            EventKind::Modified,
            &pod(Some("Pending"), Some("10.0.0.2"), None),
        );
        assert_eq!(event.wants_registration(), None);
    }

    #[test]
    fn test_deleted_event_wants_no_registration() {
        let event = event_from_pod(
            EventKind::Deleted,
            &pod(Some("Running"), Some("10.0.0.2"), Some("True")),
        );
        assert_eq!(event.wants_registration(), None);
    }

    #[test]
    fn test_event_without_ip_wants_no_registration() {
        let event = event_from_pod(EventKind::Added, &pod(Some("Running"), None, None));
        assert_eq!(event.wants_registration(), None);
    }
}
