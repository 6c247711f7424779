//! Pod event router — turns pod notifications into reconcile keys.
//!
//! Every entry point is synchronous, never fails, and may be called from
//! many threads at once. A dropped event only delays convergence: the
//! reconciler resyncs every application periodically.

use std::sync::Arc;

use tracing::{debug, trace};

use appwatch_metrics::{
    EventRecorder, MetricsConfig, MetricsRegistry, MetricsResult, NoopRecorder, PodEventCounters,
    PodEventKind,
};
use appwatch_state::{ApplicationDirectory, Pod, ReconcileKey};

use crate::event::{DeletedPod, WatchEvent};

/// Callback receiving `namespace/name` keys. Must return quickly and must
/// not call back into the router.
pub type EnqueueFn = Arc<dyn Fn(String) + Send + Sync>;

/// What the router decided for one pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The key was handed to the enqueue callback.
    Enqueued(ReconcileKey),
    /// The pod has no application-name label.
    Unlabeled,
    /// The pod belongs to a submission the application has moved past,
    /// or the application no longer exists.
    Stale,
    /// The directory lookup failed.
    LookupFailed,
}

impl RouteOutcome {
    /// Whether the pod belongs to an application at all.
    pub fn is_tracked(&self) -> bool {
        !matches!(self, Self::Unlabeled)
    }
}

pub struct PodEventRouter {
    directory: Arc<dyn ApplicationDirectory>,
    recorder: Arc<dyn EventRecorder>,
    enqueue: EnqueueFn,
}

impl PodEventRouter {
    /// Create a router with metrics disabled.
    pub fn new(enqueue: EnqueueFn, directory: Arc<dyn ApplicationDirectory>) -> Self {
        Self {
            directory,
            recorder: Arc::new(NoopRecorder),
            enqueue,
        }
    }

    /// Create the pod event counters and register them with `registry`.
    pub fn with_metrics(
        self,
        config: &MetricsConfig,
        registry: &MetricsRegistry,
    ) -> MetricsResult<Self> {
        let counters = PodEventCounters::register(config, registry)?;
        Ok(self.with_recorder(Arc::new(counters)))
    }

    /// Replace the event recorder.
    pub fn with_recorder(mut self, recorder: Arc<dyn EventRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn on_added(&self, pod: &Pod) {
        debug!(namespace = %pod.namespace, pod = %pod.name, "pod added");
        self.observe(pod, PodEventKind::Added);
    }

    pub fn on_updated(&self, old: &Pod, new: &Pod) {
        if old.resource_version == new.resource_version {
            // Periodic resync, nothing changed.
            return;
        }
        debug!(namespace = %new.namespace, pod = %new.name, "pod updated");
        self.observe(new, PodEventKind::Updated);
    }

    pub fn on_deleted(&self, deleted: DeletedPod) {
        let Some(pod) = deleted.into_pod() else {
            trace!("deletion tombstone without last known state");
            return;
        };
        debug!(namespace = %pod.namespace, pod = %pod.name, "pod deleted");
        self.observe(&pod, PodEventKind::Deleted);
    }

    /// Deliver one watch notification to the matching entry point.
    pub fn handle(&self, event: WatchEvent) {
        match event {
            WatchEvent::Added { pod } => self.on_added(&pod),
            WatchEvent::Updated { old, new } => self.on_updated(&old, &new),
            WatchEvent::Deleted { object } => self.on_deleted(object),
        }
    }

    fn observe(&self, pod: &Pod, kind: PodEventKind) {
        if self.route(pod).is_tracked() {
            self.recorder.increment(kind);
        }
    }

    /// Resolve the owning application and enqueue its key if the pod is
    /// current.
    pub fn route(&self, pod: &Pod) -> RouteOutcome {
        let Some(app_name) = pod.app_name() else {
            return RouteOutcome::Unlabeled;
        };

        if let Some(submission_id) = pod.submission_id() {
            match self.directory.get(&pod.namespace, app_name) {
                Ok(Some(app)) if app.submission_id == submission_id => {}
                Ok(Some(app)) => {
                    trace!(
                        namespace = %pod.namespace,
                        app = %app_name,
                        pod_submission = %submission_id,
                        current_submission = %app.submission_id,
                        "ignoring pod from superseded submission"
                    );
                    return RouteOutcome::Stale;
                }
                Ok(None) => {
                    trace!(namespace = %pod.namespace, app = %app_name, "application not found");
                    return RouteOutcome::Stale;
                }
                Err(e) => {
                    debug!(
                        namespace = %pod.namespace,
                        app = %app_name,
                        error = %e,
                        "application lookup failed, dropping pod event"
                    );
                    return RouteOutcome::LookupFailed;
                }
            }
        }

        let key = ReconcileKey::new(&pod.namespace, app_name);
        debug!(%key, "enqueuing application for update processing");
        (self.enqueue)(key.to_string());
        RouteOutcome::Enqueued(key)
    }
}
