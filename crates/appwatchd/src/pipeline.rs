//! Pipeline assembly shared by `run` and `replay`.
//!
//! ```text
//! ApplicationStore ──► PodEventRouter ──► ReconcileQueue
//!                          │
//!                          └── PodEventCounters (when metrics are on)
//! ```

use std::sync::Arc;

use tracing::info;

use appwatch_controller::{PodEventRouter, ReconcileQueue};
use appwatch_metrics::{MetricsConfig, MetricsRegistry};
use appwatch_state::{ApplicationRecord, ApplicationStore};

/// The wired store, router and queue of one appwatch process.
pub struct Pipeline {
    pub store: ApplicationStore,
    pub queue: Arc<ReconcileQueue>,
    pub router: Arc<PodEventRouter>,
    pub registry: MetricsRegistry,
}

impl Pipeline {
    /// Wire a router over `store` that enqueues onto a fresh queue.
    ///
    /// Duplicate counter registration is a configuration error and is
    /// returned as-is.
    pub fn new(store: ApplicationStore, metrics: Option<&MetricsConfig>) -> anyhow::Result<Self> {
        let queue = Arc::new(ReconcileQueue::new());
        let registry = MetricsRegistry::new();
        let mut router = PodEventRouter::new(queue.enqueue_fn(), Arc::new(store.clone()));
        if let Some(config) = metrics {
            router = router.with_metrics(config, &registry)?;
        }
        Ok(Self {
            store,
            queue,
            router: Arc::new(router),
            registry,
        })
    }

    /// Write `applications` into the directory and return how many
    /// records it holds afterwards.
    pub fn seed(&self, applications: &[ApplicationRecord]) -> anyhow::Result<usize> {
        for app in applications {
            self.store.put_application(app)?;
        }
        let total = self.store.list_applications()?.len();
        info!(seeded = applications.len(), total, "application directory ready");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use appwatch_state::{APP_NAME_LABEL, Pod, SUBMISSION_ID_LABEL};

    #[test]
    fn seed_counts_existing_and_new_records() {
        let store = ApplicationStore::open_in_memory().unwrap();
        store
            .put_application(&ApplicationRecord::new("spark", "old", "o1"))
            .unwrap();

        let pipeline = Pipeline::new(store, None).unwrap();
        let total = pipeline
            .seed(&[ApplicationRecord::new("spark", "etl", "s1")])
            .unwrap();
        assert_eq!(total, 2);
    }

    #[test]
    fn seeded_submission_is_routed_to_queue() {
        let pipeline = Pipeline::new(ApplicationStore::open_in_memory().unwrap(), None).unwrap();
        let pod = Pod::new("spark", "etl-driver", "1")
            .with_label(APP_NAME_LABEL, "etl")
            .with_label(SUBMISSION_ID_LABEL, "s1");

        pipeline.router.on_added(&pod);
        assert!(pipeline.queue.is_empty());

        pipeline
            .seed(&[ApplicationRecord::new("spark", "etl", "s1")])
            .unwrap();
        pipeline.router.on_added(&pod);
        assert_eq!(pipeline.queue.try_next().as_deref(), Some("spark/etl"));
    }

    #[test]
    fn duplicate_metrics_prefix_fails_wiring() {
        let store = ApplicationStore::open_in_memory().unwrap();
        let config = MetricsConfig::with_prefix("dup_");
        let pipeline = Pipeline::new(store.clone(), Some(&config)).unwrap();

        let err = PodEventRouter::new(pipeline.queue.enqueue_fn(), Arc::new(store))
            .with_metrics(&config, &pipeline.registry)
            .err()
            .unwrap();
        assert!(err.to_string().contains("already registered"), "{err}");
    }
}
