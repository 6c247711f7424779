//! Pod event counters and the recorder capability the router talks to.

use prometheus::{IntCounter, Opts};
use tracing::info;

use crate::config::MetricsConfig;
use crate::error::MetricsResult;
use crate::naming::metric_name;
use crate::registry::MetricsRegistry;

/// Which pod lifecycle notification is being counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PodEventKind {
    Added,
    Updated,
    Deleted,
}

impl PodEventKind {
    pub const ALL: [PodEventKind; 3] = [Self::Added, Self::Updated, Self::Deleted];

    /// Metric name suffix for this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Added => "spark_pod_added_event_count",
            Self::Updated => "spark_pod_updated_event_count",
            Self::Deleted => "spark_pod_deleted_event_count",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            Self::Added => "Spark Pod Added Event Count by the Operator",
            Self::Updated => "Spark Pod Updated Event Count by the Operator",
            Self::Deleted => "Spark Pod Deleted Event Count by the Operator",
        }
    }
}

/// Sink for pod event observations.
pub trait EventRecorder: Send + Sync {
    fn increment(&self, kind: PodEventKind);
}

/// Recorder used when metrics are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl EventRecorder for NoopRecorder {
    fn increment(&self, _kind: PodEventKind) {}
}

/// The three pod event counters.
///
/// `IntCounter` increments are atomic, so one instance is shared by all
/// router callers without extra locking.
#[derive(Clone)]
pub struct PodEventCounters {
    added: IntCounter,
    updated: IntCounter,
    deleted: IntCounter,
}

impl PodEventCounters {
    /// Create the counters and register them with `registry`.
    ///
    /// Fails if any derived name is already registered, in which case
    /// none of the three stays registered.
    pub fn register(config: &MetricsConfig, registry: &MetricsRegistry) -> MetricsResult<Self> {
        let counter = |kind: PodEventKind| {
            IntCounter::with_opts(Opts::new(
                metric_name(&config.prefix, kind.suffix()),
                kind.help(),
            ))
        };
        let counters = Self {
            added: counter(PodEventKind::Added)?,
            updated: counter(PodEventKind::Updated)?,
            deleted: counter(PodEventKind::Deleted)?,
        };
        registry.register_all(&[
            counters.added.clone(),
            counters.updated.clone(),
            counters.deleted.clone(),
        ])?;
        info!(prefix = %config.prefix, "pod event counters registered");
        Ok(counters)
    }

    fn counter(&self, kind: PodEventKind) -> &IntCounter {
        match kind {
            PodEventKind::Added => &self.added,
            PodEventKind::Updated => &self.updated,
            PodEventKind::Deleted => &self.deleted,
        }
    }

    /// Current value of one counter.
    pub fn get(&self, kind: PodEventKind) -> u64 {
        self.counter(kind).get()
    }
}

impl EventRecorder for PodEventCounters {
    fn increment(&self, kind: PodEventKind) {
        self.counter(kind).inc();
    }
}
