//! appwatch-metrics — observability for the pod event router.
//!
//! Three monotonic counters (pod added / updated / deleted) registered
//! against an explicitly injected [`MetricsRegistry`]. When metrics are
//! disabled the router holds a [`NoopRecorder`] instead, so no counter
//! is ever created.
//!
//! # Architecture
//!
//! ```text
//! MetricsConfig ─┐
//!                ├─ PodEventCounters::register() → 3 × IntCounter
//! MetricsRegistry┘        └── EventRecorder::increment(kind)
//!
//! MetricsRegistry::render() → text/plain for the /metrics endpoint
//! ```

pub mod config;
pub mod counters;
pub mod error;
pub mod naming;
pub mod registry;

pub use config::MetricsConfig;
pub use counters::{EventRecorder, NoopRecorder, PodEventCounters, PodEventKind};
pub use error::{MetricsError, MetricsResult};
pub use naming::metric_name;
pub use registry::MetricsRegistry;
