//! appwatch-controller — maps pod lifecycle events to application
//! reconcile keys.
//!
//! The watch layer reports pod adds, updates, and deletes. For each one
//! the [`PodEventRouter`] works out which application owns the pod,
//! drops events that belong to a superseded submission, and hands the
//! application's `namespace/name` key to an enqueue callback.
//!
//! # Components
//!
//! - **`event`** — watch payloads, including deletion tombstones
//! - **`router`** — staleness filtering and key emission
//! - **`queue`** — deduplicating reconcile work queue
//! - **`dispatch`** — async loop feeding watch events to the router
//! - **`config`** — controller config file

pub mod config;
pub mod dispatch;
pub mod event;
pub mod queue;
pub mod router;

pub use config::{ControllerConfig, StateConfig};
pub use dispatch::run_dispatcher;
pub use event::{DeletedPod, Tombstone, WatchEvent};
pub use queue::ReconcileQueue;
pub use router::{EnqueueFn, PodEventRouter, RouteOutcome};
