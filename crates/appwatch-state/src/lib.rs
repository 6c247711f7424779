//! appwatch-state — data model and application directory for appwatch.
//!
//! Holds the types the pod event router reads ([`Pod`],
//! [`ApplicationRecord`], [`ReconcileKey`]) and the
//! [`ApplicationDirectory`] seam through which the router resolves an
//! application by namespace and name.
//!
//! # Architecture
//!
//! ```text
//! ApplicationDirectory (trait)
//!   └── ApplicationStore (redb, JSON values, `{namespace}/{name}` keys)
//! ```
//!
//! The `ApplicationStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<Database>`) and can be shared between the router and the
//! reconciler that writes application state.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::{ApplicationDirectory, ApplicationStore};
pub use types::*;
