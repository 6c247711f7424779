//! appwatchd — the appwatch daemon.
//!
//! Library half of the binary: pipeline wiring, the metrics HTTP router
//! and event replay, kept here so integration tests can drive them.

pub mod pipeline;
pub mod replay;
pub mod server;
