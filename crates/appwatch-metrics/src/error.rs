//! Metrics error types.

use thiserror::Error;

/// Errors raised while creating, registering, or exporting metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A collector with the same name is already registered. Treated as a
    /// fatal configuration error by the process wiring the registry.
    #[error("metric already registered: {0}")]
    AlreadyRegistered(String),

    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// The exposition endpoint is not an absolute HTTP path.
    #[error("metrics endpoint must start with '/': {0:?}")]
    InvalidEndpoint(String),

    #[error("failed to encode metrics: {0}")]
    Encode(String),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
