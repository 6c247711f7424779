//! Injected metrics registry handle.
//!
//! Wraps a `prometheus::Registry` so counters are registered against an
//! explicit handle rather than a process-wide default. Cloning the handle
//! shares the underlying registry.

use prometheus::core::Collector;
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use tracing::{debug, warn};

use crate::error::{MetricsError, MetricsResult};

/// Content type of [`MetricsRegistry::render`] output.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

#[derive(Clone, Default)]
pub struct MetricsRegistry {
    inner: Registry,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter and register it.
    ///
    /// Registering the same name twice fails with
    /// [`MetricsError::AlreadyRegistered`].
    pub fn register_counter(&self, name: &str, help: &str) -> MetricsResult<IntCounter> {
        let counter = IntCounter::with_opts(Opts::new(name, help))?;
        self.register(name, &counter)?;
        Ok(counter)
    }

    /// Register a group of counters.
    ///
    /// Either every counter is registered or none is: on failure the
    /// counters registered so far are removed again before the error is
    /// returned.
    pub fn register_all(&self, counters: &[IntCounter]) -> MetricsResult<()> {
        for (idx, counter) in counters.iter().enumerate() {
            if let Err(e) = self.register(&counter_name(counter), counter) {
                for registered in &counters[..idx] {
                    if let Err(err) = self.inner.unregister(Box::new(registered.clone())) {
                        warn!(error = %err, "failed to roll back counter registration");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn register(&self, name: &str, counter: &IntCounter) -> MetricsResult<()> {
        match self.inner.register(Box::new(counter.clone())) {
            Ok(()) => {
                debug!(%name, "counter registered");
                Ok(())
            }
            Err(prometheus::Error::AlreadyReg) => {
                Err(MetricsError::AlreadyRegistered(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render(&self) -> MetricsResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.inner.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| MetricsError::Encode(e.to_string()))
    }
}

fn counter_name(counter: &IntCounter) -> String {
    counter
        .desc()
        .first()
        .map(|desc| desc.fq_name.clone())
        .unwrap_or_default()
}
