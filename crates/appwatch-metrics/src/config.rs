//! Metrics configuration (the `[metrics]` table of the controller config).

use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, MetricsResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Prepended to every exported metric name.
    #[serde(default)]
    pub prefix: String,
    /// HTTP path the exposition is served on.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Port of the exposition listener.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_endpoint() -> String {
    "/metrics".to_string()
}

fn default_port() -> u16 {
    10254
}

impl MetricsConfig {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Default::default()
        }
    }

    /// Reject settings the exposition server cannot serve.
    pub fn validate(&self) -> MetricsResult<()> {
        if !self.endpoint.starts_with('/') {
            return Err(MetricsError::InvalidEndpoint(self.endpoint.clone()));
        }
        Ok(())
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            endpoint: default_endpoint(),
            port: default_port(),
        }
    }
}
