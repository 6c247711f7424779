//! appwatch.toml configuration parser.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use appwatch_metrics::MetricsConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControllerConfig {
    #[serde(default)]
    pub state: StateConfig,
    /// Absent table means metrics are disabled.
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/appwatch")
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl ControllerConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        if let Some(metrics) = &config.metrics {
            metrics.validate()?;
        }
        Ok(config)
    }

    /// Path of the application database inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.state.data_dir.join("appwatch.redb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_disables_metrics() {
        let config = ControllerConfig::parse("").unwrap();
        assert!(config.metrics.is_none());
        assert_eq!(config.state.data_dir, PathBuf::from("/var/lib/appwatch"));
    }

    #[test]
    fn parse_full() {
        let config = ControllerConfig::parse(
            r#"
[state]
data_dir = "/tmp/appwatch"

[metrics]
prefix = "spark_operator_"
port = 9100
"#,
        )
        .unwrap();

        assert_eq!(config.db_path(), PathBuf::from("/tmp/appwatch/appwatch.redb"));
        let metrics = config.metrics.unwrap();
        assert_eq!(metrics.prefix, "spark_operator_");
        assert_eq!(metrics.port, 9100);
        assert_eq!(metrics.endpoint, "/metrics");
    }

    #[test]
    fn empty_metrics_table_enables_defaults() {
        let config = ControllerConfig::parse("[metrics]\n").unwrap();
        assert_eq!(config.metrics, Some(MetricsConfig::default()));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appwatch.toml");
        std::fs::write(
            &path,
            format!(
                "[state]\ndata_dir = {:?}\n\n[metrics]\nprefix = \"x_\"\n",
                dir.path().display().to_string()
            ),
        )
        .unwrap();

        let config = ControllerConfig::from_file(&path).unwrap();
        assert_eq!(config.state.data_dir, dir.path());
        assert_eq!(config.metrics, Some(MetricsConfig::with_prefix("x_")));
    }

    #[test]
    fn metrics_endpoint_without_leading_slash_is_rejected() {
        let err = ControllerConfig::parse("[metrics]\nendpoint = \"metrics\"\n").unwrap_err();
        assert!(err.to_string().contains("must start with '/'"), "{err}");
        assert!(ControllerConfig::parse("[metrics]\nendpoint = \"\"\n").is_err());
    }

    #[test]
    fn endpoint_is_not_checked_when_metrics_are_disabled() {
        assert!(ControllerConfig::parse("[state]\ndata_dir = \"/tmp\"\n").is_ok());
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(ControllerConfig::parse("[metrics]\nport = \"high\"").is_err());
    }
}
