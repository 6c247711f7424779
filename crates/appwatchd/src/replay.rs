//! Event replay — drives recorded watch events through the router.
//!
//! Input is a JSON-lines file of [`WatchEvent`]s and, optionally, a JSON
//! array of [`ApplicationRecord`]s seeding an in-memory directory. The
//! output is the sequence of keys the reconcile queue would hand out.

use std::path::Path;

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tracing::info;

use appwatch_controller::{WatchEvent, run_dispatcher};
use appwatch_metrics::MetricsConfig;
use appwatch_state::{ApplicationRecord, ApplicationStore};

use crate::pipeline::Pipeline;

/// Result of one replay run.
#[derive(Debug)]
pub struct ReplayReport {
    /// Events delivered to the router.
    pub delivered: u64,
    /// Distinct keys left on the queue, oldest first.
    pub keys: Vec<String>,
    /// Exposition text, when metrics were enabled.
    pub metrics: Option<String>,
}

/// Parse a JSON-lines event file. Blank lines are skipped.
pub fn read_events(path: &Path) -> anyhow::Result<Vec<WatchEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading events from {}", path.display()))?;
    parse_events(&content)
}

pub fn parse_events(content: &str) -> anyhow::Result<Vec<WatchEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid event on line {}", idx + 1))
        })
        .collect()
}

/// Parse a JSON array of application records.
pub fn read_applications(path: &Path) -> anyhow::Result<Vec<ApplicationRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading applications from {}", path.display()))?;
    serde_json::from_str(&content).context("invalid application records")
}

/// Replay `events` against a directory holding `applications`.
pub async fn replay(
    events: Vec<WatchEvent>,
    applications: &[ApplicationRecord],
    metrics: Option<&MetricsConfig>,
) -> anyhow::Result<ReplayReport> {
    let pipeline = Pipeline::new(ApplicationStore::open_in_memory()?, metrics)?;
    pipeline.seed(applications)?;

    let (tx, rx) = mpsc::channel(64);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher = tokio::spawn(run_dispatcher(pipeline.router.clone(), rx, shutdown_rx));

    for event in events {
        tx.send(event).await.context("dispatcher stopped early")?;
    }
    drop(tx);

    let delivered = dispatcher.await?;
    pipeline.queue.shut_down();
    let keys: Vec<String> = std::iter::from_fn(|| pipeline.queue.try_next()).collect();

    let metrics = match metrics {
        Some(_) => Some(pipeline.registry.render()?),
        None => None,
    };

    info!(delivered, keys = keys.len(), "replay finished");
    Ok(ReplayReport {
        delivered,
        keys,
        metrics,
    })
}
