//! appwatchd — the appwatch daemon.
//!
//! Assembles the pod event pipeline:
//! - Application store (redb)
//! - Pod event router + reconcile queue
//! - Watch dispatcher
//! - Metrics endpoint (when `[metrics]` is configured)
//!
//! # Usage
//!
//! ```text
//! appwatchd run --config /etc/appwatch/appwatch.toml --apps apps.json --events pods.jsonl
//! appwatchd replay --events pods.jsonl --apps apps.json --metrics-prefix spark_
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use appwatch_controller::{ControllerConfig, run_dispatcher};
use appwatch_metrics::MetricsConfig;
use appwatch_state::{ApplicationStore, ReconcileKey};
use appwatchd::pipeline::Pipeline;
use appwatchd::{replay, server};

#[derive(Parser)]
#[command(name = "appwatchd", about = "appwatch pod event daemon")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pod event pipeline against the persistent application store.
    Run {
        /// Path to appwatch.toml.
        #[arg(long, default_value = "/etc/appwatch/appwatch.toml")]
        config: PathBuf,

        /// JSON array of application records to write into the store
        /// before any event is routed.
        #[arg(long)]
        apps: Option<PathBuf>,

        /// JSON-lines file of watch events to feed. Without it the
        /// daemon idles until Ctrl-C.
        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// Replay recorded events against an in-memory store and print the
    /// resulting reconcile keys.
    Replay {
        /// JSON-lines file of watch events.
        #[arg(long)]
        events: PathBuf,

        /// JSON array of application records to seed the store with.
        #[arg(long)]
        apps: Option<PathBuf>,

        /// Enable metrics with this name prefix and print the exposition.
        #[arg(long)]
        metrics_prefix: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Command::Run {
            config,
            apps,
            events,
        } => run(config, apps, events).await,
        Command::Replay {
            events,
            apps,
            metrics_prefix,
        } => run_replay(events, apps, metrics_prefix).await,
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,appwatchd=debug,appwatch=debug".into());
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_replay(
    events: PathBuf,
    apps: Option<PathBuf>,
    metrics_prefix: Option<String>,
) -> anyhow::Result<()> {
    let events = replay::read_events(&events)?;
    let apps = match apps {
        Some(path) => replay::read_applications(&path)?,
        None => Vec::new(),
    };
    let metrics = metrics_prefix.as_deref().map(MetricsConfig::with_prefix);

    let report = replay::replay(events, &apps, metrics.as_ref()).await?;
    for key in &report.keys {
        println!("{key}");
    }
    if let Some(exposition) = report.metrics {
        print!("{exposition}");
    }
    Ok(())
}

async fn run(
    config_path: PathBuf,
    apps: Option<PathBuf>,
    events: Option<PathBuf>,
) -> anyhow::Result<()> {
    info!("appwatch daemon starting");

    let config = ControllerConfig::from_file(&config_path)?;
    info!(path = ?config_path, metrics = config.metrics.is_some(), "config loaded");

    // ── Subsystems ─────────────────────────────────────────────

    std::fs::create_dir_all(&config.state.data_dir)?;
    let db_path = config.db_path();
    let store = ApplicationStore::open(&db_path)?;
    info!(path = ?db_path, "application store opened");

    // Duplicate registration is a configuration error: fail startup.
    let pipeline = Pipeline::new(store, config.metrics.as_ref())?;
    let apps = match apps {
        Some(path) => replay::read_applications(&path)?,
        None => Vec::new(),
    };
    pipeline.seed(&apps)?;

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Background tasks ───────────────────────────────────────

    let (event_tx, event_rx) = mpsc::channel(256);
    let dispatcher = tokio::spawn(run_dispatcher(
        pipeline.router.clone(),
        event_rx,
        shutdown_rx.clone(),
    ));

    let feeder = match events {
        Some(path) => {
            let events = replay::read_events(&path)?;
            info!(path = ?path, count = events.len(), "feeding recorded events");
            tokio::spawn(async move {
                for event in events {
                    if event_tx.send(event).await.is_err() {
                        break;
                    }
                }
            })
        }
        None => {
            // Keep the channel open until shutdown.
            let mut shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                let _ = shutdown.changed().await;
                drop(event_tx);
            })
        }
    };

    let consumer_queue = pipeline.queue.clone();
    let consumer_store = pipeline.store.clone();
    let consumer = tokio::spawn(async move {
        while let Some(key) = consumer_queue.next().await {
            match ReconcileKey::parse(&key) {
                Ok(parsed) => {
                    let record = consumer_store.get_application(&parsed.to_string());
                    match record {
                        Ok(Some(app)) => info!(
                            %key,
                            submission_id = %app.submission_id,
                            "application due for reconciliation"
                        ),
                        Ok(None) => debug!(%key, "application no longer exists"),
                        Err(e) => warn!(%key, error = %e, "application lookup failed"),
                    }
                }
                Err(e) => warn!(%key, error = %e, "malformed reconcile key"),
            }
        }
    });

    let server = match &config.metrics {
        Some(metrics) => {
            let router = server::metrics_router(pipeline.registry.clone(), &metrics.endpoint);
            let addr = SocketAddr::from(([0, 0, 0, 0], metrics.port));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, endpoint = %metrics.endpoint, "metrics endpoint listening");
            let mut shutdown = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                let result = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.changed().await;
                    })
                    .await;
                if let Err(e) = result {
                    warn!(error = %e, "metrics endpoint stopped with error");
                }
            }))
        }
        None => None,
    };

    // ── Wait for input to end or Ctrl-C ────────────────────────

    tokio::select! {
        delivered = dispatcher => {
            info!(delivered = delivered.unwrap_or_default(), "event input exhausted");
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
            info!("shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    pipeline.queue.shut_down();

    let _ = feeder.await;
    let _ = consumer.await;
    if let Some(server) = server {
        let _ = server.await;
    }

    info!("appwatch daemon stopped");
    Ok(())
}
