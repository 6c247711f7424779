//! Watch dispatch loop.
//!
//! Drains a channel of [`WatchEvent`]s into the router until the channel
//! closes or shutdown is signalled. Several loops (one per watch stream)
//! can share one router.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::event::WatchEvent;
use crate::router::PodEventRouter;

/// Run until `events` closes or `shutdown` flips. Returns the number of
/// events delivered to the router.
pub async fn run_dispatcher(
    router: Arc<PodEventRouter>,
    mut events: mpsc::Receiver<WatchEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    info!("pod event dispatcher started");
    let mut delivered = 0u64;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    debug!("watch channel closed");
                    break;
                };
                router.handle(event);
                delivered += 1;
            }
            _ = shutdown.changed() => {
                info!("pod event dispatcher shutting down");
                break;
            }
        }
    }

    info!(delivered, "pod event dispatcher stopped");
    delivered
}
