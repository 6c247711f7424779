//! Reconcile work queue.
//!
//! FIFO of reconcile keys that holds each key at most once while it is
//! waiting. Producers are the router's entry points (synchronous, any
//! thread); the consumer is an async reconcile loop.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;
use tracing::{debug, trace};

use crate::router::EnqueueFn;

#[derive(Default)]
struct QueueState {
    items: VecDeque<String>,
    waiting: HashSet<String>,
    shut_down: bool,
}

#[derive(Default)]
pub struct ReconcileQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl ReconcileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // The critical sections never panic, so a poisoned lock still
        // holds consistent state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue `key` unless it is already waiting. Returns true if added.
    pub fn add(&self, key: String) -> bool {
        let mut state = self.lock();
        if state.shut_down {
            trace!(%key, "queue shut down, dropping key");
            return false;
        }
        if !state.waiting.insert(key.clone()) {
            trace!(%key, "key already queued");
            return false;
        }
        state.items.push_back(key);
        drop(state);
        self.notify.notify_one();
        true
    }

    /// Pop the oldest key without waiting.
    pub fn try_next(&self) -> Option<String> {
        let mut state = self.lock();
        let key = state.items.pop_front()?;
        state.waiting.remove(&key);
        Some(key)
    }

    /// Wait for the next key. Returns `None` once the queue is shut down
    /// and drained.
    pub async fn next(&self) -> Option<String> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.lock();
                if let Some(key) = state.items.pop_front() {
                    state.waiting.remove(&key);
                    return Some(key);
                }
                if state.shut_down {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Stop accepting keys and wake all waiting consumers.
    pub fn shut_down(&self) {
        self.lock().shut_down = true;
        self.notify.notify_waiters();
        debug!("reconcile queue shut down");
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enqueue callback feeding this queue, for [`PodEventRouter::new`].
    ///
    /// [`PodEventRouter::new`]: crate::router::PodEventRouter::new
    pub fn enqueue_fn(self: &Arc<Self>) -> EnqueueFn {
        let queue = self.clone();
        Arc::new(move |key| {
            queue.add(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fifo_order() {
        let queue = ReconcileQueue::new();
        queue.add("ns/a".to_string());
        queue.add("ns/b".to_string());

        assert_eq!(queue.try_next().as_deref(), Some("ns/a"));
        assert_eq!(queue.try_next().as_deref(), Some("ns/b"));
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn waiting_key_is_not_duplicated() {
        let queue = ReconcileQueue::new();
        assert!(queue.add("ns/a".to_string()));
        assert!(!queue.add("ns/a".to_string()));
        assert!(queue.add("ns/b".to_string()));
        assert_eq!(queue.len(), 2);

        queue.try_next();
        // Once popped, the same key can be queued again.
        assert!(queue.add("ns/a".to_string()));
    }

    #[test]
    fn shut_down_rejects_new_keys() {
        let queue = ReconcileQueue::new();
        queue.shut_down();
        assert!(!queue.add("ns/a".to_string()));
        assert!(queue.is_empty());
    }

    #[test]
    fn enqueue_fn_feeds_queue() {
        let queue = Arc::new(ReconcileQueue::new());
        let enqueue = queue.enqueue_fn();
        enqueue("ns/a".to_string());
        enqueue("ns/a".to_string());
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn next_waits_for_producer() {
        let queue = Arc::new(ReconcileQueue::new());
        let producer = queue.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.add("ns/late".to_string());
        });

        let key = tokio::time::timeout(Duration::from_secs(2), queue.next())
            .await
            .unwrap();
        assert_eq!(key.as_deref(), Some("ns/late"));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn next_drains_then_ends_after_shut_down() {
        let queue = Arc::new(ReconcileQueue::new());
        queue.add("ns/a".to_string());
        queue.shut_down();

        assert_eq!(queue.next().await.as_deref(), Some("ns/a"));
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn shut_down_wakes_waiting_consumer() {
        let queue = Arc::new(ReconcileQueue::new());
        let consumer = queue.clone();
        let handle = tokio::spawn(async move { consumer.next().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.shut_down();

        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn concurrent_producers() {
        use std::thread;

        let queue = Arc::new(ReconcileQueue::new());
        let mut handles = vec![];
        for t in 0..4 {
            let enqueue = queue.enqueue_fn();
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    enqueue(format!("ns/app-{t}-{i}"));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(queue.len(), 400);
    }
}
