//! Post-commit cache invalidation queue.

use super::CacheInterface;
use scribe_config::CacheConfig;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// A batch of keys to drop, with an optional completion signal.
struct InvalidationBatch {
    keys: Vec<String>,
    done: Option<oneshot::Sender<()>>,
}

/// Best-effort cache invalidation, drained by a single worker task.
///
/// Failures are logged and never reach the caller. By default
/// [`invalidate`](Self::invalidate) waits until the worker has processed
/// the batch so a caller's next read sees the store.
#[derive(Clone)]
pub struct CacheInvalidator {
    sender: mpsc::Sender<InvalidationBatch>,
    await_completion: bool,
}

impl CacheInvalidator {
    /// Spawns the worker on the current Tokio runtime.
    #[must_use]
    pub fn spawn(cache: Arc<dyn CacheInterface>, config: &CacheConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.invalidation_queue_capacity.max(1));
        tokio::spawn(run_worker(cache, receiver));

        Self {
            sender,
            await_completion: config.await_invalidation,
        }
    }

    /// Posts `keys` for deletion.
    pub async fn invalidate(&self, keys: Vec<String>) {
        if keys.is_empty() {
            return;
        }

        let (done, completed) = if self.await_completion {
            let (tx, rx) = oneshot::channel();
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        if let Err(e) = self.sender.send(InvalidationBatch { keys, done }).await {
            warn!(
                "Cache invalidation worker is gone, dropping {} key(s)",
                e.0.keys.len()
            );
            return;
        }

        if let Some(completed) = completed {
            if completed.await.is_err() {
                warn!("Cache invalidation worker stopped before finishing a batch");
            }
        }
    }
}

async fn run_worker(cache: Arc<dyn CacheInterface>, mut receiver: mpsc::Receiver<InvalidationBatch>) {
    while let Some(batch) = receiver.recv().await {
        for key in &batch.keys {
            match cache.delete(key).await {
                Ok(_) => debug!("Invalidated cache key '{}'", key),
                Err(e) => warn!("Failed to invalidate cache key '{}': {}", key, e),
            }
        }
        if let Some(done) = batch.done {
            let _ = done.send(());
        }
    }
    debug!("Cache invalidation worker stopped");
}

impl std::fmt::Debug for CacheInvalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheInvalidator")
            .field("await_completion", &self.await_completion)
            .finish_non_exhaustive()
    }
}
