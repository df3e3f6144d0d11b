//! Unit-of-work seam shared by every store backend.

use async_trait::async_trait;
use scribe_core::{BoxFuture, Interface, ScribeResult};
use std::any::Any;
use tracing::{debug, warn};

/// An open unit of work.
///
/// Dropping a transaction without committing discards its writes.
#[async_trait]
pub trait Transaction: Send {
    /// Makes every staged write visible atomically.
    async fn commit(self: Box<Self>) -> ScribeResult<()>;

    /// Discards every staged write.
    async fn rollback(self: Box<Self>) -> ScribeResult<()>;

    /// Gives a backend access to its own concrete handle.
    fn as_any_mut(&mut self) -> &mut (dyn Any + Send);
}

/// Opens transactions against a store.
#[async_trait]
pub trait TransactionManager: Interface + Send + Sync {
    /// Begins a new transaction.
    async fn begin(&self) -> ScribeResult<Box<dyn Transaction>>;
}

/// Runs `work` inside a fresh transaction.
///
/// Commits when `work` succeeds. On failure the transaction is rolled back
/// and the original error is returned; a failed rollback is only logged.
///
/// ```ignore
/// let article = run_in_transaction(tx_manager.as_ref(), move |tx| {
///     Box::pin(async move { articles.create(tx, new_article).await })
/// })
/// .await?;
/// ```
pub async fn run_in_transaction<T, F>(manager: &dyn TransactionManager, work: F) -> ScribeResult<T>
where
    T: Send,
    F: for<'t> FnOnce(&'t mut dyn Transaction) -> BoxFuture<'t, T> + Send,
{
    let mut tx = manager.begin().await?;

    match work(tx.as_mut()).await {
        Ok(value) => {
            tx.commit().await?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback failed after {}: {}", err, rollback_err);
            }
            Err(err)
        }
    }
}
