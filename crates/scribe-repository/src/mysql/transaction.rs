//! MySQL transactions.

use crate::{DatabasePoolInterface, Transaction, TransactionManager};
use async_trait::async_trait;
use scribe_core::{ScribeError, ScribeResult};
use sqlx::mysql::MySqlConnection;
use sqlx::MySql;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// A transaction on a pooled MySQL connection.
pub struct MySqlTransaction {
    inner: sqlx::Transaction<'static, MySql>,
}

impl MySqlTransaction {
    /// Recovers the MySQL handle from a generic transaction.
    pub(crate) fn downcast(tx: &mut dyn Transaction) -> ScribeResult<&mut Self> {
        tx.as_any_mut()
            .downcast_mut::<Self>()
            .ok_or_else(|| ScribeError::internal("Transaction was not opened by the MySQL store"))
    }

    /// Returns the connection the transaction runs on.
    pub(crate) fn connection(&mut self) -> &mut MySqlConnection {
        &mut *self.inner
    }
}

#[async_trait]
impl Transaction for MySqlTransaction {
    async fn commit(self: Box<Self>) -> ScribeResult<()> {
        self.inner.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> ScribeResult<()> {
        self.inner.rollback().await?;
        debug!("MySQL transaction rolled back");
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut (dyn Any + Send) {
        self
    }
}

impl std::fmt::Debug for MySqlTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlTransaction").finish_non_exhaustive()
    }
}

/// Opens transactions on the shared pool.
#[derive(Clone)]
pub struct MySqlTransactionManager {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlTransactionManager {
    /// Creates a new transaction manager.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for MySqlTransactionManager {
    async fn begin(&self) -> ScribeResult<Box<dyn Transaction>> {
        let inner = self.pool.inner().begin().await?;
        Ok(Box::new(MySqlTransaction { inner }))
    }
}

impl std::fmt::Debug for MySqlTransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlTransactionManager").finish_non_exhaustive()
    }
}
