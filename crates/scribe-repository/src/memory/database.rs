//! Shared state and transactions for the in-memory store.

use crate::{Transaction, TransactionManager};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use scribe_core::{Article, ArticleId, ScribeError, ScribeResult, User, UserId};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Committed rows. Soft-deleted rows stay in the maps.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) articles: BTreeMap<ArticleId, Article>,
}

/// A write staged by a transaction.
#[derive(Debug, Clone)]
pub(crate) enum PendingWrite {
    InsertUser(User),
    UpdateUser(User),
    SoftDeleteUser(UserId, DateTime<Utc>),
    InsertArticle(Article),
    UpdateArticle(Article),
    SoftDeleteArticle(ArticleId, DateTime<Utc>),
}

impl MemoryState {
    pub(crate) fn live_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id).filter(|u| !u.is_deleted())
    }

    pub(crate) fn live_article(&self, id: ArticleId) -> Option<&Article> {
        self.articles.get(&id).filter(|a| !a.is_deleted())
    }

    /// Returns a live article with its live author attached.
    pub(crate) fn joined(&self, article: &Article) -> Article {
        article
            .clone()
            .with_author(self.live_user(article.author_id).cloned())
    }

    fn apply(&mut self, write: &PendingWrite) -> ScribeResult<()> {
        match write {
            PendingWrite::InsertUser(user) => {
                if self.users.contains_key(&user.id) {
                    return Err(ScribeError::already_exists(format!("User {} already exists", user.id)));
                }
                self.users.insert(user.id, user.clone());
            }
            PendingWrite::UpdateUser(user) => {
                let row = self
                    .users
                    .get_mut(&user.id)
                    .filter(|u| !u.is_deleted())
                    .ok_or_else(|| ScribeError::not_found("User", user.id))?;
                row.email.clone_from(&user.email);
                row.name.clone_from(&user.name);
                row.password_hash.clone_from(&user.password_hash);
                row.updated_at = user.updated_at;
            }
            PendingWrite::SoftDeleteUser(id, at) => {
                let row = self
                    .users
                    .get_mut(id)
                    .filter(|u| !u.is_deleted())
                    .ok_or_else(|| ScribeError::not_found("User", id))?;
                row.deleted_at = Some(*at);
                row.updated_at = *at;
            }
            PendingWrite::InsertArticle(article) => {
                if self.articles.contains_key(&article.id) {
                    return Err(ScribeError::already_exists(format!(
                        "Article {} already exists",
                        article.id
                    )));
                }
                self.articles.insert(article.id, article.clone());
            }
            PendingWrite::UpdateArticle(article) => {
                let row = self
                    .articles
                    .get_mut(&article.id)
                    .filter(|a| !a.is_deleted())
                    .ok_or_else(|| ScribeError::not_found("Article", article.id))?;
                row.title.clone_from(&article.title);
                row.body.clone_from(&article.body);
                row.updated_at = article.updated_at;
            }
            PendingWrite::SoftDeleteArticle(id, at) => {
                let row = self
                    .articles
                    .get_mut(id)
                    .filter(|a| !a.is_deleted())
                    .ok_or_else(|| ScribeError::not_found("Article", id))?;
                row.deleted_at = Some(*at);
                row.updated_at = *at;
            }
        }
        Ok(())
    }
}

/// In-memory database shared by the memory repositories.
///
/// Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    pub(crate) state: Arc<RwLock<MemoryState>>,
    next_article_id: Arc<AtomicI64>,
}

impl MemoryDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next article ID. IDs burnt by rolled-back
    /// transactions are not reused.
    pub(crate) fn next_article_id(&self) -> ArticleId {
        ArticleId(self.next_article_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&MemoryState) -> R) -> R {
        f(&self.state.read())
    }
}

#[async_trait]
impl TransactionManager for MemoryDatabase {
    async fn begin(&self) -> ScribeResult<Box<dyn Transaction>> {
        Ok(Box::new(MemoryTransaction {
            state: Arc::clone(&self.state),
            working: None,
            pending: Vec::new(),
        }))
    }
}

impl std::fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("MemoryDatabase")
            .field("users", &state.users.len())
            .field("articles", &state.articles.len())
            .finish()
    }
}

/// A transaction against a [`MemoryDatabase`].
///
/// Writes are checked against a private working copy when staged, then
/// replayed onto the latest committed state at commit. Replay is
/// all-or-nothing.
pub struct MemoryTransaction {
    state: Arc<RwLock<MemoryState>>,
    working: Option<MemoryState>,
    pending: Vec<PendingWrite>,
}

impl MemoryTransaction {
    /// Recovers the memory handle, checking it belongs to `db`.
    pub(crate) fn downcast<'t>(tx: &'t mut dyn Transaction, db: &MemoryDatabase) -> ScribeResult<&'t mut Self> {
        let tx = tx
            .as_any_mut()
            .downcast_mut::<Self>()
            .ok_or_else(|| ScribeError::internal("Transaction was not opened by the memory store"))?;
        if !Arc::ptr_eq(&tx.state, &db.state) {
            return Err(ScribeError::internal("Transaction belongs to another memory store"));
        }
        Ok(tx)
    }

    /// Stages a write after checking it against the working copy.
    pub(crate) fn stage(&mut self, write: PendingWrite) -> ScribeResult<()> {
        let working = self.working.get_or_insert_with(|| self.state.read().clone());
        working.apply(&write)?;
        self.pending.push(write);
        Ok(())
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> ScribeResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write();
        let mut next = state.clone();
        for write in &self.pending {
            next.apply(write)?;
        }
        *state = next;
        debug!("Memory transaction committed {} write(s)", self.pending.len());
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> ScribeResult<()> {
        debug!("Memory transaction discarded {} write(s)", self.pending.len());
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut (dyn Any + Send) {
        self
    }
}

impl std::fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
