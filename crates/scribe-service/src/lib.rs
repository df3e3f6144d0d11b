//! # Scribe Service
//!
//! Use-case layer for the Scribe blog backend.
//!
//! Every operation follows the same path: the [`AuthorizationGate`] checks
//! the session record (and ownership, for article edits), writes go through
//! [`run_in_transaction`](scribe_repository::run_in_transaction), and only
//! after a commit does the [`CacheInvalidator`] drop the derived cache keys.
//! Reads are served read-through from the cache.

pub mod article_service;
pub mod cache;
pub mod context;
pub mod dto;
pub mod gate;
pub mod r#impl;
pub mod session;
pub mod user_service;

pub use article_service::*;
pub use cache::*;
pub use context::*;
pub use dto::*;
pub use gate::*;
pub use r#impl::*;
pub use session::*;
pub use user_service::*;
