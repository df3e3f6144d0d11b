//! MySQL implementations backed by SQLx.

mod article_repository;
mod transaction;
mod user_repository;

pub use article_repository::MySqlArticleRepository;
pub use transaction::{MySqlTransaction, MySqlTransactionManager};
pub use user_repository::MySqlUserRepository;
