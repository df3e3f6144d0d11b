//! In-process store for tests and single-node development.

mod article_repository;
mod database;
mod user_repository;

pub use article_repository::MemoryArticleRepository;
pub use database::{MemoryDatabase, MemoryTransaction};
pub use user_repository::MemoryUserRepository;
