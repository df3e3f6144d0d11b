//! # Scribe Repository
//!
//! The entity store behind the blog services.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn UserRepository> / Arc<dyn ArticleRepository>
//!   ↓  Arc<dyn TransactionManager>
//! MySqlUserRepository, MySqlArticleRepository   (SQLx, MySQL)
//! MemoryUserRepository, MemoryArticleRepository (in-process)
//! ```
//!
//! Reads run against committed state. Writes take a `&mut dyn Transaction`
//! and become visible only when that transaction commits.

pub mod memory;
pub mod mysql;
pub mod pool;
pub mod traits;
pub mod transaction;

pub use memory::*;
pub use mysql::*;
pub use pool::*;
pub use traits::*;
pub use transaction::*;
