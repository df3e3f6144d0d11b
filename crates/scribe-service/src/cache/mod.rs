//! Caching infrastructure for the service layer.
//!
//! Query results are cached read-through, without expiry, and dropped by
//! the write path through the [`CacheInvalidator`] queue.

mod cache_interface;
pub mod cache_keys;
mod invalidation;
mod memory_cache;
mod redis_cache;

pub use cache_interface::{CacheExt, CacheInterface};
pub use invalidation::CacheInvalidator;
pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCacheService;
