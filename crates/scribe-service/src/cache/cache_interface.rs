//! Cache interface trait for abstracted caching operations.

use async_trait::async_trait;
use scribe_core::{Interface, ScribeError, ScribeResult};
use std::time::Duration;
use tracing::{debug, warn};

/// Cache interface for storing and retrieving cached data.
///
/// Uses JSON strings for type-erased storage to maintain dyn-compatibility.
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Get a raw JSON value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired. Errors are
    /// reserved for backend failures.
    async fn get_raw(&self, key: &str) -> ScribeResult<Option<String>>;

    /// Set a raw JSON value. `None` stores the entry without expiry.
    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> ScribeResult<()>;

    /// Delete a value from the cache.
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> ScribeResult<bool>;
}

/// Extension trait with typed methods for convenience.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Get a typed value from the cache.
    ///
    /// An empty or undecodable payload is logged and reported as a miss.
    /// A backend failure surfaces as `ReadFailure`.
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> ScribeResult<Option<T>> {
        let raw = self
            .get_raw(key)
            .await
            .map_err(|e| ScribeError::ReadFailure(e.to_string()))?;

        let Some(json) = raw else {
            return Ok(None);
        };
        if json.trim().is_empty() {
            warn!("Empty cache payload for key '{}', treating as miss", key);
            return Ok(None);
        }

        match serde_json::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Undecodable cache payload for key '{}', treating as miss: {}", key, e);
                Ok(None)
            }
        }
    }

    /// Set a typed value in the cache.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> ScribeResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }

    /// Read-through lookup: return the cached value, or load it, store it
    /// without expiry and return it.
    ///
    /// A failed populate is logged and does not fail the read.
    async fn get_or_load<T, F, Fut>(&self, key: &str, loader: F) -> ScribeResult<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: std::future::Future<Output = ScribeResult<T>> + Send,
    {
        if let Some(cached) = self.get::<T>(key).await? {
            debug!("Cache hit for key '{}'", key);
            return Ok(cached);
        }

        debug!("Cache miss for key '{}'", key);
        let value = loader().await?;

        if let Err(e) = self.set(key, &value, None).await {
            warn!("Failed to populate cache key '{}': {}", key, e);
        }

        Ok(value)
    }
}

// Blanket implementation for all CacheInterface implementations
impl<T: CacheInterface + ?Sized> CacheExt for T {}
