//! Result type aliases for Scribe.

use crate::ScribeError;

/// A specialized `Result` type for Scribe operations.
pub type ScribeResult<T> = Result<T, ScribeError>;

/// A boxed future returning a `ScribeResult`.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = ScribeResult<T>> + Send + 'a>>;
