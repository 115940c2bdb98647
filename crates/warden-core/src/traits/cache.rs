//! Cache provider trait for pluggable key/value backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for TTL-capable key/value backends (Redis or in-memory).
///
/// All values are stored as strings (JSON payloads). The provider is
/// responsible for key prefixing and TTL enforcement; TTLs are absolute
/// eviction deadlines. Single-key operations are atomic; there are no
/// multi-key transactions, so multi-step callers must tolerate
/// concurrent mutation between steps.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key. Deleting an absent key is a no-op, not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// List all keys matching a glob pattern (e.g. `"U1_session_*"`).
    ///
    /// Returned keys are un-prefixed and can be passed directly back to
    /// [`get`](Self::get) / [`delete`](Self::delete). The scan is not a
    /// snapshot; keys may appear or vanish concurrently.
    async fn keys(&self, pattern: &str) -> AppResult<Vec<String>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Flush all entries from this provider's namespace.
    async fn flush_all(&self) -> AppResult<()>;
}
