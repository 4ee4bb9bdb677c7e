//! Cache invalidation bridge to the external Catalog Read Cache.
//!
//! The bridge carries a best-effort, at-least-once "invalidate show S"
//! signal, invoked strictly after the inventory commit is durable — never
//! before, or a stale read could repopulate the cache with pre-commit data.
//! Delivery failure is logged, not fatal: the inventory store stays
//! authoritative and the cache owns its own repopulation.
//!
//! Both the show-scoped entry and the movie-scoped listing embed seat state,
//! so the bridge names both keys (`show:{id}`, `shows:{movie_id}`).

use crate::error::CacheError;
use crate::types::{MovieId, ShowId};
use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::Mutex;

/// Signals the external Catalog Read Cache that cached seat-availability
/// views for a show are stale.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Invalidates every cached view describing the show's seat state.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the signal could not be delivered.
    /// Callers log and continue; they must not rely on immediate cache
    /// consistency.
    async fn invalidate(&self, show_id: ShowId, movie_id: MovieId) -> Result<(), CacheError>;
}

/// Redis-backed invalidator deleting the read-through cache keys directly.
pub struct RedisCacheInvalidator {
    client: redis::Client,
}

impl RedisCacheInvalidator {
    /// Creates an invalidator over an existing Redis client.
    ///
    /// The client is constructed once at startup and injected; the engine
    /// never reaches for a hidden process-wide connection.
    #[must_use]
    pub const fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CacheInvalidator for RedisCacheInvalidator {
    async fn invalidate(&self, show_id: ShowId, movie_id: MovieId) -> Result<(), CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(format!("redis connection error: {e}")))?;

        let keys = [format!("show:{show_id}"), format!("shows:{movie_id}")];
        let deleted: usize = conn
            .del(&keys)
            .await
            .map_err(|e| CacheError::Backend(format!("redis DEL error: {e}")))?;

        tracing::debug!(%show_id, %movie_id, deleted, "invalidated catalog cache entries");
        Ok(())
    }
}

/// No-op invalidator for deployments without a read-through cache.
pub struct NoopCacheInvalidator;

#[async_trait]
impl CacheInvalidator for NoopCacheInvalidator {
    async fn invalidate(&self, show_id: ShowId, _movie_id: MovieId) -> Result<(), CacheError> {
        tracing::trace!(%show_id, "no cache configured, invalidation skipped");
        Ok(())
    }
}

/// Test double that records invalidated shows and can be made to fail.
pub struct RecordingCacheInvalidator {
    invalidated: Mutex<Vec<ShowId>>,
    fail: bool,
}

impl RecordingCacheInvalidator {
    /// Creates a recording invalidator that always succeeds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            invalidated: Mutex::const_new(Vec::new()),
            fail: false,
        }
    }

    /// Creates a recording invalidator whose deliveries always fail.
    #[must_use]
    pub const fn failing() -> Self {
        Self {
            invalidated: Mutex::const_new(Vec::new()),
            fail: true,
        }
    }

    /// Shows invalidated so far, in delivery order.
    pub async fn invalidated(&self) -> Vec<ShowId> {
        self.invalidated.lock().await.clone()
    }
}

impl Default for RecordingCacheInvalidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheInvalidator for RecordingCacheInvalidator {
    async fn invalidate(&self, show_id: ShowId, _movie_id: MovieId) -> Result<(), CacheError> {
        if self.fail {
            return Err(CacheError::Backend("simulated delivery failure".into()));
        }
        self.invalidated.lock().await.push(show_id);
        Ok(())
    }
}
