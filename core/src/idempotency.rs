//! Idempotency cache for safe reservation retries.
//!
//! The naive baseline had no way to retry a client-side timeout without
//! risking a second reservation attempt. With a client-supplied
//! `Idempotency-Key`, a retried identical attempt returns the original
//! booking instead of touching inventory again.
//!
//! Keys are scoped by user id so one user's retry can never replay another
//! user's booking. Cached entries expire after 24 hours.

use crate::error::CacheError;
use crate::types::{Booking, IdempotencyKey, UserId};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Seconds a cached booking stays replayable.
pub const IDEMPOTENCY_TTL_SECS: u64 = 86_400;

/// Lookup and storage of bookings by (user, idempotency key).
#[async_trait]
pub trait IdempotencyCache: Send + Sync {
    /// Returns the booking previously stored under this user's key, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the lookup failed.
    async fn get(
        &self,
        user_id: UserId,
        key: &IdempotencyKey,
    ) -> Result<Option<Booking>, CacheError>;

    /// Stores a booking under this user's key.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the write failed.
    async fn put(
        &self,
        user_id: UserId,
        key: &IdempotencyKey,
        booking: &Booking,
    ) -> Result<(), CacheError>;
}

/// In-memory idempotency cache (no expiry; suitable for tests and
/// single-process deployments).
pub struct MemoryIdempotencyCache {
    entries: RwLock<HashMap<(UserId, IdempotencyKey), Booking>>,
}

impl MemoryIdempotencyCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryIdempotencyCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdempotencyCache for MemoryIdempotencyCache {
    async fn get(
        &self,
        user_id: UserId,
        key: &IdempotencyKey,
    ) -> Result<Option<Booking>, CacheError> {
        Ok(self
            .entries
            .read()
            .await
            .get(&(user_id, key.clone()))
            .cloned())
    }

    async fn put(
        &self,
        user_id: UserId,
        key: &IdempotencyKey,
        booking: &Booking,
    ) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert((user_id, key.clone()), booking.clone());
        Ok(())
    }
}

/// Redis-backed idempotency cache storing bookings as JSON with a 24-hour
/// TTL under `idempotency:{user}:{key}`.
pub struct RedisIdempotencyCache {
    client: redis::Client,
}

impl RedisIdempotencyCache {
    /// Creates a cache over an existing Redis client.
    #[must_use]
    pub const fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn cache_key(user_id: UserId, key: &IdempotencyKey) -> String {
        format!("idempotency:{user_id}:{key}")
    }
}

#[async_trait]
impl IdempotencyCache for RedisIdempotencyCache {
    async fn get(
        &self,
        user_id: UserId,
        key: &IdempotencyKey,
    ) -> Result<Option<Booking>, CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(format!("redis connection error: {e}")))?;

        let cached: Option<String> = conn
            .get(Self::cache_key(user_id, key))
            .await
            .map_err(|e| CacheError::Backend(format!("redis GET error: {e}")))?;

        match cached {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| CacheError::Backend(format!("deserialization error: {e}"))),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        user_id: UserId,
        key: &IdempotencyKey,
        booking: &Booking,
    ) -> Result<(), CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(format!("redis connection error: {e}")))?;

        let json = serde_json::to_string(booking)
            .map_err(|e| CacheError::Backend(format!("serialization error: {e}")))?;

        let _: () = conn
            .set_ex(Self::cache_key(user_id, key), json, IDEMPOTENCY_TTL_SECS)
            .await
            .map_err(|e| CacheError::Backend(format!("redis SET error: {e}")))?;

        Ok(())
    }
}
