//! Seat inventory store: the single source of truth for seat booked-state.
//!
//! The store's contract is the crux of the engine: `try_commit_seats` must be
//! an atomic, serializable state transition. It re-checks that every
//! requested seat is currently free and, only if so, flips them all to booked
//! in one indivisible operation; otherwise it makes no change. Availability
//! reads and the commit are never separated by a window in which another
//! attempt can interleave — the naive load/filter/overwrite sequence has
//! exactly that window and loses updates under concurrency.
//!
//! `MemoryInventoryStore` implements the contract with a per-show version
//! counter compared-and-swapped under a per-show write lock: attempts on the
//! same show linearize, attempts on different shows proceed independently.

use crate::error::StoreError;
use crate::types::{Seat, SeatLabel, Show, ShowId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Outcome of an atomic seat commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitResult {
    /// Every requested seat was free and is now booked.
    Committed,
    /// At least one requested seat was not free; nothing changed.
    Conflict {
        /// Every requested label that was already taken, sorted.
        taken: Vec<SeatLabel>,
    },
}

/// Durable record of each show's seats and their booked/free state.
///
/// The store exclusively owns seat booked-state; bookings and catalog fields
/// live elsewhere. Success or failure of `try_commit_seats` is determined
/// atomically with respect to all other operations on the same show.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Loads a show with its full seat collection (read-only).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShowNotFound`] if the show id is unknown.
    async fn load_show(&self, show_id: ShowId) -> Result<Show, StoreError>;

    /// Loads the ordered seat collection for a show.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShowNotFound`] if the show id is unknown.
    async fn load_seats(&self, show_id: ShowId) -> Result<Vec<Seat>, StoreError>;

    /// Atomically books the requested seats if and only if all are free.
    ///
    /// The conflict report names every requested label that was not free,
    /// including labels the show does not contain (those can never be free).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShowNotFound`] for an unknown show, or
    /// [`StoreError::ContentionExhausted`] when the optimistic retry loop
    /// hit its cap without observing a stable version.
    async fn try_commit_seats(
        &self,
        show_id: ShowId,
        labels: &[SeatLabel],
    ) -> Result<CommitResult, StoreError>;
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// Show record with its optimistic-concurrency version counter.
#[derive(Debug)]
struct VersionedShow {
    version: u64,
    show: Show,
}

/// In-memory inventory store with per-show optimistic commits.
///
/// The outer map lock only guards map structure; each show carries its own
/// lock, so commits against different shows never contend. Within one show,
/// `try_commit_seats` runs a compare-and-swap loop: read the version and the
/// conflict set, then take the write lock and apply only if the version is
/// unchanged. The check-and-flip under the write lock contains no await
/// point, so a started commit always runs to a definite outcome even if the
/// caller is cancelled.
pub struct MemoryInventoryStore {
    shows: RwLock<HashMap<ShowId, Arc<RwLock<VersionedShow>>>>,
    retry_cap: u32,
}

/// Default cap on optimistic-commit retries before surfacing contention.
pub const DEFAULT_COMMIT_RETRY_CAP: u32 = 8;

impl MemoryInventoryStore {
    /// Creates an empty store with the default retry cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_retry_cap(DEFAULT_COMMIT_RETRY_CAP)
    }

    /// Creates an empty store with an explicit retry cap.
    #[must_use]
    pub fn with_retry_cap(retry_cap: u32) -> Self {
        Self {
            shows: RwLock::new(HashMap::new()),
            retry_cap,
        }
    }

    /// Inserts a show, enforcing the seat-label uniqueness invariant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateSeatLabel`] if two seats share a label.
    pub async fn insert_show(&self, show: Show) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for seat in &show.seats {
            if !seen.insert(seat.label.clone()) {
                return Err(StoreError::DuplicateSeatLabel {
                    show_id: show.id,
                    label: seat.label.clone(),
                });
            }
        }

        self.shows.write().await.insert(
            show.id,
            Arc::new(RwLock::new(VersionedShow { version: 0, show })),
        );
        Ok(())
    }

    /// Returns the current version counter for a show (test observability).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShowNotFound`] if the show id is unknown.
    pub async fn version(&self, show_id: ShowId) -> Result<u64, StoreError> {
        let record = self.record(show_id).await?;
        let guard = record.read().await;
        Ok(guard.version)
    }

    async fn record(&self, show_id: ShowId) -> Result<Arc<RwLock<VersionedShow>>, StoreError> {
        self.shows
            .read()
            .await
            .get(&show_id)
            .cloned()
            .ok_or(StoreError::ShowNotFound(show_id))
    }

    /// Requested labels that are not currently free: booked seats plus
    /// labels the show does not contain.
    fn taken_of(show: &Show, labels: &[SeatLabel]) -> Vec<SeatLabel> {
        let mut taken: Vec<SeatLabel> = labels
            .iter()
            .filter(|label| show.seat(label).is_none_or(|seat| seat.booked))
            .cloned()
            .collect();
        taken.sort();
        taken
    }
}

impl Default for MemoryInventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn load_show(&self, show_id: ShowId) -> Result<Show, StoreError> {
        let record = self.record(show_id).await?;
        let guard = record.read().await;
        Ok(guard.show.clone())
    }

    async fn load_seats(&self, show_id: ShowId) -> Result<Vec<Seat>, StoreError> {
        let record = self.record(show_id).await?;
        let guard = record.read().await;
        Ok(guard.show.seats.clone())
    }

    async fn try_commit_seats(
        &self,
        show_id: ShowId,
        labels: &[SeatLabel],
    ) -> Result<CommitResult, StoreError> {
        let record = self.record(show_id).await?;

        for attempt in 0..=self.retry_cap {
            // Optimistic read: observe version and conflict set.
            let observed_version = {
                let guard = record.read().await;
                let taken = Self::taken_of(&guard.show, labels);
                if !taken.is_empty() {
                    return Ok(CommitResult::Conflict { taken });
                }
                guard.version
            };

            // Conditional apply: only if nobody committed in between.
            let mut guard = record.write().await;
            if guard.version != observed_version {
                tracing::trace!(
                    %show_id,
                    attempt,
                    observed_version,
                    current_version = guard.version,
                    "commit raced, re-validating"
                );
                continue;
            }

            for seat in &mut guard.show.seats {
                if labels.contains(&seat.label) {
                    seat.booked = true;
                }
            }
            guard.version += 1;
            return Ok(CommitResult::Committed);
        }

        Err(StoreError::ContentionExhausted {
            show_id,
            attempts: self.retry_cap,
        })
    }
}
