//! Reservation coordinator: validates a seat request against current
//! inventory and commits the cross-store transition exactly once.
//!
//! The coordinator owns no state. It orchestrates one atomic inventory
//! commit, one ledger append and one cache invalidation, and must leave both
//! stores consistent even under failure: the inventory transition is the
//! durable source of truth for "is this seat taken", and a booking record
//! that fails to persist after a committed seat is retried, then surfaced as
//! a partial failure that still reports the booking as committed.
//!
//! Concurrency tie-break: when attempts target overlapping seats, exactly
//! one may succeed per seat; every other attempt observing overlap receives
//! `SeatsUnavailable`. The outcome is linearizable — as if attempts were
//! applied one at a time in some order — with no guarantee about which
//! non-overlapping racer wins.

use crate::cache::CacheInvalidator;
use crate::error::{ReserveError, StoreError};
use crate::idempotency::IdempotencyCache;
use crate::inventory::{CommitResult, InventoryStore};
use crate::ledger::BookingLedger;
use crate::types::{Booking, BookingId, ReservationAttempt};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Deadlines and retry budgets for the coordinator's external calls.
///
/// No operation in the engine blocks unboundedly: every store and ledger
/// call carries a deadline, and only the inventory commit (internally) and
/// the ledger append (here) may retry.
#[derive(Clone, Copy, Debug)]
pub struct CoordinatorConfig {
    /// Deadline for each inventory store call.
    pub store_deadline: Duration,
    /// Deadline for each ledger call.
    pub ledger_deadline: Duration,
    /// Bounded attempts for the append-after-commit ledger write.
    pub ledger_retry_attempts: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            store_deadline: Duration::from_secs(5),
            ledger_deadline: Duration::from_secs(5),
            ledger_retry_attempts: 3,
        }
    }
}

/// Concurrency-safe reservation engine over pluggable collaborators.
pub struct ReservationCoordinator {
    inventory: Arc<dyn InventoryStore>,
    ledger: Arc<dyn BookingLedger>,
    cache: Arc<dyn CacheInvalidator>,
    idempotency: Arc<dyn IdempotencyCache>,
    config: CoordinatorConfig,
}

impl ReservationCoordinator {
    /// Creates a coordinator over the given collaborators.
    #[must_use]
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        ledger: Arc<dyn BookingLedger>,
        cache: Arc<dyn CacheInvalidator>,
        idempotency: Arc<dyn IdempotencyCache>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            inventory,
            ledger,
            cache,
            idempotency,
            config,
        }
    }

    /// Converts a reservation attempt into a confirmed booking, or a precise
    /// conflict report.
    ///
    /// The caller may cancel (drop) this future freely before the commit
    /// step; once the inventory commit has begun it runs to a definite
    /// outcome with no partial application across seats.
    ///
    /// # Errors
    ///
    /// See [`ReserveError`] for the full taxonomy. `Unknown` means the
    /// caller must re-query seat state rather than assume failure: the
    /// commit may have succeeded durably before the deadline fired.
    pub async fn reserve(&self, attempt: ReservationAttempt) -> Result<Booking, ReserveError> {
        // Rejected before touching storage.
        if attempt.seats.is_empty() {
            record_outcome("invalid");
            return Err(ReserveError::InvalidRequest {
                reason: "seat selection is empty".to_string(),
            });
        }
        if let Some(label) = attempt.duplicate_label() {
            record_outcome("invalid");
            return Err(ReserveError::InvalidRequest {
                reason: format!("seat {label} requested more than once"),
            });
        }

        // A retried identical attempt replays the original booking without
        // touching inventory. Cache errors degrade to a miss.
        if let Some(key) = &attempt.idempotency_key {
            match self.idempotency.get(attempt.user_id, key).await {
                Ok(Some(booking)) => {
                    tracing::info!(
                        booking_id = %booking.id,
                        user_id = %attempt.user_id,
                        "idempotent replay, returning original booking"
                    );
                    record_outcome("replayed");
                    return Ok(booking);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(%error, "idempotency lookup failed, treating as miss");
                }
            }
        }

        // Read-only price resolution.
        let show = self
            .with_deadline("inventory load", self.inventory.load_show(attempt.show_id))
            .await?
            .map_err(|error| match error {
                StoreError::ShowNotFound(id) => {
                    record_outcome("not_found");
                    ReserveError::ShowNotFound(id)
                }
                other => ReserveError::Store(other),
            })?;

        // The atomic transition. Success or failure is decided at commit
        // time against the state observed then, not at the read above.
        let commit = self
            .with_deadline(
                "seat commit",
                self.inventory.try_commit_seats(attempt.show_id, &attempt.seats),
            )
            .await?
            .map_err(|error| match error {
                StoreError::ShowNotFound(id) => ReserveError::ShowNotFound(id),
                other => ReserveError::Store(other),
            })?;

        if let CommitResult::Conflict { taken } = commit {
            tracing::info!(
                show_id = %attempt.show_id,
                taken = ?taken,
                "reservation conflict"
            );
            record_outcome("conflict");
            return Err(ReserveError::SeatsUnavailable { labels: taken });
        }

        #[allow(clippy::cast_possible_truncation)]
        let seat_count = attempt.seats.len() as u32;
        let booking = Booking {
            id: BookingId::new(),
            user_id: attempt.user_id,
            show_id: attempt.show_id,
            seats: attempt.seats.clone(),
            total_amount: show.price.saturating_multiply(seat_count),
            created_at: Utc::now(),
        };

        let ledger_durable = self.append_with_retries(&booking).await;

        // Strictly after the durable inventory commit: stale "available"
        // reads must not repopulate the cache with pre-commit data.
        if let Err(error) = self.cache.invalidate(attempt.show_id, show.movie_id).await {
            tracing::warn!(
                show_id = %attempt.show_id,
                %error,
                "cache invalidation failed; inventory store remains authoritative"
            );
        }

        // Record for replay whether or not the ledger write stuck: the seats
        // are committed either way.
        if let Some(key) = &attempt.idempotency_key {
            if let Err(error) = self.idempotency.put(attempt.user_id, key, &booking).await {
                tracing::warn!(%error, "failed to record idempotency entry");
            }
        }

        if ledger_durable {
            tracing::info!(
                booking_id = %booking.id,
                show_id = %attempt.show_id,
                seats = ?booking.seats,
                total = %booking.total_amount,
                "booking committed"
            );
            record_outcome("committed");
            Ok(booking)
        } else {
            tracing::error!(
                booking_id = %booking.id,
                show_id = %attempt.show_id,
                "durability incident: inventory committed but ledger append exhausted retries"
            );
            record_outcome("partial_failure");
            Err(ReserveError::PartialFailure {
                booking: Box::new(booking),
            })
        }
    }

    /// Bounded-retry ledger append. Returns whether the write persisted.
    async fn append_with_retries(&self, booking: &Booking) -> bool {
        for attempt in 1..=self.config.ledger_retry_attempts {
            match tokio::time::timeout(
                self.config.ledger_deadline,
                self.ledger.append(booking.clone()),
            )
            .await
            {
                Ok(Ok(_)) => return true,
                Ok(Err(error)) => {
                    tracing::warn!(
                        booking_id = %booking.id,
                        attempt,
                        %error,
                        "ledger append failed"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        booking_id = %booking.id,
                        attempt,
                        "ledger append deadline elapsed"
                    );
                }
            }
        }
        false
    }

    /// Wraps an inventory call in its deadline; expiry becomes `Unknown`
    /// because the call may have succeeded durably before the deadline.
    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = T> + Send,
    ) -> Result<T, ReserveError> {
        tokio::time::timeout(self.config.store_deadline, call)
            .await
            .map_err(|_| {
                record_outcome("unknown");
                ReserveError::Unknown { operation }
            })
    }
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("marquee_reservations_total", "outcome" => outcome).increment(1);
}
