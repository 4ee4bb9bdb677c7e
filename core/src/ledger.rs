//! Booking ledger: durable, append-only record of confirmed bookings.
//!
//! Append is the only mutation; bookings are never updated or deleted.
//! `list_by_user` returns a finite, most-recent-first sequence with a stable
//! ordering, so repeated reads with no intervening booking are identical.

use crate::error::LedgerError;
use crate::types::{Booking, UserId};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Durable record of confirmed bookings, queryable by user.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Appends one booking and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Backend`] if the write did not persist.
    async fn append(&self, booking: Booking) -> Result<Booking, LedgerError>;

    /// Returns the user's bookings, most recent first.
    ///
    /// Ties on the creation timestamp are broken by booking id so the
    /// ordering is total.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Backend`] if the read failed.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, LedgerError>;
}

/// In-memory append-only ledger.
pub struct MemoryBookingLedger {
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryBookingLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bookings: RwLock::const_new(Vec::new()),
        }
    }

    /// Total number of bookings across all users (test observability).
    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    /// Whether the ledger holds no bookings.
    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}

impl Default for MemoryBookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingLedger for MemoryBookingLedger {
    async fn append(&self, booking: Booking) -> Result<Booking, LedgerError> {
        self.bookings.write().await.push(booking.clone());
        Ok(booking)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, LedgerError> {
        let mut mine: Vec<Booking> = self
            .bookings
            .read()
            .await
            .iter()
            .filter(|booking| booking.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(mine)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{BookingId, Money, ShowId};
    use chrono::{Duration, Utc};

    fn booking_at(user_id: UserId, minutes_ago: i64) -> Booking {
        Booking {
            id: BookingId::new(),
            user_id,
            show_id: ShowId::new(),
            seats: vec!["A1".into()],
            total_amount: Money::from_cents(20_000),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn list_is_most_recent_first() {
        let ledger = MemoryBookingLedger::new();
        let user = UserId::new();

        let older = ledger.append(booking_at(user, 10)).await.unwrap();
        let newer = ledger.append(booking_at(user, 1)).await.unwrap();
        ledger.append(booking_at(UserId::new(), 0)).await.unwrap();

        let mine = ledger.list_by_user(user).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, newer.id);
        assert_eq!(mine[1].id, older.id);
    }

    #[tokio::test]
    async fn list_is_stable_across_reads() {
        let ledger = MemoryBookingLedger::new();
        let user = UserId::new();
        for minutes in [5, 3, 1] {
            ledger.append(booking_at(user, minutes)).await.unwrap();
        }

        let first = ledger.list_by_user(user).await.unwrap();
        let second = ledger.list_by_user(user).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_for_unknown_user() {
        let ledger = MemoryBookingLedger::new();
        let mine = ledger.list_by_user(UserId::new()).await.unwrap();
        assert!(mine.is_empty());
    }
}
