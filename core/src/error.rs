//! Error taxonomy for the reservation engine.
//!
//! The taxonomy distinguishes outcomes a client can act on (`InvalidRequest`,
//! `SeatsUnavailable`, `ShowNotFound`) from outcomes that require re-querying
//! authoritative state (`Unknown`) or operator reconciliation
//! (`PartialFailure`). No variant ever permits two bookings to overlap on a
//! seat; that invariant is enforced at the storage layer.

use crate::types::{Booking, SeatLabel, ShowId};
use thiserror::Error;

/// Errors surfaced by the seat inventory store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The show id is unknown to the store.
    #[error("show {0} not found")]
    ShowNotFound(ShowId),

    /// A show was inserted with a repeated seat label.
    #[error("show {show_id} has duplicate seat label {label}")]
    DuplicateSeatLabel {
        /// Show that violated the uniqueness invariant.
        show_id: ShowId,
        /// The repeated label.
        label: SeatLabel,
    },

    /// The optimistic commit loop hit its retry cap without observing a
    /// stable version. Callers treat this as a conflict and re-query.
    #[error("commit contention on show {show_id} exhausted {attempts} retries")]
    ContentionExhausted {
        /// Contended show.
        show_id: ShowId,
        /// Retries performed before giving up.
        attempts: u32,
    },

    /// The backing store failed.
    #[error("inventory backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by the booking ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The backing store failed.
    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by cache collaborators (invalidation bridge, idempotency).
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache backend failed.
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Outcome taxonomy of a reservation attempt.
#[derive(Debug, Error)]
pub enum ReserveError {
    /// Empty or malformed seat selection; rejected before touching storage.
    #[error("invalid reservation request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request.
        reason: String,
    },

    /// The show id is unknown; no ledger entry created, no inventory touched.
    #[error("show {0} not found")]
    ShowNotFound(ShowId),

    /// One or more requested seats are already booked. Carries every
    /// requested label that was taken so the client can re-render
    /// availability. Never a partial success.
    #[error("seats already booked: {}", format_labels(labels))]
    SeatsUnavailable {
        /// The requested labels that were already taken, sorted.
        labels: Vec<SeatLabel>,
    },

    /// A store or ledger call did not confirm within its deadline. The
    /// commit may have succeeded durably before the deadline fired; the
    /// caller must re-query authoritative state, never assume either outcome.
    #[error("{operation} did not confirm within its deadline; re-query authoritative state")]
    Unknown {
        /// The call that timed out.
        operation: &'static str,
    },

    /// Inventory committed but the ledger write exhausted its retries.
    /// The seats remain correctly booked; the booking is reported as
    /// committed so an idempotent replay can recover the record.
    #[error("booking {} committed but ledger append failed; reconciliation required", booking.id)]
    PartialFailure {
        /// The booking whose ledger write was lost.
        booking: Box<Booking>,
    },

    /// The inventory store failed in a way the taxonomy does not refine.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn format_labels(labels: &[SeatLabel]) -> String {
    labels
        .iter()
        .map(SeatLabel::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seats_unavailable_lists_labels() {
        let err = ReserveError::SeatsUnavailable {
            labels: vec!["A2".into(), "A3".into()],
        };
        assert_eq!(err.to_string(), "seats already booked: A2, A3");
    }

    #[test]
    fn store_not_found_promotes() {
        let show_id = ShowId::new();
        let err = ReserveError::from(StoreError::ShowNotFound(show_id));
        assert!(matches!(err, ReserveError::Store(StoreError::ShowNotFound(id)) if id == show_id));
    }
}
