//! Application state shared across request handlers.

use crate::auth::IdentityProvider;
use marquee_core::{BookingLedger, ReservationCoordinator};
use std::sync::Arc;

/// Shared application state.
///
/// Cheap to clone: every field is an `Arc`. The coordinator owns the
/// inventory store and cache collaborators; the ledger is also held here
/// directly for read-side queries.
#[derive(Clone)]
pub struct AppState {
    /// Reservation coordinator (write side).
    pub coordinator: Arc<ReservationCoordinator>,
    /// Booking ledger (read side).
    pub ledger: Arc<dyn BookingLedger>,
    /// External identity collaborator.
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Creates application state over the given collaborators.
    #[must_use]
    pub fn new(
        coordinator: Arc<ReservationCoordinator>,
        ledger: Arc<dyn BookingLedger>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            coordinator,
            ledger,
            identity,
        }
    }
}
