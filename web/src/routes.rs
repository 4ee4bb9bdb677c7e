//! Router configuration for the booking API.

use crate::api::bookings;
use crate::server::health::{health_check, readiness_check};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Build the complete Axum router.
///
/// Health checks are unauthenticated; booking routes require a bearer
/// token resolved through the state's identity provider.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/me", get(bookings::my_bookings))
        .with_state(state)
}
