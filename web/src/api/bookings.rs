//! Booking endpoints.
//!
//! `POST /bookings` converts a seat selection into a confirmed booking
//! through the reservation coordinator; `GET /bookings/me` lists the
//! authenticated user's bookings most recent first.

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json, async_trait,
    extract::{FromRequestParts, State},
    http::{StatusCode, request::Parts},
};
use chrono::{DateTime, Utc};
use marquee_core::{
    Booking, IdempotencyKey, ReservationAttempt, ReserveError, SeatLabel, ShowId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional `Idempotency-Key` header, validated against the accepted
/// length bounds.
#[derive(Debug, Clone)]
pub struct IdempotencyKeyHeader(pub Option<IdempotencyKey>);

#[async_trait]
impl<S> FromRequestParts<S> for IdempotencyKeyHeader
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get("idempotency-key") else {
            return Ok(Self(None));
        };

        let raw = value
            .to_str()
            .map_err(|_| AppError::bad_request("Idempotency-Key header is not valid UTF-8"))?;

        let key = IdempotencyKey::parse(raw).ok_or_else(|| {
            AppError::bad_request(format!(
                "Idempotency-Key must be between {} and {} characters",
                IdempotencyKey::MIN_LEN,
                IdempotencyKey::MAX_LEN
            ))
        })?;

        Ok(Self(Some(key)))
    }
}

/// Request body for creating a booking.
///
/// The price is never part of the request: the total is computed
/// server-side from the show's canonical price.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Show to reserve seats in.
    pub show_id: Uuid,
    /// Requested seat labels.
    pub seats: Vec<String>,
}

/// Booking representation returned to clients.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Booking identifier.
    pub id: Uuid,
    /// Show the seats belong to.
    pub show_id: Uuid,
    /// Reserved seat labels.
    pub seats: Vec<String>,
    /// Total charged, in cents.
    pub total_amount_cents: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: *booking.id.as_uuid(),
            show_id: *booking.show_id.as_uuid(),
            seats: booking
                .seats
                .into_iter()
                .map(|label| label.as_str().to_string())
                .collect(),
            total_amount_cents: booking.total_amount.cents(),
            created_at: booking.created_at,
        }
    }
}

/// `POST /bookings` — reserve seats and create a booking.
///
/// Returns 201 with the booking on success. A reservation whose ledger
/// write was lost after the inventory commit is still reported as created;
/// the incident is logged for reconciliation.
///
/// # Errors
///
/// 400 for invalid selections or already-taken seats (code
/// `SEATS_UNAVAILABLE` with the taken labels), 404 for an unknown show,
/// 408 when the outcome could not be confirmed in time.
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    idempotency: IdempotencyKeyHeader,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let show_id = ShowId::from_uuid(request.show_id);
    let seats: Vec<SeatLabel> = request.seats.into_iter().map(SeatLabel::new).collect();

    let mut attempt = ReservationAttempt::new(show_id, user.user_id, seats);
    if let Some(key) = idempotency.0 {
        attempt = attempt.with_idempotency_key(key);
    }

    match state.coordinator.reserve(attempt).await {
        Ok(booking) => Ok((StatusCode::CREATED, Json(booking.into()))),
        Err(ReserveError::PartialFailure { booking }) => {
            // The seats are committed; only the ledger record was lost.
            tracing::error!(
                booking_id = %booking.id,
                user_id = %user.user_id,
                "booking created with lost ledger record"
            );
            Ok((StatusCode::CREATED, Json((*booking).into())))
        }
        Err(other) => Err(other.into()),
    }
}

/// `GET /bookings/me` — the authenticated user's bookings, most recent
/// first. Returns an empty list when the user has none.
///
/// # Errors
///
/// 500 if the ledger read fails.
pub async fn my_bookings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = state
        .ledger
        .list_by_user(user.user_id)
        .await
        .map_err(|e| AppError::internal("Failed to load bookings").with_source(e.into()))?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}
