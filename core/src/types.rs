//! Domain types for the seat-inventory reservation engine.
//!
//! Value objects and entities shared by the inventory store, the reservation
//! coordinator and the booking ledger. Identifier newtypes follow the
//! cents-based `Money` convention to keep arithmetic exact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a show (a single scheduled screening).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShowId(Uuid);

impl ShowId {
    /// Creates a new random `ShowId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ShowId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ShowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a movie (catalog reference, managed out of scope).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieId(Uuid);

impl MovieId {
    /// Creates a new random `MovieId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `MovieId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MovieId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an authenticated user.
///
/// Produced by the external Identity collaborator; the engine never issues
/// or verifies credentials itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a confirmed booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Seat Label
// ============================================================================

/// Label identifying one bookable seat within a show (e.g. "A1", "VIP-5").
///
/// Labels are unique within one show's seat collection. Ordering is
/// lexicographic so conflict reports are deterministic.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatLabel(String);

impl SeatLabel {
    /// Creates a new `SeatLabel`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the label as a string reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SeatLabel {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents.
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity with overflow checking.
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_multiply(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Domain Entities
// ============================================================================

/// One bookable unit within a show's inventory.
///
/// A seat never exists independent of its show; the inventory store owns
/// the `booked` flag exclusively.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Seat label, unique within the show.
    pub label: SeatLabel,
    /// Whether the seat has been booked.
    pub booked: bool,
}

impl Seat {
    /// Creates a new free `Seat`.
    #[must_use]
    pub const fn free(label: SeatLabel) -> Self {
        Self {
            label,
            booked: false,
        }
    }
}

/// A single scheduled screening with its own seat inventory and price.
///
/// Seat booked-flags are mutated only by the reservation coordinator (through
/// the inventory store); all other fields belong to catalog management.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    /// Unique show identifier.
    pub id: ShowId,
    /// Movie being screened.
    pub movie_id: MovieId,
    /// Venue name (e.g. "Grand Odeon 3").
    pub theatre: String,
    /// Venue location.
    pub location: String,
    /// Screening start time.
    pub starts_at: DateTime<Utc>,
    /// Ticket price per seat.
    pub price: Money,
    /// Ordered seat collection; labels are unique within one show.
    pub seats: Vec<Seat>,
}

impl Show {
    /// Creates a new `Show` with every seat free.
    #[must_use]
    pub fn new(
        id: ShowId,
        movie_id: MovieId,
        theatre: impl Into<String>,
        location: impl Into<String>,
        starts_at: DateTime<Utc>,
        price: Money,
        seat_labels: Vec<SeatLabel>,
    ) -> Self {
        Self {
            id,
            movie_id,
            theatre: theatre.into(),
            location: location.into(),
            starts_at,
            price,
            seats: seat_labels.into_iter().map(Seat::free).collect(),
        }
    }

    /// Looks up a seat by label.
    #[must_use]
    pub fn seat(&self, label: &SeatLabel) -> Option<&Seat> {
        self.seats.iter().find(|seat| &seat.label == label)
    }

    /// Returns the labels of every currently booked seat, in seat order.
    #[must_use]
    pub fn booked_labels(&self) -> Vec<SeatLabel> {
        self.seats
            .iter()
            .filter(|seat| seat.booked)
            .map(|seat| seat.label.clone())
            .collect()
    }
}

/// Immutable confirmation record for a committed reservation.
///
/// Once created, a booking's seat set is permanently disjoint from every
/// other booking's seat set for the same show. The total amount is captured
/// at booking time from the show's canonical price; client-supplied amounts
/// are never trusted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// User who owns the booking.
    pub user_id: UserId,
    /// Show the seats belong to.
    pub show_id: ShowId,
    /// The exact set of seat labels reserved.
    pub seats: Vec<SeatLabel>,
    /// Seat count times the show price, captured at booking time.
    pub total_amount: Money,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Reservation Attempt
// ============================================================================

/// Client-supplied key that makes retried identical attempts return the
/// original booking instead of attempting a fresh reservation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Minimum accepted key length.
    pub const MIN_LEN: usize = 16;
    /// Maximum accepted key length.
    pub const MAX_LEN: usize = 128;

    /// Parses a key, rejecting values outside the accepted length bounds.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        if (Self::MIN_LEN..=Self::MAX_LEN).contains(&key.len()) {
            Some(Self(key.to_string()))
        } else {
            None
        }
    }

    /// Returns the key as a string reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transient request to convert a set of free seats into a booking.
///
/// Not persisted. Validation (non-empty, no duplicate labels) happens in the
/// coordinator before any store interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservationAttempt {
    /// Show to reserve seats in.
    pub show_id: ShowId,
    /// Requesting user (resolved by the external Identity collaborator).
    pub user_id: UserId,
    /// Requested seat labels.
    pub seats: Vec<SeatLabel>,
    /// Optional client-supplied retry key.
    pub idempotency_key: Option<IdempotencyKey>,
}

impl ReservationAttempt {
    /// Creates a new attempt without an idempotency key.
    #[must_use]
    pub const fn new(show_id: ShowId, user_id: UserId, seats: Vec<SeatLabel>) -> Self {
        Self {
            show_id,
            user_id,
            seats,
            idempotency_key: None,
        }
    }

    /// Attaches an idempotency key to the attempt.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: IdempotencyKey) -> Self {
        self.idempotency_key = Some(key);
        self
    }

    /// Returns the first duplicated label, if any.
    #[must_use]
    pub fn duplicate_label(&self) -> Option<&SeatLabel> {
        self.seats
            .iter()
            .enumerate()
            .find(|(i, label)| self.seats[..*i].contains(label))
            .map(|(_, label)| label)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn money_multiply() {
        let price = Money::from_cents(20_000);
        assert_eq!(price.checked_multiply(3).unwrap().cents(), 60_000);
        assert_eq!(price.to_string(), "$200.00");
    }

    #[test]
    fn money_multiply_overflow() {
        assert!(Money::from_cents(u64::MAX).checked_multiply(2).is_none());
    }

    #[test]
    fn idempotency_key_bounds() {
        assert!(IdempotencyKey::parse("too-short").is_none());
        assert!(IdempotencyKey::parse(&"k".repeat(129)).is_none());
        assert!(IdempotencyKey::parse("sixteen-chars-ok").is_some());
    }

    #[test]
    fn attempt_duplicate_detection() {
        let attempt = ReservationAttempt::new(
            ShowId::new(),
            UserId::new(),
            vec!["A1".into(), "A2".into(), "A1".into()],
        );
        assert_eq!(attempt.duplicate_label().unwrap().as_str(), "A1");

        let clean = ReservationAttempt::new(ShowId::new(), UserId::new(), vec!["A1".into()]);
        assert!(clean.duplicate_label().is_none());
    }

    #[test]
    fn show_seat_lookup() {
        let show = Show::new(
            ShowId::new(),
            MovieId::new(),
            "Grand Odeon 3",
            "Springfield",
            Utc::now(),
            Money::from_cents(20_000),
            vec!["A1".into(), "A2".into()],
        );
        assert!(show.seat(&"A1".into()).is_some());
        assert!(show.seat(&"Z9".into()).is_none());
        assert!(show.booked_labels().is_empty());
    }
}
