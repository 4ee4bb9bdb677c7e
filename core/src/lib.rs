//! Concurrency-safe seat reservation engine for a ticket-booking platform.
//!
//! The engine converts "user U wants seats S for show W" into either a
//! confirmed [`Booking`] or a precise conflict report, and guarantees that
//! no seat is ever sold twice no matter how many attempts race. It is built
//! from four collaborators wired together by the
//! [`ReservationCoordinator`]:
//!
//! - [`InventoryStore`]: authoritative seat booked-state with an atomic
//!   all-or-nothing commit ([`MemoryInventoryStore`] uses per-show
//!   optimistic versioning)
//! - [`BookingLedger`]: durable append-only record of confirmed bookings
//! - [`CacheInvalidator`]: best-effort bridge to an external read cache,
//!   signalled strictly after each durable commit
//! - [`IdempotencyCache`]: replay of retried identical attempts, scoped by
//!   user
//!
//! [`Booking`]: types::Booking
//! [`ReservationCoordinator`]: coordinator::ReservationCoordinator
//! [`InventoryStore`]: inventory::InventoryStore
//! [`MemoryInventoryStore`]: inventory::MemoryInventoryStore
//! [`BookingLedger`]: ledger::BookingLedger
//! [`CacheInvalidator`]: cache::CacheInvalidator
//! [`IdempotencyCache`]: idempotency::IdempotencyCache

pub mod cache;
pub mod coordinator;
pub mod error;
pub mod idempotency;
pub mod inventory;
pub mod ledger;
pub mod types;

pub use cache::{
    CacheInvalidator, NoopCacheInvalidator, RecordingCacheInvalidator, RedisCacheInvalidator,
};
pub use coordinator::{CoordinatorConfig, ReservationCoordinator};
pub use error::{CacheError, LedgerError, ReserveError, StoreError};
pub use idempotency::{IdempotencyCache, MemoryIdempotencyCache, RedisIdempotencyCache};
pub use inventory::{CommitResult, InventoryStore, MemoryInventoryStore};
pub use ledger::{BookingLedger, MemoryBookingLedger};
pub use types::{
    Booking, BookingId, IdempotencyKey, Money, MovieId, ReservationAttempt, Seat, SeatLabel, Show,
    ShowId, UserId,
};
