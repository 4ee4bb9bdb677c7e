//! API endpoint handlers.

pub mod bookings;
