//! Business metrics for the reservation engine.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `marquee_reservations_total{outcome}` - Reservation attempts by outcome
//!   (committed, conflict, invalid, `not_found`, replayed, unknown,
//!   `partial_failure`)

use metrics::describe_counter;

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics
/// are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "marquee_reservations_total",
        "Total number of reservation attempts by outcome"
    );

    tracing::info!("Business metrics registered");
}
