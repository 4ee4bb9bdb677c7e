//! HTTP surface for the marquee seat-reservation engine.
//!
//! Exposes the reservation coordinator over a small authenticated API:
//! `POST /bookings` to reserve seats and `GET /bookings/me` to list the
//! caller's bookings, plus unauthenticated health checks.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{AuthenticatedUser, BearerToken, IdentityProvider, StaticTokenIdentity};
pub use config::Config;
pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;
