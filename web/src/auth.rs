//! Authentication extractors for the booking API.
//!
//! Identity is an external collaborator: the engine never issues or verifies
//! credentials itself. Handlers take an [`AuthenticatedUser`] parameter to
//! require authentication; the extractor pulls the bearer token from the
//! `Authorization` header and resolves it through the state's
//! [`IdentityProvider`].

use crate::error::AppError;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use marquee_core::UserId;
use std::collections::HashMap;

/// Bearer token extracted from `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
            })?
            .to_string();

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        Ok(Self(token))
    }
}

/// Resolves bearer tokens to user identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the user a token belongs to, or `None` for an unknown or
    /// expired token.
    async fn resolve(&self, token: &str) -> Option<UserId>;
}

/// Fixed token-to-user mapping for development and tests.
pub struct StaticTokenIdentity {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenIdentity {
    /// Creates an empty mapping (every request is rejected).
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    /// Registers a token for a user.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, user_id: UserId) -> Self {
        self.tokens.insert(token.into(), user_id);
        self
    }
}

impl Default for StaticTokenIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentity {
    async fn resolve(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).copied()
    }
}

/// Authenticated request user.
///
/// Use this as a handler parameter to require authentication.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    /// The authenticated user ID
    pub user_id: UserId,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;

        let user_id = state
            .identity
            .resolve(&bearer.0)
            .await
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

        Ok(Self { user_id })
    }
}
