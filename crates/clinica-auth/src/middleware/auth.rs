//! Bearer token authentication extractor.
//!
//! This module provides the Axum extractor that validates Bearer tokens
//! and builds the authentication context for protected handlers.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use clinica_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("Hello, {}!", auth.username())
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(auth_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::storage::UserStorage;
use crate::token::jwt::{AccessTokenClaims, JwtService};

use super::types::AuthContext;

// =============================================================================
// Auth State
// =============================================================================

/// State required for bearer token authentication.
///
/// Include this in your application state and expose it to the
/// `BearerAuth` extractor via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,

    /// User storage for resolving the token subject.
    pub user_storage: Arc<dyn UserStorage>,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(jwt_service: Arc<JwtService>, user_storage: Arc<dyn UserStorage>) -> Self {
        Self {
            jwt_service,
            user_storage,
        }
    }
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor that validates Bearer tokens and builds auth context.
///
/// This extractor:
/// 1. Extracts the `Authorization: Bearer <token>` header
/// 2. Decodes and fully validates the JWT (signature, issuer, audience,
///    expiry, HS256 header)
/// 3. Resolves the subject username to a stored user
/// 4. Verifies the account is still active
///
/// # Errors
///
/// Returns `AuthError` (which implements `IntoResponse`) if the header
/// is missing or malformed, the token fails any check, or the account
/// is gone or inactive.
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::unauthorized("Missing Authorization header"))?;

        let claims = auth_state
            .jwt_service
            .decode::<AccessTokenClaims>(token)
            .map_err(|e| {
                tracing::debug!(error = %e, "failed to validate bearer token");
                AuthError::from(e)
            })?
            .claims;

        let user = auth_state
            .user_storage
            .find_by_username(&claims.name)
            .await?
            .ok_or_else(|| {
                tracing::warn!(subject = %claims.name, "token subject no longer exists");
                AuthError::invalid_token("Unknown subject")
            })?;

        if !user.is_active() {
            tracing::warn!(subject = %claims.name, "token subject is inactive");
            return Err(AuthError::invalid_token("Account is inactive"));
        }

        tracing::debug!(subject = %claims.name, jti = %claims.jti, "bearer token validated");

        Ok(BearerAuth(AuthContext {
            token_claims: Arc::new(claims),
            user,
        }))
    }
}
