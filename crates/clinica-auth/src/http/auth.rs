//! Authentication endpoint handlers.
//!
//! Handlers for the `/api/auth` routes: login, token refresh, password
//! change, and account activation. Request and response bodies use the
//! camelCase field names the frontend expects.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::middleware::BearerAuth;
use crate::service::TokenPair;

use super::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username to authenticate.
    pub user_name: String,

    /// Plaintext password.
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// The opaque refresh token value.
    pub refresh_token: String,
}

/// Password change request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Username whose password is being changed.
    pub user_name: String,

    /// The user's current password.
    pub current_password: String,

    /// The desired new password.
    pub new_password: String,
}

/// Account activation request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    /// The activation token from the emailed link.
    pub token: String,
}

/// Token pair response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Signed JWT access token.
    pub access_token: String,

    /// Opaque refresh token value.
    pub refresh_token: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

/// Confirmation body for state-changing endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation text.
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/auth/login`
///
/// Authenticates a user and returns a fresh token pair. All credential
/// failures produce the same 401 response.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let pair = state
        .auth_service
        .login(&request.user_name, &request.password)
        .await?;
    Ok(Json(pair.into()))
}

/// `POST /api/auth/refresh-token`
///
/// Exchanges a live refresh token for a fresh pair. Identity comes
/// from the stored token's owner.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let pair = state.auth_service.refresh(&request.refresh_token).await?;
    Ok(Json(pair.into()))
}

/// `POST /api/auth/change-password`
///
/// Changes a user's password. Requires a valid bearer token, and the
/// named user must be the caller. Returns 200 with a confirmation
/// message; every failure of the change itself is a 400.
pub async fn change_password(
    State(state): State<AppState>,
    BearerAuth(auth): BearerAuth,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    if request.user_name != auth.username() {
        return Err(AuthError::validation(
            "Password can only be changed for the authenticated user",
        ));
    }
    let outcome = state
        .auth_service
        .change_password(
            &request.user_name,
            &request.current_password,
            &request.new_password,
        )
        .await;
    match outcome {
        Ok(()) => Ok(Json(MessageResponse {
            message: "Password updated successfully".to_string(),
        })),
        // A rejected current password surfaces as a 400, not a 401.
        Err(AuthError::Unauthorized { message }) => Err(AuthError::validation(message)),
        Err(err) => Err(err),
    }
}

/// `POST /api/auth/activate`
///
/// Activates the account named by a valid activation token.
pub async fn activate(
    State(state): State<AppState>,
    Json(request): Json<ActivateRequest>,
) -> Result<(), AuthError> {
    state.auth_service.activate(&request.token).await
}
