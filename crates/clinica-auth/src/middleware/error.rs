//! Error response handling for authentication endpoints.
//!
//! This module implements `IntoResponse` for `AuthError` so handlers
//! and extractors can bubble errors straight out of a route.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = error_details(&self);

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = format!("Bearer error=\"{code}\", error_description=\"{message}\"");
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Maps an `AuthError` onto (HTTP status, machine code, client message).
///
/// Server-side failures collapse into a generic message; their detail
/// goes to the log, never to the client.
fn error_details(error: &AuthError) -> (StatusCode, &'static str, String) {
    match error {
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid username or password".to_string(),
        ),
        AuthError::InvalidToken { message } => (
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            message.clone(),
        ),
        AuthError::TokenExpired => (
            StatusCode::UNAUTHORIZED,
            "token_expired",
            "Token has expired".to_string(),
        ),
        AuthError::Unauthorized { message } => {
            (StatusCode::UNAUTHORIZED, "unauthorized", message.clone())
        }
        AuthError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{resource} not found: {id}"),
        ),
        AuthError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message.clone())
        }
        AuthError::Storage { .. } | AuthError::Internal { .. } | AuthError::Configuration { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error".to_string(),
        ),
    }
}
