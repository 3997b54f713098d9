//! HTTP surface for the authentication subsystem.
//!
//! Assembles the `/api/auth` and `/api/roles` routes over a shared
//! [`AppState`]. The host application nests [`router`] into its own
//! router and supplies the state.

pub mod auth;
pub mod role;

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};

use crate::middleware::AuthState;
use crate::rbac::RoleService;
use crate::service::AuthService;

/// Shared state for the authentication routes.
#[derive(Clone)]
pub struct AppState {
    /// Authentication flows.
    pub auth_service: Arc<AuthService>,

    /// Role management.
    pub role_service: Arc<RoleService>,

    /// Bearer token validation state.
    pub auth_state: AuthState,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth_state.clone()
    }
}

/// Builds the authentication and role-management router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh-token", post(auth::refresh_token))
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/auth/activate", post(auth::activate))
        .route("/api/roles", post(role::create_role))
        .route("/api/roles/{id}", get(role::get_role).put(role::update_role))
        .with_state(state)
}
