//! Application assembly.
//!
//! Builds the service graph (storages, token services, auth and role
//! services) and the Axum router from a loaded configuration.

use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use clinica_auth::http::AppState;
use clinica_auth::middleware::AuthState;
use clinica_auth::rbac::RoleService;
use clinica_auth::service::AuthService;
use clinica_auth::token::{JwtService, TokenConfig, TokenService};
use clinica_auth_memory::{
    InMemoryMenuStorage, InMemoryPermissionStorage, InMemoryRefreshTokenStorage,
    InMemoryRoleStorage, InMemoryUserStorage,
};

use crate::config::ServerConfig;

/// The assembled application: the router plus the storages the startup
/// code still needs to reach (seeding).
pub struct App {
    /// The fully wired router.
    pub router: Router,

    /// The user store, exposed for startup seeding.
    pub user_storage: Arc<InMemoryUserStorage>,
}

/// Wires storages and services into a ready-to-serve router.
#[must_use]
pub fn build(config: &ServerConfig) -> App {
    let user_storage = Arc::new(InMemoryUserStorage::new());
    let refresh_token_storage = Arc::new(InMemoryRefreshTokenStorage::new());
    let role_storage = Arc::new(InMemoryRoleStorage::new());
    let permission_storage = Arc::new(InMemoryPermissionStorage::new());
    let menu_storage = Arc::new(InMemoryMenuStorage::new());

    let jwt_service = Arc::new(JwtService::new(
        &config.auth.signing.secret,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
    ));
    let token_service = Arc::new(TokenService::new(
        jwt_service.clone(),
        TokenConfig::from_auth_config(&config.auth),
    ));

    let auth_service = Arc::new(AuthService::new(
        token_service,
        user_storage.clone(),
        refresh_token_storage,
    ));
    let role_service = Arc::new(RoleService::new(
        role_storage,
        permission_storage,
        menu_storage,
    ));
    let auth_state = AuthState::new(jwt_service, user_storage.clone());

    let state = AppState {
        auth_service,
        role_service,
        auth_state,
    };

    let router = clinica_auth::http::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    App {
        router,
        user_storage,
    }
}
