//! Axum middleware for bearer token authentication.

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{AuthState, BearerAuth};
pub use types::AuthContext;
