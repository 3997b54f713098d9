//! # clinica-auth
//!
//! Authentication and access control for the Clinica administration
//! backend.
//!
//! This crate provides:
//! - Username/password login with Argon2id password hashing
//! - HS256 JWT access tokens and opaque, store-backed refresh tokens
//! - Password change and email-based account activation flows
//! - Role-based access control with permission and menu assignments
//! - Axum extractors and handlers for the `/api/auth` and `/api/roles`
//!   routes
//!
//! ## Overview
//!
//! The subsystem is split into stateless services over pluggable
//! storage traits. [`AuthService`] runs the credential and token flows,
//! [`RoleService`] manages role assignments, and the `middleware` and
//! `http` modules expose both over Axum. An in-memory storage backend
//! for tests and local runs lives in the `clinica-auth-memory` crate.
//!
//! ## Modules
//!
//! - [`config`] - Authentication configuration
//! - [`error`] - The crate-wide error type
//! - [`password`] - Argon2id password hashing and verification
//! - [`token`] - Token minting and validation
//! - [`service`] - Authentication flows (login, refresh, password change)
//! - [`rbac`] - Role and assignment management
//! - [`middleware`] - Bearer token extractor and error responses
//! - [`http`] - Axum handlers and router
//! - [`storage`] - Storage traits for auth-related data
//! - [`types`] - Shared domain types

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod password;
pub mod rbac;
pub mod service;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, ConfigError};
pub use error::AuthError;
pub use http::{AppState, router};
pub use middleware::{AuthContext, AuthState, BearerAuth};
pub use rbac::{RoleDetails, RoleService};
pub use service::{AuthService, TokenPair};
pub use storage::{
    AccountState, Menu, MenuStorage, Permission, PermissionStorage, RefreshTokenStorage, Role,
    RoleStorage, User, UserStorage,
};
pub use token::{JwtService, TokenConfig, TokenService};
pub use types::{RefreshToken, TokenKind};

/// Result type used throughout the crate.
pub type AuthResult<T> = Result<T, AuthError>;
