//! Storage traits for authentication data.
//!
//! These traits define the persistence boundary of the auth subsystem.
//! Backends implement them against their own datastore; the in-memory
//! backend used by the test suite and local development lives in the
//! `clinica-auth-memory` crate.

pub mod menu;
pub mod refresh_token;
pub mod role;
pub mod user;

pub use menu::{Menu, MenuStorage};
pub use refresh_token::RefreshTokenStorage;
pub use role::{Permission, PermissionStorage, Role, RoleStorage};
pub use user::{AccountState, User, UserStorage};
