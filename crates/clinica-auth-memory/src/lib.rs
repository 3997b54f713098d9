//! In-memory storage backend for the Clinica authentication module.
//!
//! This crate implements the storage traits from `clinica-auth` over
//! concurrent in-process maps. It backs the test suite and local
//! development runs; production deployments use a database-backed
//! implementation.
//!
//! # Example
//!
//! ```ignore
//! use clinica_auth_memory::InMemoryUserStorage;
//! use clinica_auth::storage::{User, UserStorage};
//!
//! let storage = InMemoryUserStorage::new();
//! storage.create(&user).await?;
//! let found = storage.find_by_username("drperez").await?;
//! ```

pub mod rbac;
pub mod token;
pub mod user;

pub use rbac::{InMemoryMenuStorage, InMemoryPermissionStorage, InMemoryRoleStorage};
pub use token::InMemoryRefreshTokenStorage;
pub use user::InMemoryUserStorage;
