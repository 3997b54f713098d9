//! Domain types shared across the auth module.

pub mod refresh_token;

pub use refresh_token::{RefreshToken, TokenKind};
