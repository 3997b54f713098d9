//! Token issuance and validation.

pub mod jwt;
pub mod service;

pub use jwt::{AccessTokenClaims, ActivationTokenClaims, JwtError, JwtService};
pub use service::{TokenConfig, TokenService};
