//! Authentication configuration.
//!
//! This module provides the configuration types for the auth module:
//! token signing, issuer/audience identity, and token lifetimes.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! issuer = "https://clinica.example.com"
//! audience = "https://clinica.example.com/api"
//!
//! [auth.signing]
//! secret = "change-me-64-chars-minimum................................."
//!
//! [auth.tokens]
//! access_token_lifetime = "30m"
//! refresh_token_lifetime = "7d"
//! activation_token_lifetime = "3m"
//! refresh_token_rotation = false
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum accepted length for the HMAC signing secret, in bytes.
///
/// Anything shorter than the HMAC-SHA256 block size weakens the key;
/// 32 bytes is the floor for a 256-bit security level.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Root authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Server issuer URL (used in token `iss` claim).
    pub issuer: String,

    /// Audience URL (used in token `aud` claim and enforced on decode).
    pub audience: String,

    /// Token signing configuration.
    pub signing: SigningConfig,

    /// Token lifetime configuration.
    pub tokens: TokenLifetimeConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            audience: "http://localhost:8080/api".to_string(),
            signing: SigningConfig::default(),
            tokens: TokenLifetimeConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the signing secret is missing or too
    /// short, or if any lifetime is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::MissingField { field: "issuer" });
        }
        if self.audience.is_empty() {
            return Err(ConfigError::MissingField { field: "audience" });
        }
        self.signing.validate()?;
        self.tokens.validate()?;
        Ok(())
    }
}

/// Token signing configuration.
///
/// All token classes (access, activation) are signed with the same
/// HMAC-SHA256 secret. The secret lives only here; swapping in distinct
/// keys per token class is a change local to this section and the
/// `JwtService` constructor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Symmetric HMAC-SHA256 signing secret.
    ///
    /// Must be at least [`MIN_SECRET_LENGTH`] bytes. There is no default
    /// in production; the empty default only exists so partial config
    /// files deserialize, and `validate()` rejects it.
    pub secret: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
        }
    }
}

impl SigningConfig {
    /// Validates the signing configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the secret is missing or shorter than
    /// [`MIN_SECRET_LENGTH`] bytes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::MissingField {
                field: "signing.secret",
            });
        }
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort {
                length: self.secret.len(),
                minimum: MIN_SECRET_LENGTH,
            });
        }
        Ok(())
    }
}

/// Token lifetime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenLifetimeConfig {
    /// Access token lifetime.
    /// Short-lived; the token is self-contained and cannot be revoked.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime, tracked in the token store.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Activation token lifetime.
    /// Very short; the token only has to survive an email round-trip click.
    #[serde(with = "humantime_serde")]
    pub activation_token_lifetime: Duration,

    /// Rotate refresh tokens on use.
    ///
    /// When enabled, each refresh revokes the presented token and issues
    /// a replacement, which limits the replay window of a stolen token.
    /// When disabled, the same opaque value stays valid until it expires.
    pub refresh_token_rotation: bool,
}

impl Default for TokenLifetimeConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(30 * 60),
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 3600),
            activation_token_lifetime: Duration::from_secs(3 * 60),
            refresh_token_rotation: false,
        }
    }
}

impl TokenLifetimeConfig {
    /// Validates the lifetime configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any lifetime is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, lifetime) in [
            ("tokens.access_token_lifetime", self.access_token_lifetime),
            ("tokens.refresh_token_lifetime", self.refresh_token_lifetime),
            (
                "tokens.activation_token_lifetime",
                self.activation_token_lifetime,
            ),
        ] {
            if lifetime.is_zero() {
                return Err(ConfigError::ZeroLifetime { field });
            }
        }
        Ok(())
    }
}

/// Errors produced by configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required field is missing or empty.
    #[error("Missing required config field: {field}")]
    MissingField {
        /// The missing field's path.
        field: &'static str,
    },

    /// The signing secret is too short to be safe.
    #[error("Signing secret is {length} bytes; minimum is {minimum}")]
    SecretTooShort {
        /// Actual secret length.
        length: usize,
        /// Required minimum length.
        minimum: usize,
    },

    /// A token lifetime is configured as zero.
    #[error("Token lifetime must be non-zero: {field}")]
    ZeroLifetime {
        /// The offending field's path.
        field: &'static str,
    },
}
