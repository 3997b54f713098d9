//! Token service for issuing and validating tokens.
//!
//! This module sits between the raw JWT layer and the auth flows. It
//! owns the token lifetimes and knows how to mint each token class:
//!
//! - Access tokens for an authenticated user
//! - Opaque refresh token values (paired with a store record)
//! - Activation tokens bound to an email address
//!
//! # Usage
//!
//! ```ignore
//! use clinica_auth::token::{TokenConfig, TokenService};
//!
//! let config = TokenConfig::from_auth_config(&auth_config);
//! let service = TokenService::new(jwt_service, config);
//!
//! let access = service.issue_access_token(&user)?;
//! let (value, record) = service.issue_refresh_token(user.id);
//! ```

use std::sync::Arc;

use time::Duration;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::storage::User;
use crate::token::jwt::{
    AccessTokenClaims, ActivationTokenClaims, JwtError, JwtService, now_timestamp,
};
use crate::types::RefreshToken;

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            JwtError::EncodingError { message } => Self::internal(message),
            other => Self::invalid_token(other.to_string()),
        }
    }
}

/// Configuration for the token service.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Access token lifetime.
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    pub refresh_token_lifetime: Duration,

    /// Activation token lifetime.
    pub activation_token_lifetime: Duration,

    /// Whether to rotate refresh tokens on use.
    /// When true, the presented token is revoked and a new one issued.
    /// When false, the same opaque value is reused until it expires.
    pub rotate_refresh_tokens: bool,
}

impl TokenConfig {
    /// Builds a token configuration from the validated auth config.
    #[must_use]
    pub fn from_auth_config(config: &AuthConfig) -> Self {
        Self {
            access_token_lifetime: to_duration(config.tokens.access_token_lifetime),
            refresh_token_lifetime: to_duration(config.tokens.refresh_token_lifetime),
            activation_token_lifetime: to_duration(config.tokens.activation_token_lifetime),
            rotate_refresh_tokens: config.tokens.refresh_token_rotation,
        }
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Sets whether to rotate refresh tokens on use.
    #[must_use]
    pub fn with_rotate_refresh_tokens(mut self, rotate: bool) -> Self {
        self.rotate_refresh_tokens = rotate;
        self
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::from_auth_config(&AuthConfig::default())
    }
}

fn to_duration(lifetime: std::time::Duration) -> Duration {
    // Saturate rather than wrap negative on absurd configured lifetimes.
    Duration::seconds(i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX))
}

/// Service for minting and validating Clinica tokens.
pub struct TokenService {
    /// JWT service for encoding/decoding signed tokens.
    jwt_service: Arc<JwtService>,

    /// Service configuration.
    config: TokenConfig,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(jwt_service: Arc<JwtService>, config: TokenConfig) -> Self {
        Self {
            jwt_service,
            config,
        }
    }

    /// Issues a signed access token for an authenticated user.
    ///
    /// The subject claim is the username; the role claim is the user's
    /// role name when one is assigned and absent otherwise. Every call
    /// produces a fresh `jti`.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue_access_token(&self, user: &User) -> Result<String, AuthError> {
        let now = now_timestamp();
        let claims = AccessTokenClaims {
            iss: self.jwt_service.issuer().to_string(),
            name: user.username.clone(),
            aud: self.jwt_service.audience().to_string(),
            exp: now.saturating_add(self.config.access_token_lifetime.whole_seconds()),
            iat: now,
            jti: Uuid::new_v4().to_string(),
            role: user.role_name.clone(),
        };
        Ok(self.jwt_service.encode(&claims)?)
    }

    /// Generates a new opaque refresh token for a user.
    ///
    /// Returns the plaintext value to hand to the client together with
    /// the store record holding its hash. The plaintext is never
    /// persisted; this is the only moment it exists server-side.
    #[must_use]
    pub fn issue_refresh_token(&self, user_id: Uuid) -> (String, RefreshToken) {
        let value = RefreshToken::generate_token();
        let record = RefreshToken::new_session(
            user_id,
            RefreshToken::hash_token(&value),
            self.config.refresh_token_lifetime,
        );
        (value, record)
    }

    /// Issues a short-lived activation token bound to an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue_activation_token(&self, email: &str) -> Result<String, AuthError> {
        let now = now_timestamp();
        let claims = ActivationTokenClaims {
            iss: self.jwt_service.issuer().to_string(),
            aud: self.jwt_service.audience().to_string(),
            exp: now.saturating_add(self.config.activation_token_lifetime.whole_seconds()),
            iat: now,
            jti: Uuid::new_v4().to_string(),
            email: email.to_string(),
        };
        Ok(self.jwt_service.encode(&claims)?)
    }

    /// Decodes and fully validates an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for an expired token and
    /// `AuthError::InvalidToken` for any other failed check.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        Ok(self.jwt_service.decode::<AccessTokenClaims>(token)?.claims)
    }

    /// Decodes an access token while tolerating an elapsed expiry.
    ///
    /// For callers that need the claims of a stale token without
    /// trusting it as fresh. All other checks still apply.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if any non-lifetime check fails.
    pub fn verify_access_token_allow_expired(
        &self,
        token: &str,
    ) -> Result<AccessTokenClaims, AuthError> {
        Ok(self
            .jwt_service
            .decode_allow_expired::<AccessTokenClaims>(token)?
            .claims)
    }

    /// Decodes and fully validates an activation token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for an expired token and
    /// `AuthError::InvalidToken` for any other failed check.
    pub fn verify_activation_token(
        &self,
        token: &str,
    ) -> Result<ActivationTokenClaims, AuthError> {
        Ok(self
            .jwt_service
            .decode::<ActivationTokenClaims>(token)?
            .claims)
    }

    /// Returns the service configuration.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }
}
