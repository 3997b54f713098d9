//! Refresh token domain type.
//!
//! A refresh token is an opaque, server-tracked credential exchanged for
//! a new access token without re-entering a password.
//!
//! # Storage Security
//!
//! The opaque value itself is never persisted. Only a SHA-256 hash is
//! stored, similar to password storage. Validating a presented token:
//!
//! 1. Hash the incoming value
//! 2. Look up by hash
//! 3. Check `is_valid()` (expiration and revocation)

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// The class of a stored token.
///
/// Only session tokens exist today; the tag is persisted so other token
/// classes can be introduced without a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// A login-session refresh token.
    Session,
}

/// Refresh token record as persisted by the token store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// Unique identifier for this token record.
    pub id: Uuid,

    /// The user this token was issued to.
    pub user_id: Uuid,

    /// SHA-256 hash of the opaque token value.
    /// The plaintext value is returned to the client but never stored.
    pub token_hash: String,

    /// Token class tag.
    pub kind: TokenKind,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When this token was revoked (None = not revoked).
    ///
    /// Only rotation sets this; there is no standalone revocation flow.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

impl RefreshToken {
    /// Creates a new session token record for a user.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owning user
    /// * `token_hash` - SHA-256 hash of the opaque value
    /// * `lifetime` - How long the token stays valid from now
    #[must_use]
    pub fn new_session(user_id: Uuid, token_hash: String, lifetime: time::Duration) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            kind: TokenKind::Session,
            created_at: now,
            expires_at: now
                .checked_add(lifetime)
                .unwrap_or(time::PrimitiveDateTime::MAX.assume_utc()),
            revoked_at: None,
        }
    }

    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if this token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if this token is valid (not expired, not revoked).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }

    /// Hash a token value using SHA-256.
    ///
    /// Used both when storing new tokens and when looking up presented
    /// tokens for validation.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Generate a cryptographically secure random token value.
    ///
    /// Returns 32 random bytes encoded as base64url (43 characters).
    #[must_use]
    pub fn generate_token() -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
