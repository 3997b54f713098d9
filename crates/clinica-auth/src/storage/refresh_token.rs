//! Refresh token storage trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::RefreshToken;

/// Storage operations for refresh tokens.
///
/// Implementations persist only SHA-256 hashes of token values; the
/// opaque value handed to the client never reaches this layer in
/// plaintext form except as the lookup key, already hashed by the
/// caller.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Persist a new refresh token record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Look up a token record by its SHA-256 hash.
    ///
    /// Returns `None` if no record matches. Callers are responsible for
    /// the expiry and revocation checks; a returned record is not
    /// necessarily still valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Mark a single token record as revoked.
    ///
    /// Revoking an already-revoked token is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if no record with the given id
    /// exists, or a storage error if the operation fails.
    async fn revoke(&self, token_id: Uuid) -> AuthResult<()>;

    /// Revoke every live token belonging to a user.
    ///
    /// Returns the number of tokens revoked. Used for operator-driven
    /// session invalidation; routine password changes do not call this.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke_by_user(&self, user_id: Uuid) -> AuthResult<u64>;

    /// Delete records that expired before now.
    ///
    /// Returns the number of records removed. Intended for a periodic
    /// maintenance sweep; correctness never depends on it running.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
