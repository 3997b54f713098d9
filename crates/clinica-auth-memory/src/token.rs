//! In-memory refresh token storage.

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use clinica_auth::AuthResult;
use clinica_auth::error::AuthError;
use clinica_auth::storage::RefreshTokenStorage;
use clinica_auth::types::RefreshToken;

/// In-memory implementation of [`RefreshTokenStorage`].
///
/// Records are keyed by token hash, which is the hot lookup path; the
/// id-based and user-based operations scan.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStorage {
    tokens: DashMap<String, RefreshToken>,
}

impl InMemoryRefreshTokenStorage {
    /// Creates an empty refresh token storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records, live or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl RefreshTokenStorage for InMemoryRefreshTokenStorage {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        self.tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.tokens.get(token_hash).map(|entry| entry.clone()))
    }

    async fn revoke(&self, token_id: Uuid) -> AuthResult<()> {
        let mut found = false;
        for mut entry in self.tokens.iter_mut() {
            if entry.id == token_id {
                if entry.revoked_at.is_none() {
                    entry.revoked_at = Some(OffsetDateTime::now_utc());
                }
                found = true;
                break;
            }
        }
        if !found {
            return Err(AuthError::not_found("RefreshToken", token_id.to_string()));
        }
        Ok(())
    }

    async fn revoke_by_user(&self, user_id: Uuid) -> AuthResult<u64> {
        let now = OffsetDateTime::now_utc();
        let mut count = 0u64;
        for mut entry in self.tokens.iter_mut() {
            if entry.user_id == user_id && entry.revoked_at.is_none() {
                entry.revoked_at = Some(now);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| !token.is_expired());
        Ok((before - self.tokens.len()) as u64)
    }
}
