//! Authentication flows.
//!
//! [`AuthService`] orchestrates the credential and token flows: login,
//! token refresh, password change, and account activation. It owns no
//! state of its own; users and refresh tokens live behind the storage
//! traits, signing behind [`TokenService`].
//!
//! # Usage
//!
//! ```ignore
//! use clinica_auth::service::AuthService;
//!
//! let auth = AuthService::new(token_service, user_storage, refresh_token_storage);
//! let pair = auth.login("drperez", "Secret123").await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::storage::{RefreshTokenStorage, UserStorage};
use crate::storage::user::AccountState;
use crate::token::TokenService;
use crate::types::RefreshToken;

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed JWT access token.
    pub access_token: String,

    /// Opaque refresh token value.
    pub refresh_token: String,
}

/// Orchestrates authentication flows over pluggable storage.
pub struct AuthService {
    /// Token minting and validation.
    token_service: Arc<TokenService>,

    /// User storage.
    user_storage: Arc<dyn UserStorage>,

    /// Refresh token storage.
    refresh_token_storage: Arc<dyn RefreshTokenStorage>,
}

impl AuthService {
    /// Creates a new authentication service.
    #[must_use]
    pub fn new(
        token_service: Arc<TokenService>,
        user_storage: Arc<dyn UserStorage>,
        refresh_token_storage: Arc<dyn RefreshTokenStorage>,
    ) -> Self {
        Self {
            token_service,
            user_storage,
            refresh_token_storage,
        }
    }

    /// Authenticates a user and issues a fresh token pair.
    ///
    /// The username match is exact and case-sensitive. A missing user,
    /// an inactive account, and a wrong password all collapse into the
    /// same `InvalidCredentials` error so the response never reveals
    /// which part failed.
    ///
    /// Every successful login persists a new refresh token record;
    /// earlier sessions for the same user stay valid.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when authentication
    /// fails, or a storage error if persistence fails.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<TokenPair> {
        let Some(user) = self.user_storage.find_by_username(username).await? else {
            tracing::warn!(username, "login rejected: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active() {
            tracing::warn!(username, "login rejected: inactive account");
            return Err(AuthError::InvalidCredentials);
        }

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(username, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.token_service.issue_access_token(&user)?;
        let (refresh_token, record) = self.token_service.issue_refresh_token(user.id);
        self.refresh_token_storage.create(&record).await?;

        tracing::info!(username, user_id = %user.id, "user logged in");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a live refresh token for a fresh token pair.
    ///
    /// Identity is resolved from the stored refresh token record: the
    /// new access token is minted for the record's owning user, never
    /// from any claims the caller presents.
    ///
    /// With rotation disabled (the default) the same refresh token
    /// value is returned and the stored record is untouched. With
    /// rotation enabled the presented token is revoked and a
    /// replacement issued.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for an unrecognized or revoked
    /// token, `AuthError::TokenExpired` when the refresh token has
    /// expired, and `AuthError::InvalidCredentials` when the owning
    /// account is gone or inactive.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let hash = RefreshToken::hash_token(refresh_token);
        let Some(record) = self.refresh_token_storage.find_by_hash(&hash).await? else {
            tracing::warn!("refresh rejected: unknown refresh token");
            return Err(AuthError::invalid_token("Refresh token not recognized"));
        };

        if record.is_revoked() {
            tracing::warn!(token_id = %record.id, "refresh rejected: token revoked");
            return Err(AuthError::invalid_token("Refresh token has been revoked"));
        }
        if record.is_expired() {
            tracing::warn!(token_id = %record.id, "refresh rejected: token expired");
            return Err(AuthError::TokenExpired);
        }

        let Some(user) = self.user_storage.find_by_id(record.user_id).await? else {
            tracing::warn!(user_id = %record.user_id, "refresh rejected: owner missing");
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active() {
            tracing::warn!(username = %user.username, "refresh rejected: inactive account");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.token_service.issue_access_token(&user)?;

        let refresh_token = if self.token_service.config().rotate_refresh_tokens {
            let (value, replacement) = self.token_service.issue_refresh_token(user.id);
            self.refresh_token_storage.create(&replacement).await?;
            self.refresh_token_storage.revoke(record.id).await?;
            value
        } else {
            refresh_token.to_string()
        };

        tracing::debug!(username = %user.username, "access token refreshed");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Changes a user's password after re-verifying the current one.
    ///
    /// The new password is hashed with Argon2id before storage. Existing
    /// access and refresh tokens are NOT revoked by this operation;
    /// operators who need that call [`revoke_sessions`](Self::revoke_sessions).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` for an unknown user or a wrong
    /// current password (the two collapse so the response never reveals
    /// which), and `AuthError::Validation` when the new password is too
    /// short.
    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let Some(user) = self.user_storage.find_by_username(username).await? else {
            tracing::warn!(username, "password change rejected: unknown username");
            return Err(AuthError::unauthorized("Current password is incorrect"));
        };

        if !verify_password(current_password, &user.password_hash)? {
            tracing::warn!(username, "password change rejected: wrong current password");
            return Err(AuthError::unauthorized("Current password is incorrect"));
        }

        let new_hash = hash_password(new_password)?;
        self.user_storage
            .update_password_hash(user.id, &new_hash)
            .await?;

        tracing::info!(username, "password changed");
        Ok(())
    }

    /// Activates the account named by a valid activation token.
    ///
    /// The token proves control of the email address it carries; the
    /// matching account is flipped to the active state.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` or `AuthError::InvalidToken`
    /// for a bad token, and `AuthError::NotFound` when no account holds
    /// the email.
    pub async fn activate(&self, activation_token: &str) -> AuthResult<()> {
        let claims = self.token_service.verify_activation_token(activation_token)?;

        let Some(user) = self.user_storage.find_by_email(&claims.email).await? else {
            return Err(AuthError::not_found("User", claims.email));
        };

        self.user_storage
            .set_state(user.id, AccountState::Active)
            .await?;

        tracing::info!(username = %user.username, "account activated");
        Ok(())
    }

    /// Revokes every live refresh token for a user.
    ///
    /// Operator-facing session invalidation. Returns the number of
    /// tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn revoke_sessions(&self, user_id: Uuid) -> AuthResult<u64> {
        let revoked = self.refresh_token_storage.revoke_by_user(user_id).await?;
        tracing::info!(%user_id, revoked, "revoked user sessions");
        Ok(revoked)
    }

    /// Returns the token service.
    #[must_use]
    pub fn token_service(&self) -> &Arc<TokenService> {
        &self.token_service
    }

    /// Returns the user storage.
    #[must_use]
    pub fn user_storage(&self) -> &Arc<dyn UserStorage> {
        &self.user_storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::User;
    use crate::token::{JwtService, TokenConfig};
    use std::collections::HashMap;
    use std::sync::RwLock;
    use time::OffsetDateTime;

    /// Mock user storage for testing.
    struct MockUserStorage {
        users: RwLock<Vec<User>>,
    }

    impl MockUserStorage {
        fn new() -> Self {
            Self {
                users: RwLock::new(Vec::new()),
            }
        }

        fn with_user(user: User) -> Self {
            let storage = Self::new();
            storage.users.write().unwrap().push(user);
            storage
        }
    }

    #[async_trait::async_trait]
    impl UserStorage for MockUserStorage {
        async fn find_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>> {
            Ok(self
                .users
                .read()
                .unwrap()
                .iter()
                .find(|u| u.id == user_id)
                .cloned())
        }

        async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
            Ok(self
                .users
                .read()
                .unwrap()
                .iter()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
            Ok(self
                .users
                .read()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn create(&self, user: &User) -> AuthResult<()> {
            self.users.write().unwrap().push(user.clone());
            Ok(())
        }

        async fn update_password_hash(
            &self,
            user_id: Uuid,
            password_hash: &str,
        ) -> AuthResult<()> {
            let mut users = self.users.write().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or_else(|| AuthError::not_found("User", user_id.to_string()))?;
            user.password_hash = password_hash.to_string();
            Ok(())
        }

        async fn set_state(&self, user_id: Uuid, state: AccountState) -> AuthResult<()> {
            let mut users = self.users.write().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or_else(|| AuthError::not_found("User", user_id.to_string()))?;
            user.state = state;
            Ok(())
        }
    }

    /// Mock refresh token storage for testing.
    struct MockRefreshTokenStorage {
        tokens: RwLock<HashMap<String, RefreshToken>>,
    }

    impl MockRefreshTokenStorage {
        fn new() -> Self {
            Self {
                tokens: RwLock::new(HashMap::new()),
            }
        }

        fn count(&self) -> usize {
            self.tokens.read().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl RefreshTokenStorage for MockRefreshTokenStorage {
        async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
            self.tokens
                .write()
                .unwrap()
                .insert(token.token_hash.clone(), token.clone());
            Ok(())
        }

        async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
            Ok(self.tokens.read().unwrap().get(token_hash).cloned())
        }

        async fn revoke(&self, token_id: Uuid) -> AuthResult<()> {
            let mut tokens = self.tokens.write().unwrap();
            let token = tokens
                .values_mut()
                .find(|t| t.id == token_id)
                .ok_or_else(|| AuthError::not_found("RefreshToken", token_id.to_string()))?;
            if token.revoked_at.is_none() {
                token.revoked_at = Some(OffsetDateTime::now_utc());
            }
            Ok(())
        }

        async fn revoke_by_user(&self, user_id: Uuid) -> AuthResult<u64> {
            let mut tokens = self.tokens.write().unwrap();
            let mut count = 0u64;
            for token in tokens.values_mut() {
                if token.user_id == user_id && token.revoked_at.is_none() {
                    token.revoked_at = Some(OffsetDateTime::now_utc());
                    count += 1;
                }
            }
            Ok(count)
        }

        async fn cleanup_expired(&self) -> AuthResult<u64> {
            let mut tokens = self.tokens.write().unwrap();
            let before = tokens.len();
            tokens.retain(|_, t| !t.is_expired());
            Ok((before - tokens.len()) as u64)
        }
    }

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new(
            "test-secret-test-secret-test-secret-0001",
            "https://clinica.example.com",
            "https://clinica.example.com/api",
        ))
    }

    fn test_user(password: &str) -> User {
        User::new(
            "drperez",
            "drperez@clinica.example.com",
            "12345678",
            hash_password(password).unwrap(),
        )
        .with_role(Uuid::new_v4(), "Doctor")
    }

    struct Fixture {
        auth: AuthService,
        users: Arc<MockUserStorage>,
        tokens: Arc<MockRefreshTokenStorage>,
    }

    fn fixture_with_config(user: User, config: TokenConfig) -> Fixture {
        let users = Arc::new(MockUserStorage::with_user(user));
        let tokens = Arc::new(MockRefreshTokenStorage::new());
        let token_service = Arc::new(TokenService::new(jwt(), config));
        let auth = AuthService::new(token_service, users.clone(), tokens.clone());
        Fixture {
            auth,
            users,
            tokens,
        }
    }

    fn fixture(user: User) -> Fixture {
        fixture_with_config(user, TokenConfig::default())
    }

    #[tokio::test]
    async fn test_login_issues_token_pair() {
        let fx = fixture(test_user("Secret123"));

        let pair = fx.auth.login("drperez", "Secret123").await.unwrap();

        let claims = fx
            .auth
            .token_service()
            .verify_access_token(&pair.access_token)
            .unwrap();
        assert_eq!(claims.name, "drperez");
        assert_eq!(claims.role.as_deref(), Some("Doctor"));
        assert_eq!(pair.refresh_token.len(), 43);
        assert_eq!(fx.tokens.count(), 1);
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_generic() {
        let fx = fixture(test_user("Secret123"));

        let err = fx.auth.login("drperez", "WrongPass").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        // No token row is created for a failed attempt.
        assert_eq!(fx.tokens.count(), 0);
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_generic() {
        let fx = fixture(test_user("Secret123"));

        let err = fx.auth.login("nobody", "Secret123").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_inactive_account_is_generic() {
        let fx = fixture(test_user("Secret123").with_state(AccountState::Inactive));

        let err = fx.auth.login("drperez", "Secret123").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_username_match_is_exact() {
        let fx = fixture(test_user("Secret123"));

        let err = fx.auth.login("DRPEREZ", "Secret123").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_refresh_returns_same_value_without_rotation() {
        let fx = fixture(test_user("Secret123"));
        let pair = fx.auth.login("drperez", "Secret123").await.unwrap();

        let refreshed = fx.auth.refresh(&pair.refresh_token).await.unwrap();

        assert_eq!(refreshed.refresh_token, pair.refresh_token);
        let claims = fx
            .auth
            .token_service()
            .verify_access_token(&refreshed.access_token)
            .unwrap();
        assert_eq!(claims.name, "drperez");
        assert_eq!(fx.tokens.count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_rotates_when_enabled() {
        let fx = fixture_with_config(
            test_user("Secret123"),
            TokenConfig::default().with_rotate_refresh_tokens(true),
        );
        let pair = fx.auth.login("drperez", "Secret123").await.unwrap();

        let refreshed = fx.auth.refresh(&pair.refresh_token).await.unwrap();

        assert_ne!(refreshed.refresh_token, pair.refresh_token);

        // The old value no longer refreshes.
        let err = fx.auth.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));

        // The replacement does.
        fx.auth.refresh(&refreshed.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_unknown_token_rejected() {
        let fx = fixture(test_user("Secret123"));
        fx.auth.login("drperez", "Secret123").await.unwrap();

        let err = fx
            .auth
            .refresh("bm90LWEtcmVhbC10b2tlbi12YWx1ZS1hdC1hbGw")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_refresh_expired_refresh_token_rejected() {
        let fx = fixture_with_config(
            test_user("Secret123"),
            TokenConfig::default().with_refresh_token_lifetime(time::Duration::seconds(-60)),
        );
        let pair = fx.auth.login("drperez", "Secret123").await.unwrap();

        let err = fx.auth.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn test_refresh_inactive_owner_rejected() {
        let fx = fixture(test_user("Secret123"));
        let pair = fx.auth.login("drperez", "Secret123").await.unwrap();

        let user = fx
            .users
            .find_by_username("drperez")
            .await
            .unwrap()
            .unwrap();
        fx.users
            .set_state(user.id, AccountState::Inactive)
            .await
            .unwrap();

        let err = fx.auth.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_change_password_flow() {
        let fx = fixture(test_user("Secret123"));

        fx.auth
            .change_password("drperez", "Secret123", "NewSecret456")
            .await
            .unwrap();

        // The old password no longer works; the new one does.
        let err = fx.auth.login("drperez", "Secret123").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        fx.auth.login("drperez", "NewSecret456").await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_wrong_current_rejected() {
        let fx = fixture(test_user("Secret123"));

        let err = fx
            .auth
            .change_password("drperez", "WrongPass", "NewSecret456")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));

        // The stored hash is untouched.
        fx.auth.login("drperez", "Secret123").await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_unknown_user_collapses_to_unauthorized() {
        let fx = fixture(test_user("Secret123"));

        let err = fx
            .auth
            .change_password("ghost", "Secret123", "NewSecret456")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_change_password_too_short_rejected() {
        let fx = fixture(test_user("Secret123"));

        let err = fx
            .auth
            .change_password("drperez", "Secret123", "abc")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_change_password_keeps_tokens_valid() {
        let fx = fixture(test_user("Secret123"));
        let pair = fx.auth.login("drperez", "Secret123").await.unwrap();

        fx.auth
            .change_password("drperez", "Secret123", "NewSecret456")
            .await
            .unwrap();

        // Issued tokens survive the password change.
        fx.auth
            .token_service()
            .verify_access_token(&pair.access_token)
            .unwrap();
        fx.auth
            .refresh(&pair.refresh_token)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_activation_flow() {
        let fx = fixture(test_user("Secret123").with_state(AccountState::Inactive));

        let token = fx
            .auth
            .token_service()
            .issue_activation_token("drperez@clinica.example.com")
            .unwrap();
        fx.auth.activate(&token).await.unwrap();

        // The account can log in now.
        fx.auth.login("drperez", "Secret123").await.unwrap();
    }

    #[tokio::test]
    async fn test_activation_unknown_email_rejected() {
        let fx = fixture(test_user("Secret123"));

        let token = fx
            .auth
            .token_service()
            .issue_activation_token("stranger@clinica.example.com")
            .unwrap();
        let err = fx.auth.activate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_revoke_sessions() {
        let fx = fixture(test_user("Secret123"));
        let pair = fx.auth.login("drperez", "Secret123").await.unwrap();
        fx.auth.login("drperez", "Secret123").await.unwrap();

        let user = fx
            .users
            .find_by_username("drperez")
            .await
            .unwrap()
            .unwrap();
        let revoked = fx.auth.revoke_sessions(user.id).await.unwrap();
        assert_eq!(revoked, 2);

        let err = fx
            .auth
            .refresh(&pair.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }
}
