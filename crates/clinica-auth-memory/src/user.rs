//! In-memory user storage.

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use clinica_auth::AuthResult;
use clinica_auth::error::AuthError;
use clinica_auth::storage::{AccountState, User, UserStorage};

/// In-memory implementation of [`UserStorage`] keyed by user id.
///
/// Uniqueness of username, email, and identification number is checked
/// by scanning before every insert, matching the pre-write check the
/// production backend performs.
#[derive(Debug, Default)]
pub struct InMemoryUserStorage {
    users: DashMap<Uuid, User>,
}

impl InMemoryUserStorage {
    /// Creates an empty user storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no users are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn find_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>> {
        Ok(self.users.get(&user_id).map(|entry| entry.clone()))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.clone()))
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.clone()))
    }

    async fn create(&self, user: &User) -> AuthResult<()> {
        let conflict = self.users.iter().find_map(|entry| {
            if entry.username == user.username {
                Some("username")
            } else if entry.email == user.email {
                Some("email")
            } else if entry.identification_number == user.identification_number {
                Some("identification number")
            } else {
                None
            }
        });
        if let Some(field) = conflict {
            return Err(AuthError::validation(format!(
                "A user with this {field} already exists"
            )));
        }

        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> AuthResult<()> {
        let mut entry = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::not_found("User", user_id.to_string()))?;
        entry.password_hash = password_hash.to_string();
        entry.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }

    async fn set_state(&self, user_id: Uuid, state: AccountState) -> AuthResult<()> {
        let mut entry = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::not_found("User", user_id.to_string()))?;
        entry.state = state;
        entry.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}
