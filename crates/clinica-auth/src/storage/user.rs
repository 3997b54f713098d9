//! User storage trait.
//!
//! Defines the user-lookup collaborator interface. The auth core only
//! ever fetches users and persists credential/state changes through this
//! trait; the actual persistence lives in a backend crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;

// =============================================================================
// Account State
// =============================================================================

/// The two-state activation flag of an account.
///
/// An explicit typed enum: state transitions go through [`toggle`]
/// (or direct assignment), never through runtime property lookup.
///
/// [`toggle`]: AccountState::toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountState {
    /// The account can authenticate.
    Active,
    /// The account exists but cannot authenticate.
    Inactive,
}

impl AccountState {
    /// Returns the opposite state.
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }

    /// Returns `true` for [`AccountState::Active`].
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

// =============================================================================
// User Type
// =============================================================================

/// A user in the authentication system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,

    /// Username for authentication. Globally unique, matched exactly.
    pub username: String,

    /// Email address. Globally unique.
    pub email: String,

    /// External identification number (national id / license number).
    /// Globally unique.
    pub identification_number: String,

    /// Argon2id-hashed password.
    ///
    /// Never expose this field through an API response.
    pub password_hash: String,

    /// The user's single assigned role, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<Uuid>,

    /// Name of the assigned role, resolved by the lookup backend when
    /// `role_id` is set. Carried on the user so token issuance needs no
    /// extra round-trip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,

    /// Account activation state.
    pub state: AccountState,

    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the user was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new active user with no role.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        identification_number: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            identification_number: identification_number.into(),
            password_hash: password_hash.into(),
            role_id: None,
            role_name: None,
            state: AccountState::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if the account can authenticate.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Assigns a role by id and name.
    #[must_use]
    pub fn with_role(mut self, role_id: Uuid, role_name: impl Into<String>) -> Self {
        self.role_id = Some(role_id);
        self.role_name = Some(role_name.into());
        self
    }

    /// Sets the account state.
    #[must_use]
    pub fn with_state(mut self, state: AccountState) -> Self {
        self.state = state;
        self
    }
}

// =============================================================================
// User Storage Trait
// =============================================================================

/// Storage operations for users.
///
/// # Implementations
///
/// The production backend lives outside this crate; `clinica-auth-memory`
/// provides an in-memory implementation for tests and local runs.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find a user by id.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>>;

    /// Find a user by username (exact, case-sensitive match).
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Find a user by email address.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Create a new user.
    ///
    /// Implementations must perform a pre-write existence check on
    /// username, email, and identification number; each is globally
    /// unique and a duplicate is rejected before the write, not left to
    /// a database constraint.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` on a uniqueness conflict, or a
    /// storage error if the operation fails.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Overwrite the stored password hash for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the user doesn't exist, or a
    /// storage error if the operation fails.
    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> AuthResult<()>;

    /// Persist a new account state for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the user doesn't exist, or a
    /// storage error if the operation fails.
    async fn set_state(&self, user_id: Uuid, state: AccountState) -> AuthResult<()>;
}
