//! Role and permission storage traits.
//!
//! Defines the role/permission-assignment collaborator interface. A role
//! owns two independent many-to-many association sets (permissions and
//! menus); both are always replaced as one unit, never diffed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;

// =============================================================================
// Permission
// =============================================================================

/// A fine-grained action a role may perform.
///
/// Leaf lookup entity: no lifecycle logic beyond CRUD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Unique identifier for the permission.
    pub id: Uuid,

    /// Display name for the permission.
    pub name: String,

    /// Description of what the permission allows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the permission is active.
    pub active: bool,
}

impl Permission {
    /// Create a new active permission.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            active: true,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =============================================================================
// Role
// =============================================================================

/// A named, describable permission bundle.
///
/// The association sets (permissions, menus) are not carried on the role
/// itself; they live in the junction storage and are read and replaced
/// through [`RoleStorage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier for the role.
    pub id: Uuid,

    /// Role name (e.g., "Doctor", "Receptionist", "Admin").
    pub name: String,

    /// Human-readable description of the role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the role was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the role was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Role {
    /// Creates a new role with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =============================================================================
// Role Storage Trait
// =============================================================================

/// Storage operations for roles and their association sets.
#[async_trait]
pub trait RoleStorage: Send + Sync {
    /// Find a role by id.
    ///
    /// Returns `None` if the role doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, role_id: Uuid) -> AuthResult<Option<Role>>;

    /// Create a role together with its initial association sets.
    ///
    /// The role row and every junction row are persisted within one
    /// logical unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(
        &self,
        role: &Role,
        permission_ids: &[Uuid],
        menu_ids: &[Uuid],
    ) -> AuthResult<()>;

    /// Overwrite a role's scalar fields (name, description, updated_at).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the role doesn't exist, or a
    /// storage error if the operation fails.
    async fn update(&self, role: &Role) -> AuthResult<()>;

    /// Replace a role's permission and menu sets in full.
    ///
    /// All existing junction rows for the role are deleted and the new
    /// sets inserted, within one logical unit of work. Passing empty
    /// sets legitimately clears all access for the role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the role doesn't exist, or a
    /// storage error if the operation fails.
    async fn replace_assignments(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
        menu_ids: &[Uuid],
    ) -> AuthResult<()>;

    /// List the permission ids currently assigned to a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn permission_ids(&self, role_id: Uuid) -> AuthResult<Vec<Uuid>>;

    /// List the menu ids currently assigned to a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn menu_ids(&self, role_id: Uuid) -> AuthResult<Vec<Uuid>>;
}

// =============================================================================
// Permission Storage Trait
// =============================================================================

/// Storage operations for permissions.
#[async_trait]
pub trait PermissionStorage: Send + Sync {
    /// Find a permission by id.
    ///
    /// Returns `None` if the permission doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, permission_id: Uuid) -> AuthResult<Option<Permission>>;

    /// Of the given ids, return those that do NOT exist.
    ///
    /// Used by the assignment manager to fail cleanly before mutating,
    /// instead of surfacing a foreign-key violation from the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn missing_ids(&self, ids: &[Uuid]) -> AuthResult<Vec<Uuid>>;
}
