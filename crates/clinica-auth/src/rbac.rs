//! Role-based access control management.
//!
//! [`RoleService`] manages roles and their two association sets
//! (permissions, menus). Writes always validate every referenced id
//! against the lookup storages before touching the role, so a bad id
//! list fails cleanly instead of leaving a half-applied assignment, and
//! both sets are replaced in full on every update.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::{MenuStorage, PermissionStorage, Role, RoleStorage};

/// A role together with its resolved association sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDetails {
    /// The role itself.
    pub role: Role,

    /// Ids of the permissions assigned to the role.
    pub permission_ids: Vec<Uuid>,

    /// Ids of the menus assigned to the role.
    pub menu_ids: Vec<Uuid>,
}

/// Manages roles and their permission/menu assignments.
pub struct RoleService {
    /// Role and junction storage.
    role_storage: Arc<dyn RoleStorage>,

    /// Permission lookup storage.
    permission_storage: Arc<dyn PermissionStorage>,

    /// Menu lookup storage.
    menu_storage: Arc<dyn MenuStorage>,
}

impl RoleService {
    /// Creates a new role service.
    #[must_use]
    pub fn new(
        role_storage: Arc<dyn RoleStorage>,
        permission_storage: Arc<dyn PermissionStorage>,
        menu_storage: Arc<dyn MenuStorage>,
    ) -> Self {
        Self {
            role_storage,
            permission_storage,
            menu_storage,
        }
    }

    /// Creates a role with its initial assignment sets.
    ///
    /// Empty sets are legitimate: a role may exist before any access is
    /// granted to it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` when the name is empty or any
    /// referenced permission/menu id is unknown, or a storage error if
    /// persistence fails.
    pub async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
        permission_ids: &[Uuid],
        menu_ids: &[Uuid],
    ) -> AuthResult<RoleDetails> {
        if name.trim().is_empty() {
            return Err(AuthError::validation("Role name must not be empty"));
        }

        let permission_ids = dedupe(permission_ids);
        let menu_ids = dedupe(menu_ids);
        self.check_references(&permission_ids, &menu_ids).await?;

        let mut role = Role::new(name);
        if let Some(description) = description {
            role = role.with_description(description);
        }

        self.role_storage
            .create(&role, &permission_ids, &menu_ids)
            .await?;

        tracing::info!(role_id = %role.id, name = %role.name, "role created");

        Ok(RoleDetails {
            role,
            permission_ids,
            menu_ids,
        })
    }

    /// Updates a role's fields and replaces both assignment sets.
    ///
    /// The given sets fully supersede whatever was assigned before;
    /// passing an empty permission list strips every permission from the
    /// role even when menus are granted in the same call.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` when the role doesn't exist,
    /// `AuthError::Validation` for an empty name or unknown ids, or a
    /// storage error if persistence fails.
    pub async fn update_role(
        &self,
        role_id: Uuid,
        name: &str,
        description: Option<&str>,
        permission_ids: &[Uuid],
        menu_ids: &[Uuid],
    ) -> AuthResult<RoleDetails> {
        if name.trim().is_empty() {
            return Err(AuthError::validation("Role name must not be empty"));
        }

        let Some(mut role) = self.role_storage.find_by_id(role_id).await? else {
            return Err(AuthError::not_found("Role", role_id.to_string()));
        };

        let permission_ids = dedupe(permission_ids);
        let menu_ids = dedupe(menu_ids);
        self.check_references(&permission_ids, &menu_ids).await?;

        role.name = name.to_string();
        role.description = description.map(ToString::to_string);
        role.updated_at = time::OffsetDateTime::now_utc();

        self.role_storage.update(&role).await?;
        self.role_storage
            .replace_assignments(role_id, &permission_ids, &menu_ids)
            .await?;

        tracing::info!(
            %role_id,
            permissions = permission_ids.len(),
            menus = menu_ids.len(),
            "role updated"
        );

        Ok(RoleDetails {
            role,
            permission_ids,
            menu_ids,
        })
    }

    /// Fetches a role with its resolved assignment sets.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` when the role doesn't exist, or a
    /// storage error if the lookup fails.
    pub async fn role_details(&self, role_id: Uuid) -> AuthResult<RoleDetails> {
        let Some(role) = self.role_storage.find_by_id(role_id).await? else {
            return Err(AuthError::not_found("Role", role_id.to_string()));
        };

        let permission_ids = self.role_storage.permission_ids(role_id).await?;
        let menu_ids = self.role_storage.menu_ids(role_id).await?;

        Ok(RoleDetails {
            role,
            permission_ids,
            menu_ids,
        })
    }

    /// Rejects assignment sets that reference unknown ids.
    async fn check_references(
        &self,
        permission_ids: &[Uuid],
        menu_ids: &[Uuid],
    ) -> AuthResult<()> {
        let missing = self.permission_storage.missing_ids(permission_ids).await?;
        if !missing.is_empty() {
            return Err(AuthError::validation(format!(
                "Unknown permission ids: {}",
                join_ids(&missing)
            )));
        }

        let missing = self.menu_storage.missing_ids(menu_ids).await?;
        if !missing.is_empty() {
            return Err(AuthError::validation(format!(
                "Unknown menu ids: {}",
                join_ids(&missing)
            )));
        }

        Ok(())
    }
}

/// Removes duplicate ids while preserving first-seen order.
fn dedupe(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
