//! In-memory role, permission, and menu storage.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use clinica_auth::AuthResult;
use clinica_auth::error::AuthError;
use clinica_auth::storage::{
    Menu, MenuStorage, Permission, PermissionStorage, Role, RoleStorage,
};

type AssignmentSets = (Vec<Uuid>, Vec<Uuid>);

/// In-memory implementation of [`RoleStorage`].
///
/// Roles and their junction rows live behind one `RwLock` so a
/// `replace_assignments` call swaps both sets as a single unit; readers
/// never observe a half-replaced state.
#[derive(Debug, Default)]
pub struct InMemoryRoleStorage {
    inner: RwLock<RoleTables>,
}

#[derive(Debug, Default)]
struct RoleTables {
    roles: HashMap<Uuid, Role>,
    assignments: HashMap<Uuid, AssignmentSets>,
}

impl InMemoryRoleStorage {
    /// Creates an empty role storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStorage for InMemoryRoleStorage {
    async fn find_by_id(&self, role_id: Uuid) -> AuthResult<Option<Role>> {
        Ok(self.inner.read().await.roles.get(&role_id).cloned())
    }

    async fn create(
        &self,
        role: &Role,
        permission_ids: &[Uuid],
        menu_ids: &[Uuid],
    ) -> AuthResult<()> {
        let mut tables = self.inner.write().await;
        tables.roles.insert(role.id, role.clone());
        tables
            .assignments
            .insert(role.id, (permission_ids.to_vec(), menu_ids.to_vec()));
        Ok(())
    }

    async fn update(&self, role: &Role) -> AuthResult<()> {
        let mut tables = self.inner.write().await;
        if !tables.roles.contains_key(&role.id) {
            return Err(AuthError::not_found("Role", role.id.to_string()));
        }
        tables.roles.insert(role.id, role.clone());
        Ok(())
    }

    async fn replace_assignments(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
        menu_ids: &[Uuid],
    ) -> AuthResult<()> {
        let mut tables = self.inner.write().await;
        if !tables.roles.contains_key(&role_id) {
            return Err(AuthError::not_found("Role", role_id.to_string()));
        }
        tables
            .assignments
            .insert(role_id, (permission_ids.to_vec(), menu_ids.to_vec()));
        Ok(())
    }

    async fn permission_ids(&self, role_id: Uuid) -> AuthResult<Vec<Uuid>> {
        Ok(self
            .inner
            .read()
            .await
            .assignments
            .get(&role_id)
            .map(|(permissions, _)| permissions.clone())
            .unwrap_or_default())
    }

    async fn menu_ids(&self, role_id: Uuid) -> AuthResult<Vec<Uuid>> {
        Ok(self
            .inner
            .read()
            .await
            .assignments
            .get(&role_id)
            .map(|(_, menus)| menus.clone())
            .unwrap_or_default())
    }
}

/// In-memory implementation of [`PermissionStorage`].
#[derive(Debug, Default)]
pub struct InMemoryPermissionStorage {
    permissions: DashMap<Uuid, Permission>,
}

impl InMemoryPermissionStorage {
    /// Creates an empty permission storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a permission, returning its id.
    pub fn add(&self, permission: Permission) -> Uuid {
        let id = permission.id;
        self.permissions.insert(id, permission);
        id
    }
}

#[async_trait]
impl PermissionStorage for InMemoryPermissionStorage {
    async fn find_by_id(&self, permission_id: Uuid) -> AuthResult<Option<Permission>> {
        Ok(self.permissions.get(&permission_id).map(|entry| entry.clone()))
    }

    async fn missing_ids(&self, ids: &[Uuid]) -> AuthResult<Vec<Uuid>> {
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !self.permissions.contains_key(id))
            .collect())
    }
}

/// In-memory implementation of [`MenuStorage`].
#[derive(Debug, Default)]
pub struct InMemoryMenuStorage {
    menus: DashMap<Uuid, Menu>,
}

impl InMemoryMenuStorage {
    /// Creates an empty menu storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a menu entry, returning its id.
    pub fn add(&self, menu: Menu) -> Uuid {
        let id = menu.id;
        self.menus.insert(id, menu);
        id
    }
}

#[async_trait]
impl MenuStorage for InMemoryMenuStorage {
    async fn find_by_id(&self, menu_id: Uuid) -> AuthResult<Option<Menu>> {
        Ok(self.menus.get(&menu_id).map(|entry| entry.clone()))
    }

    async fn missing_ids(&self, ids: &[Uuid]) -> AuthResult<Vec<Uuid>> {
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !self.menus.contains_key(id))
            .collect())
    }
}
