//! Menu storage trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AuthResult;

/// A navigable UI entry a role may be granted.
///
/// Leaf lookup entity, mirrored by [`super::Permission`]. The auth
/// subsystem only needs existence checks; rendering is the frontend's
/// concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    /// Unique identifier for the menu entry.
    pub id: Uuid,

    /// Display name for the entry.
    pub name: String,

    /// Navigation target, if the entry is a link rather than a group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Whether the entry is active.
    pub active: bool,
}

impl Menu {
    /// Create a new active menu entry.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            url: None,
            active: true,
        }
    }

    /// Set the navigation target.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Storage operations for menu entries.
#[async_trait]
pub trait MenuStorage: Send + Sync {
    /// Find a menu entry by id.
    ///
    /// Returns `None` if the entry doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, menu_id: Uuid) -> AuthResult<Option<Menu>>;

    /// Of the given ids, return those that do NOT exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn missing_ids(&self, ids: &[Uuid]) -> AuthResult<Vec<Uuid>>;
}
