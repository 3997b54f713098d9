//! Role management endpoint handlers.
//!
//! Handlers for the `/api/roles` routes. All routes require a valid
//! bearer token; updates replace both assignment sets in full.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;
use crate::middleware::BearerAuth;
use crate::rbac::RoleDetails;

use super::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Role create request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    /// Role name.
    pub name: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// Permission ids to assign.
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,

    /// Menu ids to assign.
    #[serde(default)]
    pub menu_ids: Vec<Uuid>,
}

/// Role update request body.
///
/// The id lists are authoritative: whatever was assigned before is
/// replaced by exactly these sets.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    /// Role name.
    pub name: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// Permission ids to assign.
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,

    /// Menu ids to assign.
    #[serde(default)]
    pub menu_ids: Vec<Uuid>,
}

/// Role response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    /// Role id.
    pub id: Uuid,

    /// Role name.
    pub name: String,

    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Assigned permission ids.
    pub permission_ids: Vec<Uuid>,

    /// Assigned menu ids.
    pub menu_ids: Vec<Uuid>,
}

impl From<RoleDetails> for RoleResponse {
    fn from(details: RoleDetails) -> Self {
        Self {
            id: details.role.id,
            name: details.role.name,
            description: details.role.description,
            permission_ids: details.permission_ids,
            menu_ids: details.menu_ids,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/roles`
///
/// Creates a role with its initial assignment sets.
pub async fn create_role(
    State(state): State<AppState>,
    BearerAuth(_auth): BearerAuth,
    Json(request): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), AuthError> {
    let details = state
        .role_service
        .create_role(
            &request.name,
            request.description.as_deref(),
            &request.permission_ids,
            &request.menu_ids,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(details.into())))
}

/// `PUT /api/roles/{id}`
///
/// Updates a role and replaces both assignment sets in full.
pub async fn update_role(
    State(state): State<AppState>,
    BearerAuth(_auth): BearerAuth,
    Path(role_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<RoleResponse>, AuthError> {
    let details = state
        .role_service
        .update_role(
            role_id,
            &request.name,
            request.description.as_deref(),
            &request.permission_ids,
            &request.menu_ids,
        )
        .await?;
    Ok(Json(details.into()))
}

/// `GET /api/roles/{id}`
///
/// Fetches a role with its resolved assignment sets.
pub async fn get_role(
    State(state): State<AppState>,
    BearerAuth(_auth): BearerAuth,
    Path(role_id): Path<Uuid>,
) -> Result<Json<RoleResponse>, AuthError> {
    let details = state.role_service.role_details(role_id).await?;
    Ok(Json(details.into()))
}
