/// Member endpoints
///
/// Role changes and removals are gated to OWNER/ADMIN by the router. Two
/// invariants are enforced here at the mutation layer, not in the role
/// gate:
///
/// - a member may never remove themselves
/// - the last remaining OWNER may never be removed (owner count is read
///   before the delete; the two statements are not transactional, matching
///   the accepted race documented in DESIGN.md)
///
/// # Endpoints
///
/// - `GET /api/workspaces/:slug/members` - List members
/// - `GET /api/workspaces/:slug/permissions` - Caller's permitted actions
/// - `PATCH /api/workspaces/:slug/members/:user_id` - Change a role
/// - `DELETE /api/workspaces/:slug/members/:user_id` - Remove a member

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use pipedesk_shared::auth::middleware::{AuthContext, WorkspaceContext};
use pipedesk_shared::auth::rbac::permitted_actions;
use pipedesk_shared::models::audit::{AppendAudit, AuditAction, AuditEvent};
use pipedesk_shared::models::member::{Member, MemberRole};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{success, ApiError, ApiResult};

/// Role-change request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    /// New role (API string form, e.g. "MANAGER")
    pub role: String,
}

/// List members of the workspace
pub async fn list_members(
    State(state): State<AppState>,
    Extension(ws): Extension<WorkspaceContext>,
) -> ApiResult<impl IntoResponse> {
    let members = Member::list_by_workspace(&state.db, ws.workspace_id).await?;

    Ok(success(json!({ "members": members })))
}

/// The caller's permitted fine-grained actions
///
/// Serves UI affordance (disabling buttons); the server-side gate on each
/// route is the role allow-list.
pub async fn my_permissions(
    Extension(ws): Extension<WorkspaceContext>,
) -> ApiResult<impl IntoResponse> {
    let actions: Vec<&str> = permitted_actions(ws.role)
        .iter()
        .map(|a| a.as_str())
        .collect();

    Ok(success(json!({
        "role": ws.role.as_str(),
        "actions": actions,
    })))
}

/// Change a member's role
///
/// # Errors
///
/// - `422 VALIDATION_ERROR`: unknown role string
/// - `404 NOT_FOUND`: no such member
pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, user_id)): Path<(String, Uuid)>,
    Json(req): Json<UpdateMemberRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    let role = MemberRole::from_str(&req.role)
        .ok_or_else(|| ApiError::Validation(format!("role: unknown role {}", req.role)))?;

    let member = Member::update_role(&state.db, ws.workspace_id, user_id, role)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "member",
            entity_id: user_id,
            action: AuditAction::Update,
            payload: json!({ "role": role.as_str() }),
        },
    )
    .await;

    Ok(success(json!({ "member": member })))
}

/// Remove a member from the workspace
///
/// # Errors
///
/// - `403 FORBIDDEN`: removing yourself, or removing the last OWNER
/// - `404 NOT_FOUND`: no such member
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, user_id)): Path<(String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    if user_id == auth.user_id {
        return Err(ApiError::Forbidden(
            "You cannot remove yourself from the workspace".to_string(),
        ));
    }

    let member = Member::find(&state.db, ws.workspace_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    if member.role == MemberRole::Owner {
        let owners = Member::count_owners(&state.db, ws.workspace_id).await?;
        if owners <= 1 {
            return Err(ApiError::Forbidden(
                "Cannot remove the last owner of the workspace".to_string(),
            ));
        }
    }

    Member::delete(&state.db, ws.workspace_id, user_id).await?;

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "member",
            entity_id: user_id,
            action: AuditAction::Delete,
            payload: json!({ "role": member.role.as_str() }),
        },
    )
    .await;

    Ok(success(json!({ "removed": true })))
}
