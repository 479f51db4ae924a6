/// Invite endpoints
///
/// Invite creation and deletion are OWNER/ADMIN operations (router gate).
/// Inviting an email that already belongs to a member, or that already has
/// a pending invite, is a conflict.
///
/// # Endpoints
///
/// - `GET /api/workspaces/:slug/invites` - List pending invites
/// - `POST /api/workspaces/:slug/invites` - Create an invite
/// - `DELETE /api/workspaces/:slug/invites/:id` - Delete an invite

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use pipedesk_shared::auth::middleware::{AuthContext, WorkspaceContext};
use pipedesk_shared::models::audit::{AppendAudit, AuditAction, AuditEvent};
use pipedesk_shared::models::invite::Invite;
use pipedesk_shared::models::member::{Member, MemberRole};
use pipedesk_shared::models::user::User;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{success, ApiError, ApiResult};

/// Create-invite request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInviteRequest {
    /// Invitee email
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Role granted on acceptance (defaults to AGENT)
    pub role: Option<String>,
}

/// List pending invites
pub async fn list_invites(
    State(state): State<AppState>,
    Extension(ws): Extension<WorkspaceContext>,
) -> ApiResult<impl IntoResponse> {
    let invites = Invite::list_by_workspace(&state.db, ws.workspace_id).await?;

    Ok(success(json!({ "invites": invites })))
}

/// Create an invite
///
/// # Errors
///
/// - `422 VALIDATION_ERROR`: bad email or unknown role
/// - `409 CONFLICT`: invitee is already a member, or already invited
pub async fn create_invite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Json(req): Json<CreateInviteRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let role = match req.role.as_deref() {
        Some(s) => MemberRole::from_str(s)
            .ok_or_else(|| ApiError::Validation(format!("role: unknown role {}", s)))?,
        None => MemberRole::Agent,
    };

    // An existing account with this email that is already a member makes
    // the invite pointless.
    if let Some(user) = User::find_by_email(&state.db, &req.email).await? {
        if Member::find(&state.db, ws.workspace_id, user.id)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict(
                "User is already a member of this workspace".to_string(),
            ));
        }
    }

    let invite = Invite::create(&state.db, ws.workspace_id, &req.email, role)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::Conflict("An invite for this email already exists".to_string())
            }
            _ => ApiError::from(err),
        })?;

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "invite",
            entity_id: invite.id,
            action: AuditAction::Create,
            payload: json!({ "email": invite.email, "role": invite.role.as_str() }),
        },
    )
    .await;

    Ok(success(json!({ "invite": invite })))
}

/// Delete an invite
pub async fn delete_invite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let invite = Invite::find_in_workspace(&state.db, ws.workspace_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite not found".to_string()))?;

    Invite::delete(&state.db, ws.workspace_id, invite.id).await?;

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "invite",
            entity_id: invite.id,
            action: AuditAction::Delete,
            payload: json!({ "email": invite.email }),
        },
    )
    .await;

    Ok(success(json!({ "deleted": true })))
}
