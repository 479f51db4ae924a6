/// Workspace endpoints
///
/// Creating a workspace makes the caller its OWNER and seeds the default
/// task templates (idempotently, by deterministic template ids).
///
/// # Endpoints
///
/// - `POST /api/workspaces` - Create a workspace
/// - `GET /api/workspaces` - List the caller's workspaces

use axum::{extract::State, response::IntoResponse, Extension, Json};
use pipedesk_shared::auth::middleware::AuthContext;
use pipedesk_shared::automation::engine::seed_default_templates;
use pipedesk_shared::models::audit::{AppendAudit, AuditAction, AuditEvent};
use pipedesk_shared::models::member::{Member, MemberRole};
use pipedesk_shared::models::workspace::{CreateWorkspace, Workspace};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::app::AppState;
use crate::error::{success, ApiError, ApiResult};

/// Create-workspace request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkspaceRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// URL-safe slug
    #[validate(length(min = 2, max = 50, message = "Slug must be 2-50 characters"))]
    pub slug: String,
}

/// Create a workspace
///
/// The caller becomes OWNER and the default automation templates are
/// seeded.
///
/// # Errors
///
/// - `422 VALIDATION_ERROR`: bad name or slug
/// - `409 CONFLICT`: slug already taken
pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateWorkspaceRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    if !req
        .slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ApiError::Validation(
            "slug: must contain only lowercase letters, digits and dashes".to_string(),
        ));
    }

    // TODO: wrap workspace + membership + template seeding in one transaction
    let workspace = Workspace::create(
        &state.db,
        CreateWorkspace {
            name: req.name,
            slug: req.slug,
        },
    )
    .await
    .map_err(|err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ApiError::Conflict("Workspace slug already taken".to_string())
        }
        _ => ApiError::from(err),
    })?;

    Member::create(&state.db, workspace.id, auth.user_id, MemberRole::Owner).await?;

    seed_default_templates(&state.db, workspace.id).await?;

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: workspace.id,
            actor_id: Some(auth.user_id),
            entity_type: "workspace",
            entity_id: workspace.id,
            action: AuditAction::Create,
            payload: json!({ "slug": workspace.slug }),
        },
    )
    .await;

    Ok(success(json!({ "workspace": workspace, "role": "OWNER" })))
}

/// List the caller's workspaces
pub async fn list_workspaces(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<impl IntoResponse> {
    let workspaces = Workspace::list_for_user(&state.db, auth.user_id).await?;

    Ok(success(json!({ "workspaces": workspaces })))
}
