/// Client endpoints
///
/// Updates are gated to non-VIEWER roles, deletion to OWNER/ADMIN, by the
/// router's role allow-lists. The finer capability split between
/// `client.update.name` and `client.update.all` lives in the RBAC table and
/// is served to UIs via the permissions endpoint; this route deliberately
/// keeps the original coarse enforcement (see DESIGN.md).
///
/// # Endpoints
///
/// - `GET /api/workspaces/:slug/clients` - List clients
/// - `POST /api/workspaces/:slug/clients` - Create a client
/// - `GET /api/workspaces/:slug/clients/:id` - Get one client
/// - `PATCH /api/workspaces/:slug/clients/:id` - Update a client
/// - `DELETE /api/workspaces/:slug/clients/:id` - Delete a client

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use pipedesk_shared::auth::middleware::{AuthContext, WorkspaceContext};
use pipedesk_shared::models::audit::{AppendAudit, AuditAction, AuditEvent};
use pipedesk_shared::models::client::{Client, CreateClient, UpdateClient};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{success, ApiError, ApiResult};

/// Create-client request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    /// Client name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Contact email
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Contact phone
    pub phone: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,
}

/// List clients
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(ws): Extension<WorkspaceContext>,
) -> ApiResult<impl IntoResponse> {
    let clients = Client::list_by_workspace(&state.db, ws.workspace_id).await?;

    Ok(success(json!({ "clients": clients })))
}

/// Get one client
pub async fn get_client(
    State(state): State<AppState>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let client = Client::find_in_workspace(&state.db, ws.workspace_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    Ok(success(json!({ "client": client })))
}

/// Create a client
pub async fn create_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Json(req): Json<CreateClientRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let client = Client::create(
        &state.db,
        ws.workspace_id,
        CreateClient {
            name: req.name,
            email: req.email,
            phone: req.phone,
            notes: req.notes,
        },
    )
    .await?;

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "client",
            entity_id: client.id,
            action: AuditAction::Create,
            payload: json!({ "name": client.name }),
        },
    )
    .await;

    Ok(success(json!({ "client": client })))
}

/// Update a client
pub async fn update_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
    Json(req): Json<UpdateClient>,
) -> ApiResult<impl IntoResponse> {
    let client = Client::update(&state.db, ws.workspace_id, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "client",
            entity_id: client.id,
            action: AuditAction::Update,
            payload: json!({ "name": client.name }),
        },
    )
    .await;

    Ok(success(json!({ "client": client })))
}

/// Delete a client
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let removed = Client::delete(&state.db, ws.workspace_id, id).await?;
    if !removed {
        return Err(ApiError::NotFound("Client not found".to_string()));
    }

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "client",
            entity_id: id,
            action: AuditAction::Delete,
            payload: json!({}),
        },
    )
    .await;

    Ok(success(json!({ "deleted": true })))
}
