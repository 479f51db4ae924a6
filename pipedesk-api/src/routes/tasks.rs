/// Task endpoints
///
/// Updates are gated to non-VIEWER roles, deletion to OWNER/ADMIN, by the
/// router's role allow-lists.
///
/// # Endpoints
///
/// - `GET /api/workspaces/:slug/tasks` - List tasks
/// - `POST /api/workspaces/:slug/tasks` - Create a task
/// - `GET /api/workspaces/:slug/tasks/:id` - Get one task
/// - `PATCH /api/workspaces/:slug/tasks/:id` - Update a task
/// - `DELETE /api/workspaces/:slug/tasks/:id` - Delete a task

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pipedesk_shared::auth::middleware::{AuthContext, WorkspaceContext};
use pipedesk_shared::models::audit::{AppendAudit, AuditAction, AuditEvent};
use pipedesk_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{success, ApiError, ApiResult};

/// Create-task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Initial status (defaults to TODO)
    pub status: Option<TaskStatus>,

    /// Due date
    pub due_at: Option<DateTime<Utc>>,

    /// Linked deal
    pub deal_id: Option<Uuid>,

    /// Linked client
    pub client_id: Option<Uuid>,

    /// Assigned user
    pub assignee_id: Option<Uuid>,
}

/// List tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(ws): Extension<WorkspaceContext>,
) -> ApiResult<impl IntoResponse> {
    let tasks = Task::list_by_workspace(&state.db, ws.workspace_id).await?;

    Ok(success(json!({ "tasks": tasks })))
}

/// Get one task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let task = Task::find_in_workspace(&state.db, ws.workspace_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(success(json!({ "task": task })))
}

/// Create a task
///
/// A linked deal must live in the same workspace; a foreign deal id behaves
/// like a missing one.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    if let Some(deal_id) = req.deal_id {
        pipedesk_shared::models::deal::Deal::find_in_workspace(&state.db, ws.workspace_id, deal_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Deal not found".to_string()))?;
    }

    let task = Task::create(
        &state.db,
        ws.workspace_id,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::Todo),
            due_at: req.due_at,
            deal_id: req.deal_id,
            client_id: req.client_id,
            assignee_id: req.assignee_id,
        },
    )
    .await?;

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "task",
            entity_id: task.id,
            action: AuditAction::Create,
            payload: json!({ "title": task.title }),
        },
    )
    .await;

    Ok(success(json!({ "task": task })))
}

/// Update a task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
    Json(req): Json<UpdateTask>,
) -> ApiResult<impl IntoResponse> {
    let task = Task::update(&state.db, ws.workspace_id, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "task",
            entity_id: task.id,
            action: AuditAction::Update,
            payload: json!({ "status": task.status.as_str() }),
        },
    )
    .await;

    Ok(success(json!({ "task": task })))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let removed = Task::delete(&state.db, ws.workspace_id, id).await?;
    if !removed {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "task",
            entity_id: id,
            action: AuditAction::Delete,
            payload: json!({}),
        },
    )
    .await;

    Ok(success(json!({ "deleted": true })))
}
