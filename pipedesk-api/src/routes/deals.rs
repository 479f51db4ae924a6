/// Deal endpoints
///
/// The automation wiring lives here: creating a deal fires the
/// DEAL_CREATED trigger, and an update whose stage differs from the
/// previous value fires DEAL_STAGE_CHANGED. Both run through
/// `fire_and_forget` after the primary mutation has committed: the
/// response is the deal alone, and automation failures are logged, never
/// surfaced.
///
/// The checklist endpoints materialize the static per-stage items on first
/// view and toggle them, with completion driving task auto-closure.
///
/// # Endpoints
///
/// - `GET /api/workspaces/:slug/deals` - List deals
/// - `POST /api/workspaces/:slug/deals` - Create a deal
/// - `GET /api/workspaces/:slug/deals/:id` - Get one deal
/// - `PATCH /api/workspaces/:slug/deals/:id` - Update a deal
/// - `DELETE /api/workspaces/:slug/deals/:id` - Delete a deal
/// - `GET /api/workspaces/:slug/deals/:id/checklist` - View the checklist
/// - `POST /api/workspaces/:slug/deals/:id/checklist` - Toggle an item

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use pipedesk_shared::auth::middleware::{AuthContext, WorkspaceContext};
use pipedesk_shared::automation::checklist as checklist_engine;
use pipedesk_shared::automation::engine::{run_deal_created, run_stage_changed};
use pipedesk_shared::automation::fire_and_forget;
use pipedesk_shared::automation::matcher::SubstringMatcher;
use pipedesk_shared::models::audit::{AppendAudit, AuditAction, AuditEvent};
use pipedesk_shared::models::deal::{CreateDeal, Deal, UpdateDeal};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{success, ApiError, ApiResult};

/// Create-deal request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDealRequest {
    /// Deal title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Initial stage (defaults to "lead")
    pub stage: Option<String>,

    /// Deal amount
    pub amount: Option<f64>,

    /// Linked client
    pub client_id: Option<Uuid>,

    /// Assigned user
    pub assignee_id: Option<Uuid>,
}

/// Checklist toggle request
#[derive(Debug, Deserialize, Validate)]
pub struct ToggleChecklistRequest {
    /// Checklist item title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Desired completed state
    pub completed: bool,
}

/// List deals
pub async fn list_deals(
    State(state): State<AppState>,
    Extension(ws): Extension<WorkspaceContext>,
) -> ApiResult<impl IntoResponse> {
    let deals = Deal::list_by_workspace(&state.db, ws.workspace_id).await?;

    Ok(success(json!({ "deals": deals })))
}

/// Get one deal
pub async fn get_deal(
    State(state): State<AppState>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let deal = Deal::find_in_workspace(&state.db, ws.workspace_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deal not found".to_string()))?;

    Ok(success(json!({ "deal": deal })))
}

/// Create a deal
///
/// Fires DEAL_CREATED automation after the deal is persisted, regardless of
/// its initial stage. Auto-created tasks are not reported in the response.
pub async fn create_deal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Json(req): Json<CreateDealRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let deal = Deal::create(
        &state.db,
        ws.workspace_id,
        CreateDeal {
            title: req.title,
            stage: req.stage.unwrap_or_else(|| "lead".to_string()),
            amount: req.amount,
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
            entity_type: "deal",
            entity_id: deal.id,
            action: AuditAction::Create,
            payload: json!({ "title": deal.title, "stage": deal.stage }),
        },
    )
    .await;

    fire_and_forget(
        "deal-created automation",
        run_deal_created(&state.db, auth.user_id, &deal),
    )
    .await;

    Ok(success(json!({ "deal": deal })))
}

/// Update a deal
///
/// When the update changes the stage to a value different from the previous
/// one, DEAL_STAGE_CHANGED automation fires with the new stage as the match
/// key. Setting the stage to its current value fires nothing.
pub async fn update_deal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
    Json(req): Json<UpdateDeal>,
) -> ApiResult<impl IntoResponse> {
    let existing = Deal::find_in_workspace(&state.db, ws.workspace_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deal not found".to_string()))?;

    let stage_changed = req
        .stage
        .as_ref()
        .map(|s| *s != existing.stage)
        .unwrap_or(false);

    let deal = Deal::update(&state.db, ws.workspace_id, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deal not found".to_string()))?;

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "deal",
            entity_id: deal.id,
            action: AuditAction::Update,
            payload: json!({
                "stage": deal.stage,
                "stageChanged": stage_changed,
                "previousStage": existing.stage,
            }),
        },
    )
    .await;

    if stage_changed {
        fire_and_forget(
            "stage-changed automation",
            run_stage_changed(&state.db, auth.user_id, &deal),
        )
        .await;
    }

    Ok(success(json!({ "deal": deal })))
}

/// Delete a deal
pub async fn delete_deal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let removed = Deal::delete(&state.db, ws.workspace_id, id).await?;
    if !removed {
        return Err(ApiError::NotFound("Deal not found".to_string()));
    }

    AuditEvent::record(
        &state.db,
        AppendAudit {
            workspace_id: ws.workspace_id,
            actor_id: Some(auth.user_id),
            entity_type: "deal",
            entity_id: id,
            action: AuditAction::Delete,
            payload: json!({}),
        },
    )
    .await;

    Ok(success(json!({ "deleted": true })))
}

/// View a deal's checklist for its current stage
///
/// The first view materializes the stage's required items (incomplete);
/// repeated views are idempotent.
pub async fn get_checklist(
    State(state): State<AppState>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let deal = Deal::find_in_workspace(&state.db, ws.workspace_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deal not found".to_string()))?;

    let items = checklist_engine::materialize(&state.db, deal.id, &deal.stage).await?;
    let status = checklist_engine::status(&state.db, deal.id, &deal.stage).await?;

    Ok(success(json!({
        "stage": deal.stage,
        "items": items,
        "checklistComplete": status.checklist_complete,
        "completedCount": status.completed_count,
        "totalCount": status.total_count,
    })))
}

/// Toggle a checklist item on the deal's current stage
///
/// Completing an item auto-closes matching open tasks on the deal
/// (best-effort). The returned `checklistComplete` flag is advisory for UI
/// prompts; it never gates stage transitions.
pub async fn toggle_checklist_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(ws): Extension<WorkspaceContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
    Json(req): Json<ToggleChecklistRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let deal = Deal::find_in_workspace(&state.db, ws.workspace_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deal not found".to_string()))?;

    let toggle = checklist_engine::toggle_item(
        &state.db,
        &SubstringMatcher,
        auth.user_id,
        &deal,
        &req.title,
        req.completed,
    )
    .await?;

    Ok(success(json!({
        "item": toggle.item,
        "checklistComplete": toggle.status.checklist_complete,
        "completedCount": toggle.status.completed_count,
        "totalCount": toggle.status.total_count,
    })))
}
