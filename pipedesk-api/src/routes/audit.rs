/// Audit timeline endpoint
///
/// Read-only view over the append-only audit log. This core only ever
/// appends events; nothing here feeds back into business logic.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension,
};
use pipedesk_shared::auth::middleware::WorkspaceContext;
use pipedesk_shared::models::audit::AuditEvent;
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::error::{success, ApiResult};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

/// Audit listing query parameters
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Maximum number of events to return (default 100, capped at 500)
    pub limit: Option<i64>,
}

/// List the workspace's audit timeline, newest first
pub async fn list_audit_events(
    State(state): State<AppState>,
    Extension(ws): Extension<WorkspaceContext>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let events = AuditEvent::list_by_workspace(&state.db, ws.workspace_id, limit).await?;

    Ok(success(json!({ "events": events })))
}
