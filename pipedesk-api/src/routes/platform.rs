/// Platform-admin endpoints
///
/// Read-only aggregation behind the global `is_platform_admin` flag. This
/// surface is orthogonal to workspace RBAC: the flag grants nothing inside
/// workspaces, and workspace roles grant nothing here.
///
/// # Endpoints
///
/// - `GET /api/platform/stats` - Global counts
/// - `GET /api/platform/workspaces` - Every workspace

use axum::{extract::State, response::IntoResponse};
use pipedesk_shared::models::deal::Deal;
use pipedesk_shared::models::user::User;
use pipedesk_shared::models::workspace::Workspace;
use serde_json::json;

use crate::app::AppState;
use crate::error::{success, ApiResult};

/// Global platform statistics
pub async fn platform_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = User::count(&state.db).await?;
    let workspaces = Workspace::count(&state.db).await?;
    let deals = Deal::count(&state.db).await?;

    Ok(success(json!({
        "users": users,
        "workspaces": workspaces,
        "deals": deals,
    })))
}

/// List every workspace
pub async fn list_all_workspaces(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let workspaces = Workspace::list_all(&state.db).await?;

    Ok(success(json!({ "workspaces": workspaces })))
}
