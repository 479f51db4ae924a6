/// Health check endpoint

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiResult;

/// Reports service and database health
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let database = match pipedesk_shared::db::pool::health_check(&state.db).await {
        Ok(()) => "ok",
        Err(_) => "unreachable",
    };

    Ok(Json(json!({
        "status": "ok",
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
