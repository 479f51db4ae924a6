/// Error handling for the API server
///
/// A unified error type mapping to the structured response envelope. Every
/// handler returns `ApiResult<T>`; failures render as
/// `{"success": false, "error": {"code", "message"}}` with a stable
/// machine-readable code. Internal details never leak: internal errors are
/// logged server-side and surfaced as a generic message.
///
/// # Example
///
/// ```no_run
/// use pipedesk_api::error::{success, ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     let deal = find_deal().ok_or_else(|| ApiError::NotFound("Deal not found".to_string()))?;
///     Ok(success(deal))
/// }
/// # fn find_deal() -> Option<&'static str> { None }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Wraps a payload in the success envelope
pub fn success<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// No or invalid session (401, code UNAUTHORIZED)
    Unauthorized(String),

    /// Session past its expiry (401, code SESSION_EXPIRED)
    SessionExpired,

    /// Workspace slug resolved to nothing (404, code WORKSPACE_NOT_FOUND)
    WorkspaceNotFound,

    /// Not a member, insufficient role, or a member-removal rule (403)
    Forbidden(String),

    /// Entity absent or cross-tenant (404, code NOT_FOUND)
    NotFound(String),

    /// Malformed input (422, code VALIDATION_ERROR)
    Validation(String),

    /// Duplicate unique key, duplicate invite, already-member (409)
    Conflict(String),

    /// Everything else (500, code INTERNAL_ERROR); message is logged, not
    /// returned
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::SessionExpired => write!(f, "Session expired"),
            ApiError::WorkspaceNotFound => write!(f, "Workspace not found"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Stable machine-readable code for the response envelope
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::SessionExpired => "SESSION_EXPIRED",
            ApiError::WorkspaceNotFound => "WORKSPACE_NOT_FOUND",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) | ApiError::SessionExpired => StatusCode::UNAUTHORIZED,
            ApiError::WorkspaceNotFound | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => msg.clone(),
            ApiError::SessionExpired => "Session expired".to_string(),
            ApiError::WorkspaceNotFound => "Workspace not found".to_string(),
            ApiError::NotFound(msg) | ApiError::Validation(msg) | ApiError::Conflict(msg) => {
                msg.clone()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": { "code": self.code(), "message": message },
        }));

        (self.status(), body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return ApiError::Conflict("Resource already exists".to_string());
                }
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert session resolution errors to API errors
impl From<pipedesk_shared::auth::session::SessionError> for ApiError {
    fn from(err: pipedesk_shared::auth::session::SessionError) -> Self {
        use pipedesk_shared::auth::session::SessionError;

        match err {
            SessionError::Unauthorized => {
                ApiError::Unauthorized("Authentication required".to_string())
            }
            SessionError::InvalidSession => ApiError::Unauthorized("Invalid session".to_string()),
            SessionError::SessionExpired => ApiError::SessionExpired,
            SessionError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
        }
    }
}

/// Convert password errors to API errors
impl From<pipedesk_shared::auth::password::PasswordError> for ApiError {
    fn from(err: pipedesk_shared::auth::password::PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert request-validation errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let detail = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "is invalid".to_string());
                    format!("{}: {}", field, message)
                })
            })
            .collect::<Vec<_>>()
            .join("; ");

        ApiError::Validation(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::Unauthorized("x".into()).code(), "UNAUTHORIZED");
        assert_eq!(ApiError::SessionExpired.code(), "SESSION_EXPIRED");
        assert_eq!(ApiError::WorkspaceNotFound.code(), "WORKSPACE_NOT_FOUND");
        assert_eq!(ApiError::Forbidden("x".into()).code(), "FORBIDDEN");
        assert_eq!(ApiError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(ApiError::Validation("x".into()).code(), "VALIDATION_ERROR");
        assert_eq!(ApiError::Conflict("x".into()).code(), "CONFLICT");
        assert_eq!(ApiError::Internal("x".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::SessionExpired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::WorkspaceNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_display() {
        let err = ApiError::NotFound("Deal not found".to_string());
        assert_eq!(err.to_string(), "Not found: Deal not found");
    }
}
