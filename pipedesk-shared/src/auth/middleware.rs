/// Authentication and workspace-authorization middleware for Axum
///
/// Every workspace-scoped request passes through the same chain before any
/// domain logic runs:
///
/// 1. [`session_auth_middleware`] resolves the session cookie to a user
///    and inserts [`AuthContext`] into request extensions
/// 2. [`workspace_middleware`] resolves the `:slug` path parameter to a
///    workspace and the caller's membership, inserting [`WorkspaceContext`]
/// 3. [`require_roles`] is the per-route role allow-list gate
///
/// Authorization failures short-circuit with a structured error response;
/// they are never downgraded.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use pipedesk_shared::auth::middleware::{create_session_middleware, AuthContext};
/// use sqlx::PgPool;
///
/// async fn me(Extension(auth): Extension<AuthContext>) -> String {
///     format!("user {}", auth.user_id)
/// }
///
/// fn routes(pool: PgPool) -> Router {
///     Router::new()
///         .route("/me", get(me))
///         .layer(middleware::from_fn(create_session_middleware(pool)))
/// }
/// ```

use std::collections::HashMap;

use axum::{
    extract::{Path, Request},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json, RequestPartsExt,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::session::{resolve_session, token_from_cookie_header, SessionError};
use crate::models::member::{Member, MemberRole};
use crate::models::workspace::Workspace;

/// Authentication context added to request extensions by the session layer
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Session backing this request (logout deletes it)
    pub session_id: Uuid,

    /// Global platform-admin flag; only honored by `/platform/*` routes
    pub is_platform_admin: bool,
}

/// Workspace context added to request extensions by the workspace layer
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    /// Resolved workspace ID
    pub workspace_id: Uuid,

    /// Workspace slug from the path
    pub slug: String,

    /// The caller's role in this workspace
    pub role: MemberRole,
}

/// Error type for the authentication/authorization middleware
#[derive(Debug)]
pub enum AuthError {
    /// No or invalid session
    Unauthorized(String),

    /// Session exists but is past its expiry
    SessionExpired,

    /// Workspace slug resolved to nothing
    WorkspaceNotFound,

    /// Caller is not a member, or the role is insufficient
    Forbidden(String),

    /// Database failure
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            AuthError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                "SESSION_EXPIRED",
                "Session expired".to_string(),
            ),
            AuthError::WorkspaceNotFound => (
                StatusCode::NOT_FOUND,
                "WORKSPACE_NOT_FOUND",
                "Workspace not found".to_string(),
            ),
            AuthError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            AuthError::Internal(msg) => {
                tracing::error!("Middleware internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": { "code": code, "message": message },
        }));

        (status, body).into_response()
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Unauthorized => {
                AuthError::Unauthorized("Authentication required".to_string())
            }
            SessionError::InvalidSession => AuthError::Unauthorized("Invalid session".to_string()),
            SessionError::SessionExpired => AuthError::SessionExpired,
            SessionError::Database(e) => AuthError::Internal(format!("Database error: {}", e)),
        }
    }
}

/// Session authentication middleware
///
/// Reads the session cookie, resolves it, and adds [`AuthContext`] to
/// request extensions.
///
/// # Errors
///
/// Returns `UNAUTHORIZED` when the cookie is missing or unknown and
/// `SESSION_EXPIRED` when the session is past its expiry (the row is purged
/// as a side effect).
pub async fn session_auth_middleware(
    pool: PgPool,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header);

    let (session, user) = resolve_session(&pool, token).await?;

    let auth_context = AuthContext {
        user_id: user.id,
        session_id: session.id,
        is_platform_admin: user.is_platform_admin,
    };
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Workspace membership middleware
///
/// Resolves the `:slug` path parameter to a workspace, then the
/// (workspace, user) pair to a membership, and adds [`WorkspaceContext`] to
/// request extensions. Must be layered after the session middleware.
///
/// # Errors
///
/// - `WORKSPACE_NOT_FOUND` when the slug matches no workspace
/// - `FORBIDDEN` when the caller is not a member; the platform-admin flag
///   gives no bypass here
pub async fn workspace_middleware(
    pool: PgPool,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| AuthError::Unauthorized("Authentication required".to_string()))?;

    let (mut parts, body) = req.into_parts();

    let Path(params) = parts
        .extract::<Path<HashMap<String, String>>>()
        .await
        .map_err(|_| AuthError::WorkspaceNotFound)?;

    let slug = params
        .get("slug")
        .cloned()
        .ok_or(AuthError::WorkspaceNotFound)?;

    let workspace = Workspace::find_by_slug(&pool, &slug)
        .await
        .map_err(|e| AuthError::Internal(format!("Database error: {}", e)))?
        .ok_or(AuthError::WorkspaceNotFound)?;

    let member = Member::find(&pool, workspace.id, auth.user_id)
        .await
        .map_err(|e| AuthError::Internal(format!("Database error: {}", e)))?
        .ok_or_else(|| AuthError::Forbidden("Not a member of this workspace".to_string()))?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(WorkspaceContext {
        workspace_id: workspace.id,
        slug: workspace.slug,
        role: member.role,
    });

    Ok(next.run(req).await)
}

/// Platform-admin gate for `/platform/*` routes
///
/// Checks the global flag on [`AuthContext`]; workspace roles play no part
/// here, and the flag plays no part in workspace routes.
pub async fn platform_admin_middleware(req: Request, next: Next) -> Result<Response, AuthError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| AuthError::Unauthorized("Authentication required".to_string()))?;

    if !auth.is_platform_admin {
        return Err(AuthError::Forbidden(
            "Platform administrator access required".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

/// Creates a session authentication middleware closure
///
/// Captures the pool so the middleware can be layered with
/// `middleware::from_fn`.
pub fn create_session_middleware(
    pool: PgPool,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>,
> + Clone {
    move |req, next| {
        let pool = pool.clone();
        Box::pin(session_auth_middleware(pool, req, next))
    }
}

/// Creates a workspace membership middleware closure
pub fn create_workspace_middleware(
    pool: PgPool,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>,
> + Clone {
    move |req, next| {
        let pool = pool.clone();
        Box::pin(workspace_middleware(pool, req, next))
    }
}

/// Creates a role allow-list gate for a route group
///
/// This is the coarse first line of defense; the fine-grained capability
/// table in [`super::rbac`] is a separate check. Fails `FORBIDDEN` when no
/// membership was resolved or the caller's role is outside the set.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::delete, Router};
/// use pipedesk_shared::auth::middleware::require_roles;
/// use pipedesk_shared::models::member::MemberRole;
///
/// # async fn delete_deal() {}
/// let admin_only: Router = Router::new()
///     .route("/deals/:id", delete(delete_deal))
///     .layer(middleware::from_fn(require_roles(&[
///         MemberRole::Owner,
///         MemberRole::Admin,
///     ])));
/// ```
pub fn require_roles(
    allowed: &'static [MemberRole],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>,
> + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let ctx = req.extensions().get::<WorkspaceContext>().ok_or_else(|| {
                AuthError::Forbidden("No workspace membership resolved".to_string())
            })?;

            if !allowed.contains(&ctx.role) {
                return Err(AuthError::Forbidden(format!(
                    "Role {} is not allowed to perform this operation",
                    ctx.role.as_str()
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_status_codes() {
        let response = AuthError::Unauthorized("no".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::SessionExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::WorkspaceNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AuthError::Forbidden("no".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = AuthError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_session_error_mapping() {
        assert!(matches!(
            AuthError::from(SessionError::Unauthorized),
            AuthError::Unauthorized(_)
        ));
        assert!(matches!(
            AuthError::from(SessionError::InvalidSession),
            AuthError::Unauthorized(_)
        ));
        assert!(matches!(
            AuthError::from(SessionError::SessionExpired),
            AuthError::SessionExpired
        ));
    }
}
