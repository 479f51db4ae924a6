/// Authentication endpoints
///
/// Session-cookie authentication: register and login create a session and
/// install the httpOnly cookie; logout destroys the session and clears it.
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create an account and start a session
/// - `POST /api/auth/login` - Start a session
/// - `POST /api/auth/logout` - Destroy the current session
/// - `GET /api/auth/me` - Current user

use axum::{extract::State, http::header, response::IntoResponse, Extension, Json};
use pipedesk_shared::auth::middleware::AuthContext;
use pipedesk_shared::auth::password::{hash_password, verify_password};
use pipedesk_shared::auth::session::{
    build_session_cookie, clear_session_cookie, generate_session_token,
};
use pipedesk_shared::models::session::Session;
use pipedesk_shared::models::user::{CreateUser, User};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::app::AppState;
use crate::error::{success, ApiError, ApiResult};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Register a new user
///
/// Creates the account, starts a 30-day session and installs the session
/// cookie. Workspaces are created separately via `POST /api/workspaces`.
///
/// # Errors
///
/// - `422 VALIDATION_ERROR`: malformed email or short password
/// - `409 CONFLICT`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let password_hash = hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name,
        },
    )
    .await
    .map_err(|err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ApiError::Conflict("Email already registered".to_string())
        }
        _ => ApiError::from(err),
    })?;

    let token = generate_session_token();
    Session::create(&state.db, user.id, &token).await?;

    let cookie = build_session_cookie(&token, state.secure_cookies());

    Ok((
        [(header::SET_COOKIE, cookie)],
        success(json!({ "user": user })),
    ))
}

/// Login
///
/// Verifies the password, starts a fresh session and installs the cookie.
/// A wrong email and a wrong password are indistinguishable to the caller.
///
/// # Errors
///
/// - `401 UNAUTHORIZED`: unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = generate_session_token();
    Session::create(&state.db, user.id, &token).await?;
    User::touch_last_login(&state.db, user.id).await?;

    let cookie = build_session_cookie(&token, state.secure_cookies());

    Ok((
        [(header::SET_COOKIE, cookie)],
        success(json!({ "user": user })),
    ))
}

/// Logout
///
/// Destroys the session backing this request and clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<impl IntoResponse> {
    Session::delete(&state.db, auth.session_id).await?;

    let cookie = clear_session_cookie(state.secure_cookies());

    Ok((
        [(header::SET_COOKIE, cookie)],
        success(json!({ "loggedOut": true })),
    ))
}

/// Current user
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<impl IntoResponse> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))?;

    Ok(success(json!({ "user": user })))
}
