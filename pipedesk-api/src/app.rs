/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with the
/// full middleware chain. Every workspace-scoped route runs, in order:
/// session resolution → workspace/membership resolution → role gate →
/// handler. Mutating route groups carry role allow-lists; read groups only
/// require membership.
///
/// # Route map
///
/// ```text
/// /health                                  # public
/// /api/auth/{register,login}               # public
/// /api/auth/{logout,me}                    # session
/// /api/workspaces                          # session
/// /api/workspaces/:slug/...                # session + membership (+ role gate)
/// /api/platform/...                        # session + platform-admin flag
/// ```

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use pipedesk_shared::auth::middleware::{
    create_session_middleware, create_workspace_middleware, platform_admin_middleware,
    require_roles,
};
use pipedesk_shared::models::member::MemberRole;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::routes;

/// Roles allowed to delete entities and manage members/invites
pub const ADMIN_ROLES: &[MemberRole] = &[MemberRole::Owner, MemberRole::Admin];

/// Roles allowed to create and edit domain entities (everyone but VIEWER)
pub const EDITOR_ROLES: &[MemberRole] = &[
    MemberRole::Owner,
    MemberRole::Admin,
    MemberRole::Manager,
    MemberRole::Agent,
];

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Whether session cookies should carry the Secure attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.api.production
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let pool = state.db.clone();

    // Public routes
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Session-only routes (no workspace context)
    let session_auth_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me))
        .layer(middleware::from_fn(create_session_middleware(pool.clone())));

    // Routed at the literal path (not nested) so it cannot conflict with
    // the "/workspaces/:slug" subtree below.
    let workspace_list_routes = Router::new()
        .route(
            "/workspaces",
            post(routes::workspaces::create_workspace).get(routes::workspaces::list_workspaces),
        )
        .layer(middleware::from_fn(create_session_middleware(pool.clone())));

    // Workspace-scoped routes, split by required role set.
    // Read access only requires membership; the workspace middleware already
    // rejected non-members.
    let workspace_read_routes = Router::new()
        .route("/members", get(routes::members::list_members))
        .route("/invites", get(routes::invites::list_invites))
        .route("/permissions", get(routes::members::my_permissions))
        .route("/clients", get(routes::clients::list_clients))
        .route("/clients/:id", get(routes::clients::get_client))
        .route("/deals", get(routes::deals::list_deals))
        .route("/deals/:id", get(routes::deals::get_deal))
        .route("/deals/:id/checklist", get(routes::deals::get_checklist))
        .route("/tasks", get(routes::tasks::list_tasks))
        .route("/tasks/:id", get(routes::tasks::get_task))
        .route("/audit", get(routes::audit::list_audit_events));

    let workspace_editor_routes = Router::new()
        .route("/clients", post(routes::clients::create_client))
        .route("/clients/:id", patch(routes::clients::update_client))
        .route("/deals", post(routes::deals::create_deal))
        .route("/deals/:id", patch(routes::deals::update_deal))
        .route("/deals/:id/checklist", post(routes::deals::toggle_checklist_item))
        .route("/tasks", post(routes::tasks::create_task))
        .route("/tasks/:id", patch(routes::tasks::update_task))
        .route_layer(middleware::from_fn(require_roles(EDITOR_ROLES)));

    let workspace_admin_routes = Router::new()
        .route(
            "/members/:user_id",
            patch(routes::members::update_member_role).delete(routes::members::remove_member),
        )
        .route("/invites", post(routes::invites::create_invite))
        .route("/invites/:id", delete(routes::invites::delete_invite))
        .route("/clients/:id", delete(routes::clients::delete_client))
        .route("/deals/:id", delete(routes::deals::delete_deal))
        .route("/tasks/:id", delete(routes::tasks::delete_task))
        .route_layer(middleware::from_fn(require_roles(ADMIN_ROLES)));

    let workspace_routes = Router::new()
        .merge(workspace_read_routes)
        .merge(workspace_editor_routes)
        .merge(workspace_admin_routes)
        .layer(middleware::from_fn(create_workspace_middleware(pool.clone())))
        .layer(middleware::from_fn(create_session_middleware(pool.clone())));

    // Platform routes: the global flag, not workspace RBAC
    let platform_routes = Router::new()
        .route("/stats", get(routes::platform::platform_stats))
        .route("/workspaces", get(routes::platform::list_all_workspaces))
        .layer(middleware::from_fn(platform_admin_middleware))
        .layer(middleware::from_fn(create_session_middleware(pool)));

    let api_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(session_auth_routes))
        .merge(workspace_list_routes)
        .nest("/workspaces/:slug", workspace_routes)
        .nest("/platform", platform_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
