/// Database models for PipeDesk
///
/// This module contains all database models and their CRUD operations.
/// Each model is a `sqlx::FromRow` struct with static async methods taking
/// a `&PgPool`; workspace-scoped entities always filter by `workspace_id`.
///
/// # Models
///
/// - `user`: User accounts and the platform-admin flag
/// - `session`: Opaque-token sessions with a fixed 30-day window
/// - `workspace`: Tenant boundary, addressed by slug
/// - `member`: (workspace, user, role) associations, the RBAC anchor
/// - `invite`: Pending workspace invitations by email
/// - `client`: CRM clients
/// - `deal`: Pipeline deals; stage transitions drive automation
/// - `task`: Work items, user-created or auto-generated
/// - `task_template`: Blueprints the automation engine materializes
/// - `checklist`: Per-(deal, stage) required steps
/// - `audit`: Append-only audit log (best-effort writes)

pub mod audit;
pub mod checklist;
pub mod client;
pub mod deal;
pub mod invite;
pub mod member;
pub mod session;
pub mod task;
pub mod task_template;
pub mod user;
pub mod workspace;
