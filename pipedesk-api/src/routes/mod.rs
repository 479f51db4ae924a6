/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, logout, current user
/// - `workspaces`: Workspace creation and listing
/// - `members`: Membership listing, role changes, removal
/// - `invites`: Workspace invitations
/// - `clients`: CRM clients
/// - `deals`: Deals, stage transitions, checklists
/// - `tasks`: Tasks
/// - `audit`: Audit timeline
/// - `platform`: Platform-admin dashboards

pub mod audit;
pub mod auth;
pub mod clients;
pub mod deals;
pub mod health;
pub mod invites;
pub mod members;
pub mod platform;
pub mod tasks;
pub mod workspaces;
