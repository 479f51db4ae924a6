/// Member model and database operations
///
/// A Member row grants one user one role inside one workspace. This is the
/// join entity every workspace-scoped authorization decision rests on: no
/// row means no access, whatever the user's global flags say.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE member_role AS ENUM ('owner', 'admin', 'manager', 'agent', 'viewer');
///
/// CREATE TABLE members (
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role member_role NOT NULL DEFAULT 'agent',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (workspace_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// Ordered informally by privilege (the authoritative capability table lives
/// in [`crate::auth::rbac`]):
///
/// - **OWNER**: every capability; at least one must remain per workspace
/// - **ADMIN**: identical capability set to OWNER
/// - **MANAGER**: everything except deletes
/// - **AGENT**: day-to-day field updates only
/// - **VIEWER**: read-only

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Workspace roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    /// Full control over the workspace
    Owner,

    /// Same capability set as Owner
    Admin,

    /// Manages pipeline and clients, cannot delete
    Manager,

    /// Works deals: stage, amount, checklists, tasks
    Agent,

    /// Read-only access
    Viewer,
}

impl MemberRole {
    /// String form used in API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "OWNER",
            MemberRole::Admin => "ADMIN",
            MemberRole::Manager => "MANAGER",
            MemberRole::Agent => "AGENT",
            MemberRole::Viewer => "VIEWER",
        }
    }

    /// Parses a role from its API string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OWNER" => Some(MemberRole::Owner),
            "ADMIN" => Some(MemberRole::Admin),
            "MANAGER" => Some(MemberRole::Manager),
            "AGENT" => Some(MemberRole::Agent),
            "VIEWER" => Some(MemberRole::Viewer),
            _ => None,
        }
    }
}

/// Member model representing a (workspace, user, role) association
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    /// Workspace ID
    pub workspace_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the workspace
    pub role: MemberRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Creates a new membership (adds a user to a workspace)
    ///
    /// # Errors
    ///
    /// Returns an error if the membership already exists (unique constraint
    /// on the (workspace_id, user_id) primary key) or the database
    /// connection fails.
    pub async fn create(
        pool: &PgPool,
        workspace_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (workspace_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING workspace_id, user_id, role, created_at
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Finds a specific membership
    pub async fn find(
        pool: &PgPool,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            SELECT workspace_id, user_id, role, created_at
            FROM members
            WHERE workspace_id = $1 AND user_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Updates a member's role
    ///
    /// Returns the updated membership, or None if no such membership exists.
    pub async fn update_role(
        pool: &PgPool,
        workspace_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET role = $3
            WHERE workspace_id = $1 AND user_id = $2
            RETURNING workspace_id, user_id, role, created_at
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Deletes a membership (removes the user from the workspace)
    ///
    /// The self-removal and last-owner rules are enforced by the members
    /// route before this is called; this method is a plain delete.
    pub async fn delete(
        pool: &PgPool,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM members WHERE workspace_id = $1 AND user_id = $2")
            .bind(workspace_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all members of a workspace
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT workspace_id, user_id, role, created_at
            FROM members
            WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Counts OWNER memberships in a workspace
    ///
    /// Read by the members route before a removal to enforce the
    /// at-least-one-owner invariant. The count and the subsequent delete are
    /// separate statements; concurrent removals can race (accepted).
    pub async fn count_owners(pool: &PgPool, workspace_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM members WHERE workspace_id = $1 AND role = 'owner'",
        )
        .bind(workspace_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role_as_str() {
        assert_eq!(MemberRole::Owner.as_str(), "OWNER");
        assert_eq!(MemberRole::Admin.as_str(), "ADMIN");
        assert_eq!(MemberRole::Manager.as_str(), "MANAGER");
        assert_eq!(MemberRole::Agent.as_str(), "AGENT");
        assert_eq!(MemberRole::Viewer.as_str(), "VIEWER");
    }

    #[test]
    fn test_member_role_round_trip() {
        for role in [
            MemberRole::Owner,
            MemberRole::Admin,
            MemberRole::Manager,
            MemberRole::Agent,
            MemberRole::Viewer,
        ] {
            assert_eq!(MemberRole::from_str(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_member_role_from_unknown() {
        assert_eq!(MemberRole::from_str("SUPERUSER"), None);
        assert_eq!(MemberRole::from_str("owner"), None);
        assert_eq!(MemberRole::from_str(""), None);
    }
}
