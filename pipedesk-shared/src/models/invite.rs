/// Invite model and database operations
///
/// Invites let OWNER/ADMIN members offer workspace access by email before
/// the invitee has an account. Unique per (workspace_id, email); creating a
/// duplicate, or inviting an existing member, is a conflict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::member::MemberRole;

/// Invite model representing a pending workspace invitation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invite {
    /// Unique invite ID
    pub id: Uuid,

    /// Workspace the invite grants access to
    pub workspace_id: Uuid,

    /// Invitee email (case-insensitive)
    pub email: String,

    /// Role the invitee will receive on acceptance
    pub role: MemberRole,

    /// When the invite was created
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Creates a new invite
    ///
    /// # Errors
    ///
    /// Returns an error if an invite for this email already exists in the
    /// workspace (unique constraint violation) or the database connection
    /// fails. The already-a-member check is done by the route beforehand.
    pub async fn create(
        pool: &PgPool,
        workspace_id: Uuid,
        email: &str,
        role: MemberRole,
    ) -> Result<Self, sqlx::Error> {
        let invite = sqlx::query_as::<_, Invite>(
            r#"
            INSERT INTO invites (workspace_id, email, role)
            VALUES ($1, $2, $3)
            RETURNING id, workspace_id, email, role, created_at
            "#,
        )
        .bind(workspace_id)
        .bind(email)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(invite)
    }

    /// Finds an invite by ID within a workspace
    pub async fn find_in_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invite = sqlx::query_as::<_, Invite>(
            r#"
            SELECT id, workspace_id, email, role, created_at
            FROM invites
            WHERE id = $1 AND workspace_id = $2
            "#,
        )
        .bind(id)
        .bind(workspace_id)
        .fetch_optional(pool)
        .await?;

        Ok(invite)
    }

    /// Lists all pending invites of a workspace
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let invites = sqlx::query_as::<_, Invite>(
            r#"
            SELECT id, workspace_id, email, role, created_at
            FROM invites
            WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await?;

        Ok(invites)
    }

    /// Deletes an invite
    pub async fn delete(pool: &PgPool, workspace_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invites WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
