/// Deal model and database operations
///
/// Deals move through a fixed sales pipeline. The stage column is a
/// free-form string, constrained in practice to [`PIPELINE_STAGES`]; stage
/// transitions are the trigger for the task-automation engine.
///
/// # Pipeline
///
/// ```text
/// lead → qualification → proposal → negotiation → closed_won
///                                               → closed_lost
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// The six pipeline stages, in order
pub const PIPELINE_STAGES: [&str; 6] = [
    "lead",
    "qualification",
    "proposal",
    "negotiation",
    "closed_won",
    "closed_lost",
];

/// Checks whether a stage string is one of the known pipeline stages
pub fn is_known_stage(stage: &str) -> bool {
    PIPELINE_STAGES.contains(&stage)
}

/// Deal model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Deal {
    /// Unique deal ID
    pub id: Uuid,

    /// Workspace this deal belongs to
    pub workspace_id: Uuid,

    /// Linked client, if any
    pub client_id: Option<Uuid>,

    /// Assigned user, if any
    pub assignee_id: Option<Uuid>,

    /// Deal title
    pub title: String,

    /// Current pipeline stage
    pub stage: String,

    /// Deal amount
    pub amount: Option<f64>,

    /// When the deal was created
    pub created_at: DateTime<Utc>,

    /// When the deal was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeal {
    /// Deal title
    pub title: String,

    /// Initial stage (defaults to "lead")
    #[serde(default = "default_stage")]
    pub stage: String,

    /// Deal amount
    pub amount: Option<f64>,

    /// Linked client
    pub client_id: Option<Uuid>,

    /// Assigned user
    pub assignee_id: Option<Uuid>,
}

fn default_stage() -> String {
    "lead".to_string()
}

/// Input for updating a deal
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDeal {
    /// New title
    pub title: Option<String>,

    /// New stage; a value different from the current stage fires the
    /// DEAL_STAGE_CHANGED automation trigger
    pub stage: Option<String>,

    /// New amount
    pub amount: Option<f64>,

    /// New linked client
    pub client_id: Option<Uuid>,

    /// New assignee
    pub assignee_id: Option<Uuid>,
}

impl Deal {
    /// Creates a new deal in a workspace
    pub async fn create(
        pool: &PgPool,
        workspace_id: Uuid,
        data: CreateDeal,
    ) -> Result<Self, sqlx::Error> {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            INSERT INTO deals (workspace_id, title, stage, amount, client_id, assignee_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, workspace_id, client_id, assignee_id, title, stage, amount,
                      created_at, updated_at
            "#,
        )
        .bind(workspace_id)
        .bind(data.title)
        .bind(data.stage)
        .bind(data.amount)
        .bind(data.client_id)
        .bind(data.assignee_id)
        .fetch_one(pool)
        .await?;

        Ok(deal)
    }

    /// Finds a deal by ID within a workspace
    pub async fn find_in_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            SELECT id, workspace_id, client_id, assignee_id, title, stage, amount,
                   created_at, updated_at
            FROM deals
            WHERE id = $1 AND workspace_id = $2
            "#,
        )
        .bind(id)
        .bind(workspace_id)
        .fetch_optional(pool)
        .await?;

        Ok(deal)
    }

    /// Lists all deals of a workspace
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let deals = sqlx::query_as::<_, Deal>(
            r#"
            SELECT id, workspace_id, client_id, assignee_id, title, stage, amount,
                   created_at, updated_at
            FROM deals
            WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await?;

        Ok(deals)
    }

    /// Updates a deal, writing only the provided fields
    ///
    /// Returns the updated deal, or None if no such deal exists in the
    /// workspace. Stage-change detection (and the automation it triggers) is
    /// the caller's responsibility: compare against the previously fetched
    /// deal before calling.
    pub async fn update(
        pool: &PgPool,
        workspace_id: Uuid,
        id: Uuid,
        data: UpdateDeal,
    ) -> Result<Option<Self>, sqlx::Error> {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            UPDATE deals
            SET title = COALESCE($3, title),
                stage = COALESCE($4, stage),
                amount = COALESCE($5, amount),
                client_id = COALESCE($6, client_id),
                assignee_id = COALESCE($7, assignee_id),
                updated_at = NOW()
            WHERE id = $1 AND workspace_id = $2
            RETURNING id, workspace_id, client_id, assignee_id, title, stage, amount,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(workspace_id)
        .bind(data.title)
        .bind(data.stage)
        .bind(data.amount)
        .bind(data.client_id)
        .bind(data.assignee_id)
        .fetch_optional(pool)
        .await?;

        Ok(deal)
    }

    /// Deletes a deal
    pub async fn delete(pool: &PgPool, workspace_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM deals WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts all deals (platform dashboard)
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM deals")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_stages() {
        assert_eq!(PIPELINE_STAGES.len(), 6);
        assert!(is_known_stage("lead"));
        assert!(is_known_stage("closed_lost"));
        assert!(!is_known_stage("LEAD"));
        assert!(!is_known_stage("archived"));
    }
}
