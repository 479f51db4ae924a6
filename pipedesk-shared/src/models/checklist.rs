/// Deal checklist item model and database operations
///
/// Checklist items are keyed by the (deal_id, stage, title) unique triple.
/// The set of required titles per stage is a static table in
/// [`crate::automation::checklist`]; rows are lazily materialized the first
/// time a deal's checklist is viewed for its current stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Checklist item model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChecklistItem {
    /// Unique item ID
    pub id: Uuid,

    /// Deal this item belongs to
    pub deal_id: Uuid,

    /// Pipeline stage this item belongs to
    pub stage: String,

    /// Required step title (one of the static per-stage titles)
    pub title: String,

    /// Whether the step has been completed
    pub completed: bool,

    /// Who completed it (cleared on uncomplete)
    pub completed_by: Option<Uuid>,

    /// When it was completed (cleared on uncomplete)
    pub completed_at: Option<DateTime<Utc>>,

    /// When the row was materialized
    pub created_at: DateTime<Utc>,
}

impl ChecklistItem {
    /// Inserts a required item if it is not present yet
    ///
    /// Idempotent via the (deal_id, stage, title) unique constraint;
    /// concurrent materializations of the same title leave a single row.
    pub async fn insert_missing(
        pool: &PgPool,
        deal_id: Uuid,
        stage: &str,
        title: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO deal_checklist_items (deal_id, stage, title)
            VALUES ($1, $2, $3)
            ON CONFLICT (deal_id, stage, title) DO NOTHING
            "#,
        )
        .bind(deal_id)
        .bind(stage)
        .bind(title)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Finds an item by its (deal, stage, title) key
    pub async fn find(
        pool: &PgPool,
        deal_id: Uuid,
        stage: &str,
        title: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, ChecklistItem>(
            r#"
            SELECT id, deal_id, stage, title, completed, completed_by, completed_at, created_at
            FROM deal_checklist_items
            WHERE deal_id = $1 AND stage = $2 AND title = $3
            "#,
        )
        .bind(deal_id)
        .bind(stage)
        .bind(title)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Lists all items of a deal's stage, in materialization order
    pub async fn list_for_stage(
        pool: &PgPool,
        deal_id: Uuid,
        stage: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let items = sqlx::query_as::<_, ChecklistItem>(
            r#"
            SELECT id, deal_id, stage, title, completed, completed_by, completed_at, created_at
            FROM deal_checklist_items
            WHERE deal_id = $1 AND stage = $2
            ORDER BY created_at ASC, title ASC
            "#,
        )
        .bind(deal_id)
        .bind(stage)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Sets the completed flag, stamping or clearing the completer identity
    ///
    /// Completing records who and when; uncompleting clears both.
    pub async fn set_completed(
        pool: &PgPool,
        id: Uuid,
        completed: bool,
        completed_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let item = if completed {
            sqlx::query_as::<_, ChecklistItem>(
                r#"
                UPDATE deal_checklist_items
                SET completed = TRUE, completed_by = $2, completed_at = NOW()
                WHERE id = $1
                RETURNING id, deal_id, stage, title, completed, completed_by, completed_at,
                          created_at
                "#,
            )
            .bind(id)
            .bind(completed_by)
            .fetch_one(pool)
            .await?
        } else {
            sqlx::query_as::<_, ChecklistItem>(
                r#"
                UPDATE deal_checklist_items
                SET completed = FALSE, completed_by = NULL, completed_at = NULL
                WHERE id = $1
                RETURNING id, deal_id, stage, title, completed, completed_by, completed_at,
                          created_at
                "#,
            )
            .bind(id)
            .fetch_one(pool)
            .await?
        };

        Ok(item)
    }

    /// Counts (completed, total) items for a deal's stage
    pub async fn completion_counts(
        pool: &PgPool,
        deal_id: Uuid,
        stage: &str,
    ) -> Result<(i64, i64), sqlx::Error> {
        let (completed, total): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE completed), COUNT(*)
            FROM deal_checklist_items
            WHERE deal_id = $1 AND stage = $2
            "#,
        )
        .bind(deal_id)
        .bind(stage)
        .fetch_one(pool)
        .await?;

        Ok((completed, total))
    }
}
