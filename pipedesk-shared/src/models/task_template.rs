/// Task template model and database operations
///
/// Templates are workspace-scoped blueprints the automation engine turns
/// into tasks when a deal trigger fires. Seeded templates use a
/// deterministic id derived from (workspace, trigger), so `upsert` makes
/// repeated seeding a no-op.
///
/// # Triggers
///
/// - `DEAL_CREATED`: fires once, right after a deal is persisted, whatever
///   its initial stage; `trigger_value` is ignored.
/// - `DEAL_STAGE_CHANGED`: fires when an update moves a deal to a different
///   stage; `trigger_value` must equal the new stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::task::TaskStatus;

/// Domain event kinds the automation engine listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "trigger_kind", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerKind {
    /// A deal was created
    DealCreated,

    /// A deal moved to a different stage
    DealStageChanged,
}

impl TriggerKind {
    /// String form used in API and audit payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::DealCreated => "DEAL_CREATED",
            TriggerKind::DealStageChanged => "DEAL_STAGE_CHANGED",
        }
    }
}

/// Task template model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskTemplate {
    /// Template ID; deterministic for seeded templates
    pub id: Uuid,

    /// Workspace this template belongs to
    pub workspace_id: Uuid,

    /// Event kind the template reacts to
    pub trigger_kind: TriggerKind,

    /// Match key for DEAL_STAGE_CHANGED (the target stage); None for
    /// DEAL_CREATED
    pub trigger_value: Option<String>,

    /// Title of the generated task
    pub title: String,

    /// Description of the generated task
    pub description: Option<String>,

    /// Due offset in days from the moment the trigger fires; None means the
    /// generated task has no due date
    pub due_days: Option<i32>,

    /// Status the generated task starts in
    pub initial_status: TaskStatus,

    /// When the template was created
    pub created_at: DateTime<Utc>,
}

/// Input for upserting a task template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertTaskTemplate {
    /// Template ID (deterministic for seeded templates)
    pub id: Uuid,

    /// Event kind the template reacts to
    pub trigger_kind: TriggerKind,

    /// Match key for DEAL_STAGE_CHANGED
    pub trigger_value: Option<String>,

    /// Title of the generated task
    pub title: String,

    /// Description of the generated task
    pub description: Option<String>,

    /// Due offset in days
    pub due_days: Option<i32>,

    /// Status the generated task starts in
    pub initial_status: TaskStatus,
}

impl TaskTemplate {
    /// Inserts a template, or updates it in place when the id already exists
    ///
    /// Idempotent by id: seeding the same workspace twice leaves a single
    /// row per trigger.
    pub async fn upsert(
        pool: &PgPool,
        workspace_id: Uuid,
        data: UpsertTaskTemplate,
    ) -> Result<Self, sqlx::Error> {
        let template = sqlx::query_as::<_, TaskTemplate>(
            r#"
            INSERT INTO task_templates
                (id, workspace_id, trigger_kind, trigger_value, title, description,
                 due_days, initial_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE
            SET trigger_kind = EXCLUDED.trigger_kind,
                trigger_value = EXCLUDED.trigger_value,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                due_days = EXCLUDED.due_days,
                initial_status = EXCLUDED.initial_status
            RETURNING id, workspace_id, trigger_kind, trigger_value, title, description,
                      due_days, initial_status, created_at
            "#,
        )
        .bind(data.id)
        .bind(workspace_id)
        .bind(data.trigger_kind)
        .bind(data.trigger_value)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_days)
        .bind(data.initial_status)
        .fetch_one(pool)
        .await?;

        Ok(template)
    }

    /// Finds templates matching a trigger
    ///
    /// For DEAL_CREATED the trigger value is ignored; for DEAL_STAGE_CHANGED
    /// only templates whose stored value equals `trigger_value` match.
    pub async fn find_for_trigger(
        pool: &PgPool,
        workspace_id: Uuid,
        kind: TriggerKind,
        trigger_value: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let templates = match kind {
            TriggerKind::DealCreated => {
                sqlx::query_as::<_, TaskTemplate>(
                    r#"
                    SELECT id, workspace_id, trigger_kind, trigger_value, title, description,
                           due_days, initial_status, created_at
                    FROM task_templates
                    WHERE workspace_id = $1 AND trigger_kind = $2
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(workspace_id)
                .bind(kind)
                .fetch_all(pool)
                .await?
            }
            TriggerKind::DealStageChanged => {
                sqlx::query_as::<_, TaskTemplate>(
                    r#"
                    SELECT id, workspace_id, trigger_kind, trigger_value, title, description,
                           due_days, initial_status, created_at
                    FROM task_templates
                    WHERE workspace_id = $1 AND trigger_kind = $2 AND trigger_value = $3
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(workspace_id)
                .bind(kind)
                .bind(trigger_value)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(templates)
    }

    /// Lists all templates of a workspace
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let templates = sqlx::query_as::<_, TaskTemplate>(
            r#"
            SELECT id, workspace_id, trigger_kind, trigger_value, title, description,
                   due_days, initial_status, created_at
            FROM task_templates
            WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await?;

        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_kind_as_str() {
        assert_eq!(TriggerKind::DealCreated.as_str(), "DEAL_CREATED");
        assert_eq!(TriggerKind::DealStageChanged.as_str(), "DEAL_STAGE_CHANGED");
    }
}
