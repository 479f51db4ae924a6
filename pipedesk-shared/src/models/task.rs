/// Task model and database operations
///
/// Tasks are created either directly by members or by the automation engine
/// when a deal trigger fires (those carry `autoCreated: true` in their audit
/// payload). Checklist completion can auto-close matching open tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done', 'cancelled');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     deal_id UUID REFERENCES deals(id) ON DELETE CASCADE,
///     client_id UUID REFERENCES clients(id) ON DELETE SET NULL,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     due_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,

    /// Abandoned
    Cancelled,
}

impl TaskStatus {
    /// String form used in API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// Checks if the task still counts as open (auto-closure candidates)
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Todo | TaskStatus::InProgress)
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Workspace this task belongs to
    pub workspace_id: Uuid,

    /// Linked deal, if any
    pub deal_id: Option<Uuid>,

    /// Linked client, if any
    pub client_id: Option<Uuid>,

    /// Assigned user, if any
    pub assignee_id: Option<Uuid>,

    /// Task title
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// When the task is due, if a deadline is set
    pub due_at: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Initial status (defaults to TODO)
    #[serde(default = "default_status")]
    pub status: TaskStatus,

    /// Due date
    pub due_at: Option<DateTime<Utc>>,

    /// Linked deal
    pub deal_id: Option<Uuid>,

    /// Linked client
    pub client_id: Option<Uuid>,

    /// Assigned user
    pub assignee_id: Option<Uuid>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

/// Input for updating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New due date
    pub due_at: Option<DateTime<Utc>>,

    /// New assignee
    pub assignee_id: Option<Uuid>,
}

impl Task {
    /// Creates a new task in a workspace
    pub async fn create(
        pool: &PgPool,
        workspace_id: Uuid,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (workspace_id, deal_id, client_id, assignee_id,
                               title, description, status, due_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, workspace_id, deal_id, client_id, assignee_id,
                      title, description, status, due_at, created_at, updated_at
            "#,
        )
        .bind(workspace_id)
        .bind(data.deal_id)
        .bind(data.client_id)
        .bind(data.assignee_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.due_at)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID within a workspace
    pub async fn find_in_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, workspace_id, deal_id, client_id, assignee_id,
                   title, description, status, due_at, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND workspace_id = $2
            "#,
        )
        .bind(id)
        .bind(workspace_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks of a workspace
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, workspace_id, deal_id, client_id, assignee_id,
                   title, description, status, due_at, created_at, updated_at
            FROM tasks
            WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists open (TODO / IN_PROGRESS) tasks linked to a deal
    ///
    /// These are the auto-closure candidates for checklist completion.
    pub async fn list_open_by_deal(pool: &PgPool, deal_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, workspace_id, deal_id, client_id, assignee_id,
                   title, description, status, due_at, created_at, updated_at
            FROM tasks
            WHERE deal_id = $1 AND status IN ('todo', 'in_progress')
            ORDER BY created_at ASC
            "#,
        )
        .bind(deal_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task, writing only the provided fields
    pub async fn update(
        pool: &PgPool,
        workspace_id: Uuid,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                due_at = COALESCE($6, due_at),
                assignee_id = COALESCE($7, assignee_id),
                updated_at = NOW()
            WHERE id = $1 AND workspace_id = $2
            RETURNING id, workspace_id, deal_id, client_id, assignee_id,
                      title, description, status, due_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(workspace_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.due_at)
        .bind(data.assignee_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Marks a task DONE (checklist auto-closure)
    pub async fn mark_done(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE tasks SET status = 'done', updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, workspace_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "TODO");
        assert_eq!(TaskStatus::InProgress.as_str(), "IN_PROGRESS");
        assert_eq!(TaskStatus::Done.as_str(), "DONE");
        assert_eq!(TaskStatus::Cancelled.as_str(), "CANCELLED");
    }

    #[test]
    fn test_task_status_is_open() {
        assert!(TaskStatus::Todo.is_open());
        assert!(TaskStatus::InProgress.is_open());
        assert!(!TaskStatus::Done.is_open());
        assert!(!TaskStatus::Cancelled.is_open());
    }
}
