/// Audit event model and database operations
///
/// An append-only record of mutations, consumed by timeline/audit-log views.
/// Rows are never updated or deleted. Writes are best-effort: the primary
/// mutation must never fail because its audit entry could not be written, so
/// callers go through [`AuditEvent::record`], which logs and swallows any
/// storage error.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE audit_action AS ENUM ('create', 'update', 'delete', 'check', 'uncheck');
///
/// CREATE TABLE audit_events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     actor_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     entity_type VARCHAR(50) NOT NULL,
///     entity_id UUID NOT NULL,
///     action audit_action NOT NULL,
///     payload JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// Audit action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Entity created
    Create,

    /// Entity updated
    Update,

    /// Entity deleted
    Delete,

    /// Checklist item completed
    Check,

    /// Checklist item uncompleted
    Uncheck,
}

impl AuditAction {
    /// String form used in API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Check => "CHECK",
            AuditAction::Uncheck => "UNCHECK",
        }
    }
}

/// Audit event model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: Uuid,

    /// Workspace the mutation happened in
    pub workspace_id: Uuid,

    /// User who performed the mutation (None once the user is deleted)
    pub actor_id: Option<Uuid>,

    /// Entity kind, e.g. "deal", "task", "checklist_item"
    pub entity_type: String,

    /// ID of the mutated entity
    pub entity_id: Uuid,

    /// What happened
    pub action: AuditAction,

    /// Free-form context, e.g. `{"autoCreated": true, "templateId": "..."}`
    pub payload: JsonValue,

    /// When the event was recorded
    pub created_at: DateTime<Utc>,
}

/// Input for appending an audit event
#[derive(Debug, Clone)]
pub struct AppendAudit<'a> {
    /// Workspace the mutation happened in
    pub workspace_id: Uuid,

    /// Acting user
    pub actor_id: Option<Uuid>,

    /// Entity kind
    pub entity_type: &'a str,

    /// Mutated entity ID
    pub entity_id: Uuid,

    /// What happened
    pub action: AuditAction,

    /// Free-form context
    pub payload: JsonValue,
}

impl AuditEvent {
    /// Appends an audit event, propagating storage errors
    ///
    /// Most callers want [`AuditEvent::record`] instead.
    pub async fn append(pool: &PgPool, data: AppendAudit<'_>) -> Result<Self, sqlx::Error> {
        let event = sqlx::query_as::<_, AuditEvent>(
            r#"
            INSERT INTO audit_events (workspace_id, actor_id, entity_type, entity_id,
                                      action, payload)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, workspace_id, actor_id, entity_type, entity_id, action,
                      payload, created_at
            "#,
        )
        .bind(data.workspace_id)
        .bind(data.actor_id)
        .bind(data.entity_type)
        .bind(data.entity_id)
        .bind(data.action)
        .bind(data.payload)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    /// Appends an audit event, logging and swallowing any failure
    ///
    /// Audit is not transactional with the primary mutation; a failed write
    /// is logged at `warn` and otherwise ignored.
    pub async fn record(pool: &PgPool, data: AppendAudit<'_>) {
        let entity_type = data.entity_type.to_string();
        let action = data.action;

        if let Err(err) = Self::append(pool, data).await {
            warn!(
                entity_type = %entity_type,
                action = %action.as_str(),
                error = %err,
                "Failed to write audit event"
            );
        }
    }

    /// Lists a workspace's audit timeline, newest first
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let events = sqlx::query_as::<_, AuditEvent>(
            r#"
            SELECT id, workspace_id, actor_id, entity_type, entity_id, action,
                   payload, created_at
            FROM audit_events
            WHERE workspace_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(workspace_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_action_as_str() {
        assert_eq!(AuditAction::Create.as_str(), "CREATE");
        assert_eq!(AuditAction::Update.as_str(), "UPDATE");
        assert_eq!(AuditAction::Delete.as_str(), "DELETE");
        assert_eq!(AuditAction::Check.as_str(), "CHECK");
        assert_eq!(AuditAction::Uncheck.as_str(), "UNCHECK");
    }
}
