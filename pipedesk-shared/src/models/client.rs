/// Client model and database operations
///
/// Clients are the companies/contacts deals are attached to. All lookups go
/// through workspace-scoped queries so a foreign id behaves like a missing
/// row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Client model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    /// Unique client ID
    pub id: Uuid,

    /// Workspace this client belongs to
    pub workspace_id: Uuid,

    /// Client name
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone
    pub phone: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,

    /// When the client was created
    pub created_at: DateTime<Utc>,

    /// When the client was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClient {
    /// Client name
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone
    pub phone: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,
}

/// Input for updating a client
///
/// Only non-None fields are written. The AGENT role reaches this through a
/// name-only DTO at the route layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClient {
    /// New name
    pub name: Option<String>,

    /// New contact email
    pub email: Option<String>,

    /// New contact phone
    pub phone: Option<String>,

    /// New notes
    pub notes: Option<String>,
}

impl Client {
    /// Creates a new client in a workspace
    pub async fn create(
        pool: &PgPool,
        workspace_id: Uuid,
        data: CreateClient,
    ) -> Result<Self, sqlx::Error> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (workspace_id, name, email, phone, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, workspace_id, name, email, phone, notes, created_at, updated_at
            "#,
        )
        .bind(workspace_id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.notes)
        .fetch_one(pool)
        .await?;

        Ok(client)
    }

    /// Finds a client by ID within a workspace
    pub async fn find_in_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, workspace_id, name, email, phone, notes, created_at, updated_at
            FROM clients
            WHERE id = $1 AND workspace_id = $2
            "#,
        )
        .bind(id)
        .bind(workspace_id)
        .fetch_optional(pool)
        .await?;

        Ok(client)
    }

    /// Lists all clients of a workspace
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, workspace_id, name, email, phone, notes, created_at, updated_at
            FROM clients
            WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await?;

        Ok(clients)
    }

    /// Updates a client, writing only the provided fields
    ///
    /// Returns the updated client, or None if no such client exists in the
    /// workspace.
    pub async fn update(
        pool: &PgPool,
        workspace_id: Uuid,
        id: Uuid,
        data: UpdateClient,
    ) -> Result<Option<Self>, sqlx::Error> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE id = $1 AND workspace_id = $2
            RETURNING id, workspace_id, name, email, phone, notes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(workspace_id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.notes)
        .fetch_optional(pool)
        .await?;

        Ok(client)
    }

    /// Deletes a client
    pub async fn delete(pool: &PgPool, workspace_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
