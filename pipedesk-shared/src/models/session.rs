/// Session model and database operations
///
/// Sessions map an opaque token (carried in an httpOnly cookie) to a user.
/// Each session lives for a fixed 30-day window from creation; there is no
/// sliding expiration. Expired rows are inert and are deleted lazily the
/// next time the token is presented.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     token VARCHAR(64) NOT NULL UNIQUE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     expires_at TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Session lifetime: a fixed 30-day window from creation
pub const SESSION_TTL_DAYS: i64 = 30;

/// Session model mapping an opaque token to a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Unique session ID
    pub id: Uuid,

    /// Opaque session token (32 random bytes, hex-encoded)
    pub token: String,

    /// User this session authenticates
    pub user_id: Uuid,

    /// When the session stops being valid
    pub expires_at: DateTime<Utc>,

    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Checks whether the session is past its expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Creates a session for a user with the standard 30-day window
    ///
    /// The token must come from
    /// [`generate_session_token`](crate::auth::session::generate_session_token);
    /// collisions are astronomically unlikely at 32 random bytes, so no
    /// uniqueness retry is attempted.
    pub async fn create(pool: &PgPool, user_id: Uuid, token: &str) -> Result<Self, sqlx::Error> {
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, token, user_id, expires_at, created_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Finds a session by its token
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, token, user_id, expires_at, created_at
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Deletes a session by ID (logout, or lazy purge on expiry detection)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes all sessions for a user
    pub async fn delete_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_expired() {
        let session = Session {
            id: Uuid::new_v4(),
            token: "ab".repeat(32),
            user_id: Uuid::new_v4(),
            expires_at: Utc::now() - Duration::minutes(1),
            created_at: Utc::now() - Duration::days(31),
        };
        assert!(session.is_expired());

        let session = Session {
            expires_at: Utc::now() + Duration::days(1),
            ..session
        };
        assert!(!session.is_expired());
    }
}
