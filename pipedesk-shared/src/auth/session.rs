/// Session token generation and resolution
///
/// Sessions are opaque tokens carried in an httpOnly cookie. A token is 32
/// bytes from the OS RNG, hex-encoded; at that size collisions are
/// astronomically unlikely, so no uniqueness retry exists. Resolution maps a
/// presented token to a (session, user) pair and purges expired rows as a
/// side effect, making expiry idempotent: the second use of an expired token
/// is indistinguishable from an unknown token.
///
/// # Example
///
/// ```no_run
/// use pipedesk_shared::auth::session::{generate_session_token, resolve_session};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let token = generate_session_token();
/// assert_eq!(token.len(), 64);
///
/// let (session, user) = resolve_session(&pool, Some(&token)).await?;
/// # Ok(())
/// # }
/// ```

use rand::RngCore;
use sqlx::PgPool;
use tracing::debug;

use crate::models::session::{Session, SESSION_TTL_DAYS};
use crate::models::user::User;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "pd_session";

/// Error type for session resolution
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No token was presented
    #[error("Authentication required")]
    Unauthorized,

    /// Token is not associated with any session
    #[error("Invalid session")]
    InvalidSession,

    /// Session exists but is past its expiry (the row has been purged)
    #[error("Session expired")]
    SessionExpired,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Generates a new opaque session token
///
/// 32 bytes from the OS RNG, hex-encoded to 64 characters.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Resolves a presented session token to its session and user
///
/// # Errors
///
/// - `Unauthorized` when no token (or an empty one) is presented
/// - `InvalidSession` when the token matches no session
/// - `SessionExpired` when the session is past its expiry; the expired row
///   is deleted before returning, so presenting the same token again yields
///   `InvalidSession`
pub async fn resolve_session(
    pool: &PgPool,
    token: Option<&str>,
) -> Result<(Session, User), SessionError> {
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return Err(SessionError::Unauthorized),
    };

    let session = Session::find_by_token(pool, token)
        .await?
        .ok_or(SessionError::InvalidSession)?;

    if session.is_expired() {
        debug!(session_id = %session.id, "Purging expired session");
        Session::delete(pool, session.id).await?;
        return Err(SessionError::SessionExpired);
    }

    let user = User::find_by_id(pool, session.user_id)
        .await?
        .ok_or(SessionError::InvalidSession)?;

    Ok((session, user))
}

/// Extracts the session token from a Cookie header value
///
/// Accepts the raw `Cookie` header (`a=1; pd_session=abc; b=2`) and returns
/// the session token if present.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Some(value)
        } else {
            None
        }
    })
}

/// Builds the Set-Cookie value that installs a session cookie
///
/// httpOnly, SameSite=Lax, 30-day max-age; Secure when `secure` is set
/// (production).
pub fn build_session_cookie(token: &str, secure: bool) -> String {
    let max_age = SESSION_TTL_DAYS * 24 * 60 * 60;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the Set-Cookie value that clears the session cookie (logout)
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_token_format() {
        let token = generate_session_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_session_token_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }

    #[test]
    fn test_token_from_cookie_header() {
        assert_eq!(
            token_from_cookie_header("pd_session=abc123"),
            Some("abc123")
        );
        assert_eq!(
            token_from_cookie_header("theme=dark; pd_session=abc123; lang=ru"),
            Some("abc123")
        );
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header(""), None);
        // A cookie whose name merely contains the session name must not match
        assert_eq!(token_from_cookie_header("xpd_session=abc"), None);
    }

    #[test]
    fn test_build_session_cookie() {
        let cookie = build_session_cookie("tok", false);
        assert!(cookie.starts_with("pd_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=2592000"));
        assert!(!cookie.contains("Secure"));

        let cookie = build_session_cookie("tok", true);
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn test_clear_session_cookie() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.starts_with("pd_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
