/// Deal automation
///
/// Event-driven side effects around the deal pipeline:
///
/// - [`engine`]: materializes task templates when a deal is created or moves
///   to a different stage
/// - [`checklist`]: per-stage required steps, with auto-closure of matching
///   open tasks on completion
/// - [`matcher`]: the pluggable text-matching strategy auto-closure uses
///
/// # Failure policy
///
/// Automation is a convenience layer, not part of the primary mutation. Side
/// effects return `Result<(), SideEffectError>` and are always invoked
/// through [`fire_and_forget`], which logs failures and discards them; a
/// broken template or a dropped audit write can never fail a deal update.
/// The authorization layer has the opposite policy: every failure there
/// short-circuits the request.

pub mod checklist;
pub mod engine;
pub mod matcher;

use std::future::Future;

use tracing::warn;

/// Error type for best-effort side effects
#[derive(Debug, thiserror::Error)]
pub enum SideEffectError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Awaits a side effect, logging and discarding any failure
///
/// The single funnel for the swallow-errors policy: routing a call through
/// here is a visible statement that it cannot affect the primary mutation's
/// outcome.
pub async fn fire_and_forget<F>(context: &'static str, fut: F)
where
    F: Future<Output = Result<(), SideEffectError>>,
{
    if let Err(err) = fut.await {
        warn!(
            context,
            error = %err,
            "Side effect failed; primary mutation unaffected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fire_and_forget_swallows_errors() {
        // Must not panic or propagate.
        fire_and_forget("test", async {
            Err(SideEffectError::Database(sqlx::Error::RowNotFound))
        })
        .await;

        fire_and_forget("test", async { Ok(()) }).await;
    }
}
