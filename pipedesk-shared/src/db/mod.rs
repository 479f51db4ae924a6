/// Database layer
///
/// PostgreSQL connection pooling and schema migrations.
///
/// # Modules
///
/// - `pool`: Connection pool creation and health checks
/// - `migrations`: sqlx migration runner

pub mod migrations;
pub mod pool;
