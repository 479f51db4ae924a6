//! # PipeDesk API Server
//!
//! Multi-tenant CRM backend: workspace RBAC, session auth, deals with
//! stage-driven task automation and checklists.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/pipedesk cargo run -p pipedesk-api
//! ```

use pipedesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use pipedesk_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipedesk_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "PipeDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
