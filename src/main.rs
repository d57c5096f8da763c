use anyhow::Context;
use tracing_subscriber::EnvFilter;

use finance_api::config::config;
use finance_api::database::DatabaseManager;
use finance_api::{app, is_production, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finance_api=debug,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Finance API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if is_production!() {
            anyhow::bail!("JWT_SECRET_KEY must be set in production");
        }
        tracing::warn!("JWT_SECRET_KEY is not set; issuing and verifying tokens will fail");
    }

    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        db.migrate().await.context("failed to run migrations")?;
    }

    let app = app(AppState::from_config(db.clone(), config));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Finance API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
