use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_backend::config::AppConfig;
use storefront_backend::routes::create_router;
use storefront_backend::services::{mailer::LogMailer, session_store::SessionStore};
use storefront_backend::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Connect to database
    tracing::info!("Connecting to database...");
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);
    let db = Database::connect(options).await?;

    if config.run_migrations {
        tracing::info!("Running migrations...");
        migration::Migrator::up(&db, None).await?;
    }

    let state = AppState {
        db,
        sessions: SessionStore::new(
            Duration::from_secs(config.session_idle_secs),
            config.session_max_capacity,
        ),
        mailer: Arc::new(LogMailer::new(config.mail_from.clone())),
    };

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
