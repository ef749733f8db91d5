use std::env;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_backend::config::AppConfig;
use storefront_backend::services::seed;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_backend=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    migration::Migrator::up(&db, None).await?;

    let summary = seed::seed_catalog(&db).await?;
    tracing::info!(
        "Seeded {} categories and {} products",
        summary.categories_created,
        summary.products_created
    );

    // Admin accounts cannot self-register; provision one when asked to
    if let (Ok(username), Ok(password)) = (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
        let email =
            env::var("ADMIN_EMAIL").unwrap_or_else(|_| format!("{}@storefront.local", username));
        match seed::create_admin(&db, &username, &email, &password).await? {
            Some(admin) => tracing::info!("Created admin '{}' (id {})", admin.username, admin.id),
            None => tracing::info!("Admin '{}' already exists, skipped", username),
        }
    }

    Ok(())
}
