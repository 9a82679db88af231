//! PostgreSQL persistence

mod alert_repository;
mod asset_directory;
mod catalog_repository;
mod event_publisher;
mod measurement_repository;
mod threshold_repository;

pub use alert_repository::PostgresAlertRepository;
pub use asset_directory::PostgresAssetDirectory;
pub use catalog_repository::PostgresCatalogRepository;
pub use event_publisher::PostgresEventPublisher;
pub use measurement_repository::PostgresMeasurementRepository;
pub use threshold_repository::PostgresThresholdRepository;

use anyhow::{Context, Result};
use domain::DomainError;
use migration::MigratorTrait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::DatabaseConfig;

/// Open the connection pool and, when configured, bring the schema up to date
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let url = config
        .url
        .as_deref()
        .context("database.url (or DATABASE_URL) must be set")?;

    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;

    if config.run_migrations {
        run_migrations(url).await?;
    }

    Ok(pool)
}

/// Apply pending migrations from the `migration` crate
pub async fn run_migrations(database_url: &str) -> Result<()> {
    info!("Running database migrations...");
    let connection = sea_orm::Database::connect(database_url).await?;
    migration::Migrator::up(&connection, None).await?;
    info!("✅ Migrations applied successfully");
    Ok(())
}

/// Unique violations become `Conflict`; everything else is a store failure
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> DomainError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::Conflict(db.message().to_string())
        }
        _ => DomainError::Store(e.to_string()),
    }
}

pub(crate) fn corrupt(e: DomainError) -> DomainError {
    DomainError::Store(format!("corrupt row: {e}"))
}
