//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! mv-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MULTIVERSE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! Migration files live in `crates/api/migrations/`.

use super::MissingDatabaseUrl;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the catalog database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the database is
/// unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to catalog database...");
    let pool = multiverse_api::db::create_pool(&database_url).await?;

    tracing::info!("Running catalog migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}
