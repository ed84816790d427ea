//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! inv-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `INVOICING_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/db/migrations/` and are embedded into the
//! binary at build time.

use invoicing_db::{ConfigError, DatabaseConfig, MIGRATOR};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let config = DatabaseConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = invoicing_db::create_pool(&config).await?;

    tracing::info!(
        migrations = MIGRATOR.iter().count(),
        "Running migrations..."
    );
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
