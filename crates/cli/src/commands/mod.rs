//! CLI command implementations.

pub mod customer;
pub mod migrate;

use sqlx::PgPool;

use invoicing_db::DatabaseConfig;

/// Load database configuration from the environment and open a pool.
///
/// # Errors
///
/// Returns an error if configuration is missing or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = invoicing_db::create_pool(&config).await?;
    Ok(pool)
}
