//! Integration tests for the invoicing customer store.
//!
//! # Running Tests
//!
//! ```bash
//! # Point the tests at a scratch database
//! export INVOICING_TEST_DATABASE_URL=postgres://localhost/invoicing_test
//!
//! # Run integration tests (they are ignored by default)
//! cargo test -p invoicing-integration-tests -- --ignored
//! ```
//!
//! Tests share one database and never truncate it; every test generates its
//! own emails and tax ids so runs do not collide.

use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use invoicing_db::{DatabaseConfig, MIGRATOR};

/// Environment variable holding the test database URL.
pub const TEST_DATABASE_URL: &str = "INVOICING_TEST_DATABASE_URL";

/// Connect to the test database and apply migrations.
///
/// # Panics
///
/// Panics if the variable is unset, the database is unreachable, or
/// migrations fail.
#[allow(clippy::expect_used)]
pub async fn test_pool() -> PgPool {
    let url = std::env::var(TEST_DATABASE_URL)
        .unwrap_or_else(|_| panic!("{TEST_DATABASE_URL} must be set for integration tests"));

    let mut config = DatabaseConfig::new(SecretString::from(url));
    config.min_connections = 0;

    let pool = invoicing_db::create_pool(&config)
        .await
        .expect("Failed to connect to test database");

    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// An email address no other test run will use.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

/// A tax id no other test run will use (fits the 50 character limit).
#[must_use]
pub fn unique_tax_id() -> String {
    format!("TAX-{}", Uuid::new_v4().simple())
}
