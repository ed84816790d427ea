//! Storage layer for invoicing customers.
//!
//! # Database
//!
//! ## Tables
//!
//! - `customers` - Customer records (see [`invoicing_core::schema::CUSTOMERS`])
//!
//! # Stores
//!
//! Both stores implement [`CustomerStore`] and enforce the same constraints:
//!
//! - [`CustomerRepository`] - `PostgreSQL` via sqlx
//! - [`MemoryCustomerStore`] - in-process, for tests and tooling
//!
//! # Migrations
//!
//! Migrations are stored in `crates/db/migrations/` and run via:
//! ```bash
//! cargo run -p invoicing-cli -- migrate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod customers;
pub mod memory;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use invoicing_core::{ConstraintViolation, Customer, CustomerId, NewCustomer};

pub use config::{ConfigError, DatabaseConfig};
pub use customers::CustomerRepository;
pub use memory::{IdentitySequence, MemoryCustomerStore};

/// Embedded migrations for the customers database.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The write broke a declared column constraint.
    #[error("constraint violation: {0}")]
    Constraint(#[from] ConstraintViolation),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// The store has no identifiers left to assign.
    #[error("identity sequence exhausted")]
    IdentityExhausted,

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    /// The constraint violation, if this error is one.
    #[must_use]
    pub const fn constraint(&self) -> Option<&ConstraintViolation> {
        match self {
            Self::Constraint(violation) => Some(violation),
            _ => None,
        }
    }
}

/// Storage operations for customers.
///
/// Implementations run [`PrePersist`](invoicing_core::PrePersist) before the
/// first write, enforce [`CUSTOMERS`](invoicing_core::schema::CUSTOMERS) on
/// every write, and assign ids themselves.
pub trait CustomerStore: Send + Sync {
    /// Persist a new customer and return it with its assigned id.
    fn create(
        &self,
        customer: NewCustomer,
    ) -> impl Future<Output = Result<Customer, RepositoryError>> + Send;

    /// Get a customer by id.
    fn get(
        &self,
        id: CustomerId,
    ) -> impl Future<Output = Result<Option<Customer>, RepositoryError>> + Send;

    /// Get a customer by email address.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Customer>, RepositoryError>> + Send;

    /// Get a customer by tax id.
    fn find_by_tax_id(
        &self,
        tax_id: &str,
    ) -> impl Future<Output = Result<Option<Customer>, RepositoryError>> + Send;

    /// List all customers ordered by id.
    fn list(&self) -> impl Future<Output = Result<Vec<Customer>, RepositoryError>> + Send;

    /// Number of stored customers.
    fn count(&self) -> impl Future<Output = Result<i64, RepositoryError>> + Send;

    /// Write the mutable fields of an existing customer.
    ///
    /// Fails with `NotFound` if the id is unknown and with
    /// `ConstraintViolation::ImmutableField` if `created_at` differs from the
    /// stored value.
    fn update(
        &self,
        customer: &Customer,
    ) -> impl Future<Output = Result<Customer, RepositoryError>> + Send;

    /// Delete a customer. Returns `false` if it did not exist.
    fn delete(&self, id: CustomerId) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Create a `PostgreSQL` connection pool from configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(config.expose_url())
        .await
}
