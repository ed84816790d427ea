//! Customer repository for `PostgreSQL`.
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate builds
//! without a live database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::error::ErrorKind;
use tracing::instrument;

use invoicing_core::schema::{CUSTOMERS, columns};
use invoicing_core::{ColumnValue, ConstraintViolation, Customer, CustomerId, NewCustomer, PrePersist};

use super::{CustomerStore, RepositoryError};

const EMAIL_UNIQUE: &str = "customers_email_key";
const TAX_ID_UNIQUE: &str = "customers_tax_id_key";
const ADDRESS_LENGTH: &str = "customers_address_length";

/// SQLSTATE raised by the `customers_created_at_immutable` trigger.
const CREATED_AT_IMMUTABLE: &str = "IC001";
/// `string_data_right_truncation`: value too long for a `VARCHAR(n)`.
const STRING_TOO_LONG: &str = "22001";

const CUSTOMER_COLUMNS: &str = "id, name, email, address, tax_id, phone, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    email: String,
    address: Option<String>,
    tax_id: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self::from_storage(
            CustomerId::new(row.id),
            row.name,
            row.email,
            row.address,
            row.tax_id,
            row.phone,
            row.created_at,
        )
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Translate a failed write into a constraint violation where possible.
///
/// `values` are the text columns that were written; they let nullability and
/// length failures report the exact column and length.
fn map_write_error(err: sqlx::Error, values: &[ColumnValue<'_>]) -> RepositoryError {
    let sqlx::Error::Database(ref db_err) = err else {
        return RepositoryError::Database(err);
    };

    if db_err.code().as_deref() == Some(CREATED_AT_IMMUTABLE) {
        return ConstraintViolation::ImmutableField {
            column: columns::CREATED_AT,
        }
        .into();
    }

    let is_length_error = db_err.code().as_deref() == Some(STRING_TOO_LONG)
        || db_err.constraint() == Some(ADDRESS_LENGTH);

    match db_err.kind() {
        ErrorKind::UniqueViolation => match db_err.constraint() {
            Some(EMAIL_UNIQUE) => ConstraintViolation::Unique {
                column: columns::EMAIL,
            }
            .into(),
            Some(TAX_ID_UNIQUE) => ConstraintViolation::Unique {
                column: columns::TAX_ID,
            }
            .into(),
            _ => RepositoryError::Database(err),
        },
        ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
            CUSTOMERS.check(values).err().map_or(RepositoryError::Database(err), Into::into)
        }
        _ if is_length_error => {
            CUSTOMERS.check(values).err().map_or(RepositoryError::Database(err), Into::into)
        }
        _ => RepositoryError::Database(err),
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE {column} = $1");
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(value)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }
}

impl CustomerStore for CustomerRepository<'_> {
    /// Insert a customer; `PostgreSQL` assigns the id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Constraint` for missing or oversized values
    /// and for duplicate email or tax id.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, customer), fields(email = customer.email()))]
    async fn create(&self, mut customer: NewCustomer) -> Result<Customer, RepositoryError> {
        customer.pre_persist(Utc::now());

        let values = customer.text_columns();
        if let Err(violation) = CUSTOMERS.check(&values) {
            tracing::warn!(%violation, "Rejected customer insert");
            return Err(violation.into());
        }

        let sql = format!(
            r"
            INSERT INTO customers (name, email, address, tax_id, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CUSTOMER_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(customer.name())
            .bind(customer.email())
            .bind(customer.address())
            .bind(customer.tax_id())
            .bind(customer.phone())
            .bind(customer.created_at())
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_write_error(e, &values))?;

        let created = Customer::from(row);
        tracing::info!(customer_id = %created.id(), "Customer created");
        Ok(created)
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1");
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        tracing::debug!(found = row.is_some(), "Customer lookup");
        Ok(row.map(Into::into))
    }

    /// Get a customer by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError> {
        self.fetch_one_by(columns::EMAIL, email).await
    }

    /// Get a customer by tax ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<Customer>, RepositoryError> {
        self.fetch_one_by(columns::TAX_ID, tax_id).await
    }

    /// List all customers ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id ASC");
        let rows = sqlx::query_as::<_, CustomerRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Write name, email, address, tax ID and phone of an existing customer.
    ///
    /// The stored row is locked for the duration of the check so the
    /// `created_at` comparison and the write see the same row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist.
    /// Returns `RepositoryError::Constraint` for oversized values, duplicate
    /// email or tax id, or a changed `created_at`.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, customer), fields(customer_id = %customer.id()))]
    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        let values = customer.text_columns();
        if let Err(violation) = CUSTOMERS.check(&values) {
            tracing::warn!(%violation, "Rejected customer update");
            return Err(violation.into());
        }

        let mut tx = self.pool.begin().await?;

        let stored_created_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT created_at FROM customers WHERE id = $1 FOR UPDATE")
                .bind(customer.id())
                .fetch_optional(&mut *tx)
                .await?;

        let Some(stored_created_at) = stored_created_at else {
            return Err(RepositoryError::NotFound);
        };

        if stored_created_at != customer.created_at() {
            tracing::warn!("Rejected customer update: created_at changed");
            return Err(ConstraintViolation::ImmutableField {
                column: columns::CREATED_AT,
            }
            .into());
        }

        let sql = format!(
            r"
            UPDATE customers
            SET name = $2, email = $3, address = $4, tax_id = $5, phone = $6
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(customer.id())
            .bind(customer.name())
            .bind(customer.email())
            .bind(customer.address())
            .bind(customer.tax_id())
            .bind(customer.phone())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &values))?;

        tx.commit().await?;

        tracing::info!("Customer updated");
        Ok(row.into())
    }

    /// Delete a customer by ID.
    ///
    /// # Returns
    ///
    /// Returns `true` if the customer was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("Customer deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIGRATION: &str = include_str!("../migrations/20260301000001_create_customers.sql");

    #[test]
    fn test_migration_matches_schema_lengths() {
        for column in CUSTOMERS.columns {
            assert!(
                MIGRATION.contains(column.name),
                "migration is missing column {}",
                column.name
            );
        }
        assert!(MIGRATION.contains("name       VARCHAR(100) NOT NULL"));
        assert!(MIGRATION.contains("email      VARCHAR(100) NOT NULL"));
        assert!(MIGRATION.contains("tax_id     VARCHAR(50)"));
        assert!(MIGRATION.contains("phone      VARCHAR(50)"));
        assert!(MIGRATION.contains("char_length(address) <= 300"));
    }

    #[test]
    fn test_migration_names_mapped_constraints() {
        for name in [EMAIL_UNIQUE, TAX_ID_UNIQUE, ADDRESS_LENGTH, CREATED_AT_IMMUTABLE] {
            assert!(MIGRATION.contains(name), "migration is missing {name}");
        }
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = map_write_error(sqlx::Error::RowNotFound, &[]);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }
}
