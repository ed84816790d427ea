//! In-process customer store.
//!
//! Enforces the same [`CUSTOMERS`] constraints as the `PostgreSQL` schema,
//! with uniqueness checked by scanning. Writes hold the lock across the check
//! and the insert, so concurrent creates cannot both claim an email.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;

use invoicing_core::schema::{CUSTOMERS, columns};
use invoicing_core::{ColumnValue, ConstraintViolation, Customer, CustomerId, NewCustomer, PrePersist};

use super::{CustomerStore, RepositoryError};

/// Source of customer ids, owned by the store.
///
/// Ids start at 1 and are never handed out twice, even after a delete.
/// Once `i64::MAX` has been issued the sequence is exhausted.
#[derive(Debug, Clone)]
pub struct IdentitySequence {
    next: Option<i64>,
}

impl IdentitySequence {
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    #[must_use]
    pub const fn starting_at(first: i64) -> Self {
        Self { next: Some(first) }
    }

    /// Take the next id, or `None` if the sequence is exhausted.
    pub fn next_id(&mut self) -> Option<CustomerId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(CustomerId::new(id))
    }

    /// The id the next call to [`next_id`](Self::next_id) will return.
    #[must_use]
    pub fn peek(&self) -> Option<CustomerId> {
        self.next.map(CustomerId::new)
    }
}

impl Default for IdentitySequence {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct State {
    rows: BTreeMap<CustomerId, Customer>,
    sequence: IdentitySequence,
}

impl State {
    /// Reject values that collide with another row in a unique column.
    fn check_unique(
        &self,
        values: &[ColumnValue<'_>],
        exclude: Option<CustomerId>,
    ) -> Result<(), ConstraintViolation> {
        for def in CUSTOMERS.unique_columns() {
            let Some(candidate) = column_value(values, def.name) else {
                continue;
            };

            let taken = self
                .rows
                .values()
                .filter(|row| Some(row.id()) != exclude)
                .any(|row| column_value(&row.text_columns(), def.name) == Some(candidate));

            if taken {
                return Err(ConstraintViolation::Unique { column: def.name });
            }
        }
        Ok(())
    }

    fn find_by(&self, column: &str, value: &str) -> Option<Customer> {
        self.rows
            .values()
            .find(|row| column_value(&row.text_columns(), column) == Some(value))
            .cloned()
    }
}

fn column_value<'a>(values: &[ColumnValue<'a>], column: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|v| v.column == column)
        .and_then(|v| v.value)
}

/// Customer store held in memory.
#[derive(Debug, Default)]
pub struct MemoryCustomerStore {
    state: RwLock<State>,
}

impl MemoryCustomerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that assigns ids from `sequence`.
    #[must_use]
    pub fn with_sequence(sequence: IdentitySequence) -> Self {
        Self {
            state: RwLock::new(State {
                rows: BTreeMap::new(),
                sequence,
            }),
        }
    }

    /// The id the next successful `create` will assign.
    pub async fn next_id(&self) -> Option<CustomerId> {
        self.state.read().await.sequence.peek()
    }
}

impl CustomerStore for MemoryCustomerStore {
    #[instrument(skip(self, customer), fields(email = customer.email()))]
    async fn create(&self, mut customer: NewCustomer) -> Result<Customer, RepositoryError> {
        customer.pre_persist(Utc::now());

        let values = customer.text_columns();
        CUSTOMERS.check(&values).inspect_err(|violation| {
            tracing::warn!(%violation, "Rejected customer insert");
        })?;

        let mut state = self.state.write().await;
        state.check_unique(&values, None).inspect_err(|violation| {
            tracing::warn!(%violation, "Rejected customer insert");
        })?;

        let (Some(name), Some(email), Some(created_at)) =
            (customer.name(), customer.email(), customer.created_at())
        else {
            return Err(RepositoryError::DataCorruption(
                "required customer fields missing after schema check".to_owned(),
            ));
        };

        let Some(id) = state.sequence.next_id() else {
            tracing::warn!("Rejected customer insert: identity sequence exhausted");
            return Err(RepositoryError::IdentityExhausted);
        };
        let created = Customer::from_storage(
            id,
            name.to_owned(),
            email.to_owned(),
            customer.address().map(str::to_owned),
            customer.tax_id().map(str::to_owned),
            customer.phone().map(str::to_owned),
            created_at,
        );
        state.rows.insert(id, created.clone());

        tracing::info!(customer_id = %id, "Customer created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let found = self.state.read().await.rows.get(&id).cloned();
        tracing::debug!(found = found.is_some(), "Customer lookup");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.state.read().await.find_by(columns::EMAIL, email))
    }

    #[instrument(skip(self))]
    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.state.read().await.find_by(columns::TAX_ID, tax_id))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self.state.read().await.rows.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<i64, RepositoryError> {
        let len = self.state.read().await.rows.len();
        Ok(i64::try_from(len).unwrap_or(i64::MAX))
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.id()))]
    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        let values = customer.text_columns();
        CUSTOMERS.check(&values).inspect_err(|violation| {
            tracing::warn!(%violation, "Rejected customer update");
        })?;

        let mut state = self.state.write().await;

        let Some(stored) = state.rows.get(&customer.id()) else {
            return Err(RepositoryError::NotFound);
        };

        if stored.created_at() != customer.created_at() {
            tracing::warn!("Rejected customer update: created_at changed");
            return Err(ConstraintViolation::ImmutableField {
                column: columns::CREATED_AT,
            }
            .into());
        }

        state
            .check_unique(&values, Some(customer.id()))
            .inspect_err(|violation| {
                tracing::warn!(%violation, "Rejected customer update");
            })?;

        state.rows.insert(customer.id(), customer.clone());

        tracing::info!("Customer updated");
        Ok(customer.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let deleted = self.state.write().await.rows.remove(&id).is_some();
        if deleted {
            tracing::info!("Customer deleted");
        }
        Ok(deleted)
    }
}
