//! Customer management commands.
//!
//! # Usage
//!
//! ```bash
//! inv-cli customer create -n "Acme Corp" -e billing@acme.com -a "1 Main St" -t TAX-001 -p 555-0100
//! inv-cli customer get 1
//! inv-cli customer find --tax-id TAX-001
//! inv-cli customer list
//! inv-cli customer update 1 --phone 555-0199
//! inv-cli customer update 1 --clear-tax-id
//! inv-cli customer delete 1
//! ```
//!
//! Records are printed to stdout as JSON.

use serde::Serialize;
use thiserror::Error;

use invoicing_core::{Customer, CustomerId, NewCustomer};
use invoicing_db::{CustomerStore, RepositoryError};

/// Errors that can occur during customer commands.
#[derive(Debug, Error)]
pub enum CustomerCommandError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Customer {0} not found")]
    NotFound(String),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Field changes requested by `customer update`.
///
/// For optional columns, `Some(None)` clears the stored value.
#[derive(Debug, Default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<Option<String>>,
    pub tax_id: Option<Option<String>>,
    pub phone: Option<Option<String>>,
}

impl CustomerPatch {
    fn apply(self, customer: &mut Customer) {
        if let Some(name) = self.name {
            customer.set_name(name);
        }
        if let Some(email) = self.email {
            customer.set_email(email);
        }
        if let Some(address) = self.address {
            customer.set_address(address);
        }
        if let Some(tax_id) = self.tax_id {
            customer.set_tax_id(tax_id);
        }
        if let Some(phone) = self.phone {
            customer.set_phone(phone);
        }
    }
}

/// Print a value to stdout as pretty JSON.
///
/// # Errors
///
/// Returns `CustomerCommandError::Output` if serialization fails.
pub fn print<T: Serialize>(value: &T) -> Result<(), CustomerCommandError> {
    let rendered = serde_json::to_string_pretty(value)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }

    Ok(())
}

/// Create a customer.
///
/// # Errors
///
/// Returns an error if the customer breaks a constraint or the write fails.
pub async fn create<S: CustomerStore>(
    store: &S,
    customer: NewCustomer,
) -> Result<Customer, CustomerCommandError> {
    let created = store.create(customer).await?;
    tracing::info!(customer_id = %created.id(), "Created customer");
    Ok(created)
}

/// Fetch a customer by ID.
///
/// # Errors
///
/// Returns `CustomerCommandError::NotFound` if no customer has this ID.
pub async fn get<S: CustomerStore>(
    store: &S,
    id: CustomerId,
) -> Result<Customer, CustomerCommandError> {
    store
        .get(id)
        .await?
        .ok_or_else(|| CustomerCommandError::NotFound(format!("with id {id}")))
}

/// Fetch a customer by email or tax ID. Email takes precedence.
///
/// # Errors
///
/// Returns `CustomerCommandError::NotFound` if no customer matches.
pub async fn find<S: CustomerStore>(
    store: &S,
    email: Option<&str>,
    tax_id: Option<&str>,
) -> Result<Customer, CustomerCommandError> {
    let (found, key) = match (email, tax_id) {
        (Some(email), _) => (store.find_by_email(email).await?, format!("with email {email}")),
        (None, Some(tax_id)) => (
            store.find_by_tax_id(tax_id).await?,
            format!("with tax id {tax_id}"),
        ),
        (None, None) => (None, "without a lookup key".to_owned()),
    };

    found.ok_or(CustomerCommandError::NotFound(key))
}

/// List all customers.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list<S: CustomerStore>(store: &S) -> Result<Vec<Customer>, CustomerCommandError> {
    let customers = store.list().await?;
    tracing::info!(count = customers.len(), "Listed customers");
    Ok(customers)
}

/// Apply a patch to an existing customer.
///
/// # Errors
///
/// Returns `CustomerCommandError::NotFound` if the customer doesn't exist, or
/// a repository error if the change breaks a constraint.
pub async fn update<S: CustomerStore>(
    store: &S,
    id: CustomerId,
    patch: CustomerPatch,
) -> Result<Customer, CustomerCommandError> {
    let mut customer = get(store, id).await?;
    patch.apply(&mut customer);

    let updated = store.update(&customer).await?;
    tracing::info!(customer_id = %id, "Updated customer");
    Ok(updated)
}

/// Delete a customer.
///
/// # Errors
///
/// Returns `CustomerCommandError::NotFound` if the customer doesn't exist.
pub async fn delete<S: CustomerStore>(
    store: &S,
    id: CustomerId,
) -> Result<(), CustomerCommandError> {
    if !store.delete(id).await? {
        return Err(CustomerCommandError::NotFound(format!("with id {id}")));
    }
    tracing::info!(customer_id = %id, "Deleted customer");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use invoicing_core::ConstraintViolation;
    use invoicing_db::MemoryCustomerStore;

    use super::*;

    async fn seeded() -> (MemoryCustomerStore, Customer) {
        let store = MemoryCustomerStore::new();
        let customer = create(
            &store,
            NewCustomer::new("Acme Corp", "billing@acme.com")
                .with_address("1 Main St")
                .with_tax_id("TAX-001")
                .with_phone("555-0100"),
        )
        .await
        .unwrap();
        (store, customer)
    }

    #[tokio::test]
    async fn test_update_applies_only_requested_fields() {
        let (store, customer) = seeded().await;

        let patch = CustomerPatch {
            phone: Some(Some("555-0199".to_owned())),
            ..CustomerPatch::default()
        };
        let updated = update(&store, customer.id(), patch).await.unwrap();

        assert_eq!(updated.phone(), Some("555-0199"));
        assert_eq!(updated.name(), "Acme Corp");
        assert_eq!(updated.tax_id(), Some("TAX-001"));
        assert_eq!(updated.created_at(), customer.created_at());
    }

    #[tokio::test]
    async fn test_update_can_clear_optional_field() {
        let (store, customer) = seeded().await;

        let patch = CustomerPatch {
            tax_id: Some(None),
            ..CustomerPatch::default()
        };
        let updated = update(&store, customer.id(), patch).await.unwrap();

        assert!(updated.tax_id().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let (store, _) = seeded().await;
        let err = update(&store, CustomerId::new(99), CustomerPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerCommandError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_surfaces_constraint_violation() {
        let (store, _) = seeded().await;
        let err = create(&store, NewCustomer::new("Acme East", "billing@acme.com"))
            .await
            .unwrap_err();

        let CustomerCommandError::Repository(repo_err) = err else {
            panic!("expected repository error");
        };
        assert_eq!(
            repo_err.constraint(),
            Some(&ConstraintViolation::Unique { column: "email" })
        );
    }

    #[tokio::test]
    async fn test_find_prefers_email() {
        let (store, customer) = seeded().await;
        let found = find(&store, Some("billing@acme.com"), Some("TAX-404"))
            .await
            .unwrap();
        assert_eq!(found, customer);

        let err = find(&store, None, Some("TAX-404")).await.unwrap_err();
        assert_eq!(err.to_string(), "Customer with tax id TAX-404 not found");
    }

    #[tokio::test]
    async fn test_delete_twice_reports_not_found() {
        let (store, customer) = seeded().await;
        delete(&store, customer.id()).await.unwrap();
        assert!(matches!(
            delete(&store, customer.id()).await,
            Err(CustomerCommandError::NotFound(_))
        ));
        assert!(list(&store).await.unwrap().is_empty());
    }
}
