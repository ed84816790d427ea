//! Customer entity.
//!
//! A customer starts life as a transient [`NewCustomer`] and becomes a
//! [`Customer`] once a store has written it. The id and creation timestamp
//! only ever come from the persistence pathway: [`NewCustomer`] has no way to
//! set them and [`Customer`] has no setters for them.
//!
//! Neither type validates its values. Constraints live in
//! [`schema::CUSTOMERS`](crate::schema::CUSTOMERS) and are enforced by the
//! storage layer at write time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::CustomerId;
use crate::schema::{ColumnValue, columns};

/// Hook run by a store immediately before a record's first write.
pub trait PrePersist {
    /// Stamp creation metadata with `now`, replacing any earlier stamp.
    fn pre_persist(&mut self, now: DateTime<Utc>);
}

/// A customer that has not been persisted yet.
///
/// Every field is optional so that a store can report a missing required
/// value as a constraint violation rather than the caller being unable to
/// build the record at all.
///
/// ## Examples
///
/// ```
/// use invoicing_core::NewCustomer;
///
/// let customer = NewCustomer::new("Acme Corp", "billing@acme.com")
///     .with_address("1 Main St")
///     .with_tax_id("TAX-001")
///     .with_phone("555-0100");
///
/// assert_eq!(customer.name(), Some("Acme Corp"));
/// assert!(customer.created_at().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    name: Option<String>,
    email: Option<String>,
    address: Option<String>,
    tax_id: Option<String>,
    phone: Option<String>,
    #[serde(skip)]
    created_at: Option<DateTime<Utc>>,
}

impl NewCustomer {
    /// Create a new customer with the two required fields populated.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    #[must_use]
    pub fn tax_id(&self) -> Option<&str> {
        self.tax_id.as_deref()
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Creation timestamp, present once [`PrePersist::pre_persist`] has run.
    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn set_email(&mut self, email: Option<String>) {
        self.email = email;
    }

    pub fn set_address(&mut self, address: Option<String>) {
        self.address = address;
    }

    pub fn set_tax_id(&mut self, tax_id: Option<String>) {
        self.tax_id = tax_id;
    }

    pub fn set_phone(&mut self, phone: Option<String>) {
        self.phone = phone;
    }

    /// Caller-supplied text columns, in table order.
    #[must_use]
    pub fn text_columns(&self) -> [ColumnValue<'_>; 5] {
        [
            ColumnValue::new(columns::NAME, self.name()),
            ColumnValue::new(columns::EMAIL, self.email()),
            ColumnValue::new(columns::ADDRESS, self.address()),
            ColumnValue::new(columns::TAX_ID, self.tax_id()),
            ColumnValue::new(columns::PHONE, self.phone()),
        ]
    }
}

impl PrePersist for NewCustomer {
    fn pre_persist(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
    }
}

/// A persisted customer.
///
/// `id` and `created_at` are read-only; the remaining fields can be changed
/// and written back through a store's `update`.
///
/// `Deserialize` accepts any `id` and `createdAt`. Such a value is only
/// useful as input to `update`, which rejects it unless the id exists and
/// `created_at` matches the stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    id: CustomerId,
    name: String,
    email: String,
    address: Option<String>,
    tax_id: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl Customer {
    /// Rebuild a customer from a stored row.
    ///
    /// Only storage implementations should call this; it is the single place
    /// an id and creation timestamp enter a `Customer`.
    #[doc(hidden)]
    #[must_use]
    pub const fn from_storage(
        id: CustomerId,
        name: String,
        email: String,
        address: Option<String>,
        tax_id: Option<String>,
        phone: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            address,
            tax_id,
            phone,
            created_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> CustomerId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    #[must_use]
    pub fn tax_id(&self) -> Option<&str> {
        self.tax_id.as_deref()
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_address(&mut self, address: Option<String>) {
        self.address = address;
    }

    pub fn set_tax_id(&mut self, tax_id: Option<String>) {
        self.tax_id = tax_id;
    }

    pub fn set_phone(&mut self, phone: Option<String>) {
        self.phone = phone;
    }

    /// Updatable text columns, in table order.
    #[must_use]
    pub fn text_columns(&self) -> [ColumnValue<'_>; 5] {
        [
            ColumnValue::new(columns::NAME, Some(self.name())),
            ColumnValue::new(columns::EMAIL, Some(self.email())),
            ColumnValue::new(columns::ADDRESS, self.address()),
            ColumnValue::new(columns::TAX_ID, self.tax_id()),
            ColumnValue::new(columns::PHONE, self.phone()),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn acme() -> Customer {
        Customer::from_storage(
            CustomerId::new(1),
            "Acme Corp".to_owned(),
            "billing@acme.com".to_owned(),
            Some("1 Main St".to_owned()),
            Some("TAX-001".to_owned()),
            Some("555-0100".to_owned()),
            fixed_time(),
        )
    }

    #[test]
    fn test_new_leaves_optional_fields_unset() {
        let customer = NewCustomer::new("Acme Corp", "billing@acme.com");
        assert_eq!(customer.email(), Some("billing@acme.com"));
        assert!(customer.address().is_none());
        assert!(customer.tax_id().is_none());
        assert!(customer.phone().is_none());
        assert!(customer.created_at().is_none());
    }

    #[test]
    fn test_default_has_no_fields() {
        let customer = NewCustomer::default();
        assert!(customer.name().is_none());
        assert!(customer.email().is_none());
    }

    #[test]
    fn test_pre_persist_sets_created_at() {
        let mut customer = NewCustomer::new("Acme Corp", "billing@acme.com");
        customer.pre_persist(fixed_time());
        assert_eq!(customer.created_at(), Some(fixed_time()));
    }

    #[test]
    fn test_pre_persist_replaces_earlier_stamp() {
        let mut customer = NewCustomer::new("Acme Corp", "billing@acme.com");
        customer.pre_persist(fixed_time() - Duration::days(365));
        customer.pre_persist(fixed_time());
        assert_eq!(customer.created_at(), Some(fixed_time()));
    }

    #[test]
    fn test_setters_replace_values() {
        let mut customer = NewCustomer::default();
        customer.set_name(Some("Acme East".to_owned()));
        customer.set_phone(Some("555-0199".to_owned()));
        customer.set_phone(None);
        assert_eq!(customer.name(), Some("Acme East"));
        assert!(customer.phone().is_none());
    }

    #[test]
    fn test_text_columns_follow_table_order() {
        let customer = NewCustomer::new("Acme Corp", "billing@acme.com").with_tax_id("TAX-001");
        let columns: Vec<_> = customer
            .text_columns()
            .iter()
            .map(|c| (c.column, c.value))
            .collect();
        assert_eq!(
            columns,
            [
                ("name", Some("Acme Corp")),
                ("email", Some("billing@acme.com")),
                ("address", None),
                ("tax_id", Some("TAX-001")),
                ("phone", None),
            ]
        );
    }

    #[test]
    fn test_customer_mutation_keeps_identity() {
        let mut customer = acme();
        customer.set_phone(Some("555-0200".to_owned()));
        customer.set_email("accounts@acme.com");
        assert_eq!(customer.id(), CustomerId::new(1));
        assert_eq!(customer.created_at(), fixed_time());
        assert_eq!(customer.phone(), Some("555-0200"));
        assert_eq!(customer.email(), "accounts@acme.com");
    }

    #[test]
    fn test_customer_serializes_camel_case() {
        let json = serde_json::to_value(acme()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["taxId"], "TAX-001");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_new_customer_ignores_supplied_created_at() {
        let json = r#"{"name":"Acme","email":"a@acme.com","createdAt":"2020-01-01T00:00:00Z"}"#;
        let customer: NewCustomer = serde_json::from_str(json).unwrap();
        assert!(customer.created_at().is_none());
        assert!(customer.address().is_none());
    }
}
