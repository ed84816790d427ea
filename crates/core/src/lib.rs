//! Invoicing Core - Customer record definition.
//!
//! This crate declares the `Customer` entity used by the invoicing service:
//! its fields, its lifecycle (transient [`NewCustomer`] to persisted
//! [`Customer`]), and the declarative constraints of the `customers` table.
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access.
//! Constraint enforcement belongs to the storage layer (`invoicing-db`), which
//! consumes the [`schema::CUSTOMERS`] descriptor.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and the customer entity
//! - [`schema`] - Table/column constraint descriptors
//! - [`constraint`] - Constraint violation errors raised by stores

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod constraint;
pub mod schema;
pub mod types;

pub use constraint::ConstraintViolation;
pub use schema::{ColumnDef, ColumnValue, TableSchema};
pub use types::*;
