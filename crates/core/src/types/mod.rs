//! Core types for the invoicing service.

pub mod customer;
pub mod id;

pub use customer::{Customer, NewCustomer, PrePersist};
pub use id::*;
