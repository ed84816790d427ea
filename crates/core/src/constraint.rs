//! Constraint violations reported by the storage layer.

/// A write that would break a declared column constraint.
///
/// Stores return this when a record fails the [`TableSchema`](crate::TableSchema)
/// checks or when the database rejects the write.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// A required column has no value.
    #[error("{column} must not be null")]
    NotNull {
        /// Column name.
        column: &'static str,
    },
    /// A value is longer than the column allows.
    #[error("{column} must be at most {max} characters (got {actual})")]
    TooLong {
        /// Column name.
        column: &'static str,
        /// Maximum allowed length in characters.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },
    /// Another record already holds this value in a unique column.
    #[error("{column} already exists")]
    Unique {
        /// Column name.
        column: &'static str,
    },
    /// The write tried to change a column that is fixed after insert.
    #[error("{column} cannot be changed after creation")]
    ImmutableField {
        /// Column name.
        column: &'static str,
    },
}

impl ConstraintViolation {
    /// The column the violation refers to.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::NotNull { column }
            | Self::TooLong { column, .. }
            | Self::Unique { column }
            | Self::ImmutableField { column } => column,
        }
    }
}
