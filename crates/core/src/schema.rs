//! Declarative table descriptors.
//!
//! A [`TableSchema`] lists the columns of a table together with their
//! constraints. Entity types stay free of validation logic; stores hand
//! their rows to [`TableSchema::check`] before writing and enforce the
//! `unique` flags themselves (the in-process store by scanning, `PostgreSQL`
//! through its unique indexes).

use crate::constraint::ConstraintViolation;

/// Column names of the `customers` table.
pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const ADDRESS: &str = "address";
    pub const TAX_ID: &str = "tax_id";
    pub const PHONE: &str = "phone";
    pub const CREATED_AT: &str = "created_at";
}

/// SQL storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit integer.
    BigInt,
    /// Bounded character string.
    Varchar,
    /// Unbounded text.
    Text,
    /// Timestamp with time zone.
    TimestampTz,
}

/// Constraints declared for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name in the table.
    pub name: &'static str,
    /// Storage type.
    pub sql_type: ColumnType,
    /// Whether NULL is accepted.
    pub nullable: bool,
    /// Whether non-null values must be distinct across rows.
    pub unique: bool,
    /// Maximum length in characters, if bounded.
    pub max_length: Option<usize>,
    /// Whether the value is produced by the storage layer on insert.
    pub generated: bool,
    /// Whether the value may change after insert.
    pub updatable: bool,
}

impl ColumnDef {
    /// A caller-supplied, updatable column with no constraints.
    #[must_use]
    pub const fn new(name: &'static str, sql_type: ColumnType) -> Self {
        Self {
            name,
            sql_type,
            nullable: true,
            unique: false,
            max_length: None,
            generated: false,
            updatable: true,
        }
    }

    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    #[must_use]
    pub const fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    #[must_use]
    pub const fn immutable(mut self) -> Self {
        self.updatable = false;
        self
    }

    /// Check a single value against this column's nullability and length.
    ///
    /// Length is counted in characters, matching `VARCHAR(n)`.
    ///
    /// # Errors
    ///
    /// Returns `ConstraintViolation::NotNull` or `ConstraintViolation::TooLong`.
    pub fn check(&self, value: Option<&str>) -> Result<(), ConstraintViolation> {
        let Some(value) = value else {
            if self.nullable {
                return Ok(());
            }
            return Err(ConstraintViolation::NotNull { column: self.name });
        };

        if let Some(max) = self.max_length {
            let actual = value.chars().count();
            if actual > max {
                return Err(ConstraintViolation::TooLong {
                    column: self.name,
                    max,
                    actual,
                });
            }
        }

        Ok(())
    }
}

/// A borrowed text value tagged with its column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnValue<'a> {
    pub column: &'static str,
    pub value: Option<&'a str>,
}

impl<'a> ColumnValue<'a> {
    #[must_use]
    pub const fn new(column: &'static str, value: Option<&'a str>) -> Self {
        Self { column, value }
    }
}

/// Constraint descriptor for a whole table.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    /// Table name.
    pub name: &'static str,
    /// Columns in declaration order.
    pub columns: &'static [ColumnDef],
}

impl TableSchema {
    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns whose non-null values must be distinct.
    pub fn unique_columns(self) -> impl Iterator<Item = &'static ColumnDef> {
        self.columns.iter().filter(|c| c.unique && !c.generated)
    }

    /// Check caller-supplied values against nullability and length.
    ///
    /// Values are checked in the order given; the first violation wins.
    /// Values for columns the schema does not declare are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first `ConstraintViolation` found.
    pub fn check(&self, values: &[ColumnValue<'_>]) -> Result<(), ConstraintViolation> {
        for value in values {
            if let Some(def) = self.column(value.column) {
                def.check(value.value)?;
            }
        }
        Ok(())
    }
}

/// The `customers` table.
pub const CUSTOMERS: TableSchema = TableSchema {
    name: "customers",
    columns: &[
        ColumnDef::new(columns::ID, ColumnType::BigInt)
            .not_null()
            .unique()
            .generated()
            .immutable(),
        ColumnDef::new(columns::NAME, ColumnType::Varchar)
            .not_null()
            .max_length(100),
        ColumnDef::new(columns::EMAIL, ColumnType::Varchar)
            .not_null()
            .unique()
            .max_length(100),
        ColumnDef::new(columns::ADDRESS, ColumnType::Text).max_length(300),
        ColumnDef::new(columns::TAX_ID, ColumnType::Varchar)
            .unique()
            .max_length(50),
        ColumnDef::new(columns::PHONE, ColumnType::Varchar).max_length(50),
        ColumnDef::new(columns::CREATED_AT, ColumnType::TimestampTz)
            .not_null()
            .immutable(),
    ],
};
