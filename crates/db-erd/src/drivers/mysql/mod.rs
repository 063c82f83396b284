//! MySQL/MariaDB schema driver.
//!
//! - [`MysqlCatalog`]: catalog queries over `INFORMATION_SCHEMA`
//! - [`MysqlAdapter`]: connection lifecycle and [`SchemaAdapter`] entry point
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+
//!
//! Enum columns are reported as one enum type per column, named
//! `{table}_{column}_enum`.
//!
//! [`SchemaAdapter`]: crate::core::traits::SchemaAdapter

mod adapter;
mod catalog;
mod types;

pub use adapter::MysqlAdapter;
pub use catalog::MysqlCatalog;
pub use types::{canonical_type, enum_type_name, index_from_row, parse_enum_values};
