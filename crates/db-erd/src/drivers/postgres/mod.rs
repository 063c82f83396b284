//! PostgreSQL driver.
//!
//! - [`PostgresCatalog`]: catalog queries over `information_schema` and `pg_catalog`
//! - [`PostgresAdapter`]: session lifecycle and schema extraction
//! - [`canonical_type`]: PostgreSQL type display rules

mod adapter;
mod catalog;
mod types;

pub use adapter::PostgresAdapter;
pub use catalog::PostgresCatalog;
pub use types::{canonical_type, constraint_type, group_enum_rows};

pub(crate) use types::{with_length, with_precision};
