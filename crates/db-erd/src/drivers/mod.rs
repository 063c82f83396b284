//! Database driver implementations.
//!
//! - [`postgres`]: PostgreSQL driver
//! - [`mysql`]: MySQL/MariaDB driver
//! - [`common`]: Shared utilities (TLS)
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `drivers/`
//! 2. Implement [`CatalogQueries`] for its catalog and [`SchemaAdapter`] for
//!    its connection lifecycle
//! 3. Add a [`DbType`] variant and register a factory in
//!    [`AdapterRegistry::with_builtins`]
//!
//! [`CatalogQueries`]: crate::core::traits::CatalogQueries
//! [`SchemaAdapter`]: crate::core::traits::SchemaAdapter
//! [`DbType`]: crate::config::DbType
//! [`AdapterRegistry::with_builtins`]: crate::core::registry::AdapterRegistry::with_builtins

pub mod common;
pub mod mysql;
pub mod postgres;

pub use common::{SslMode, TlsBuilder};
pub use mysql::MysqlAdapter;
pub use postgres::PostgresAdapter;
