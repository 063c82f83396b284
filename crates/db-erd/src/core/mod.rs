//! Core abstractions for dialect-agnostic schema extraction.
//!
//! - [`schema`]: the unified Schema Model (tables, columns, enums, relationships)
//! - [`traits`]: [`CatalogQueries`] per dialect, [`SchemaAdapter`] per session,
//!   and the shared [`extract_schema`] algorithm
//! - [`registry`]: adapter factories for dependency injection
//!
//! # Design Patterns
//!
//! - **Template Method**: [`extract_schema`] fixes the query order; dialects
//!   only answer catalog questions
//! - **Abstract Factory**: [`AdapterRegistry`] builds adapters by dialect

pub mod registry;
pub mod schema;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use registry::{AdapterFactory, AdapterRegistry};
pub use schema::{
    Column, EnumRelationship, EnumType, Index, KeyIndicator, Relationship, RelationshipKind,
    Schema, Table,
};
pub use traits::{extract_schema, CatalogQueries, KeyRoles, RawColumn, RawForeignKey, SchemaAdapter};
