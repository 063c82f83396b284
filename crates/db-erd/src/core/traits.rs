//! Core traits for dialect-independent schema extraction.
//!
//! - [`CatalogQueries`]: the fixed battery of read-only catalog queries one
//!   dialect answers
//! - [`SchemaAdapter`]: session lifecycle plus schema extraction for one dialect
//! - [`extract_schema`]: the shared template method that turns catalog
//!   answers into a [`Schema`]

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Result;

use super::schema::{
    Column, EnumRelationship, EnumType, Index, Relationship, RelationshipKind, Schema, Table,
};

/// One column row as reported by a catalog, before type canonicalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawColumn {
    /// Column name.
    pub name: String,

    /// Catalog data type (`information_schema.columns.data_type`).
    pub data_type: String,

    /// Underlying named type for user-defined types (PostgreSQL `udt_name`).
    pub udt_name: Option<String>,

    /// Full declared type (MySQL `COLUMN_TYPE`, e.g. `enum('a','b')`).
    pub column_type: Option<String>,

    /// Declared length for character types.
    pub max_length: Option<i64>,

    /// Numeric precision.
    pub precision: Option<i64>,

    /// Numeric scale.
    pub scale: Option<i64>,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Column default expression.
    pub default: Option<String>,
}

/// Key-role flags for a single column. A column may hold several at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyRoles {
    pub primary_key: bool,
    pub foreign_key: bool,
    pub unique: bool,
}

impl KeyRoles {
    /// Record one `information_schema` constraint type ("PRIMARY KEY",
    /// "FOREIGN KEY", "UNIQUE"). Other constraint types are ignored.
    pub fn record(&mut self, constraint_type: &str) {
        match constraint_type.trim().to_uppercase().as_str() {
            "PRIMARY KEY" => self.primary_key = true,
            "FOREIGN KEY" => self.foreign_key = true,
            "UNIQUE" => self.unique = true,
            _ => {}
        }
    }
}

/// Fold `(column, constraint_type)` rows into per-column key roles.
pub fn collect_key_roles<I>(rows: I) -> HashMap<String, KeyRoles>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut roles: HashMap<String, KeyRoles> = HashMap::new();
    for (column, constraint_type) in rows {
        roles.entry(column).or_default().record(&constraint_type);
    }
    roles
}

/// One foreign-key constraint reduced to what the diagram needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawForeignKey {
    /// Referencing (child) table.
    pub child_table: String,

    /// Referenced (parent) table.
    pub parent_table: String,

    /// ON DELETE rule as reported by the catalog (e.g. "CASCADE").
    pub delete_rule: String,
}

/// Read-only catalog queries for one SQL dialect.
///
/// Implementations return raw catalog answers in catalog order and do no
/// interpretation beyond row decoding. Any query failure is fatal to the
/// extraction that issued it.
#[async_trait]
pub trait CatalogQueries: Send + Sync {
    /// Dialect identifier (e.g. "postgres", "mysql").
    fn dialect(&self) -> &str;

    /// Enumerated types, values in declaration order.
    ///
    /// Dialects that synthesize per-column enum types skip columns of
    /// excluded tables.
    async fn enum_types(&self, excluded: &BTreeSet<String>) -> Result<Vec<EnumType>>;

    /// Base table names in the configured schema, minus `excluded`.
    async fn base_tables(&self, excluded: &BTreeSet<String>) -> Result<Vec<String>>;

    /// Columns of a table in ordinal position order.
    async fn columns(&self, table: &str) -> Result<Vec<RawColumn>>;

    /// Key roles of every constrained column of a table, in one round-trip.
    async fn key_roles(&self, table: &str) -> Result<HashMap<String, KeyRoles>>;

    /// All foreign keys in the configured schema between non-excluded tables.
    async fn foreign_keys(&self, excluded: &BTreeSet<String>) -> Result<Vec<RawForeignKey>>;

    /// Enum-typed columns of non-excluded tables, one entry per column.
    async fn enum_usages(&self, excluded: &BTreeSet<String>) -> Result<Vec<EnumRelationship>>;

    /// Secondary indexes of a table, primary-key index excluded.
    async fn indexes(&self, table: &str) -> Result<Vec<Index>>;

    /// Canonical display type for a raw column.
    fn canonical_type(&self, table: &str, column: &RawColumn) -> String;
}

/// Session lifecycle and schema extraction for one dialect.
#[async_trait]
pub trait SchemaAdapter: Send + Sync {
    /// Dialect identifier (e.g. "postgres", "mysql").
    fn dialect(&self) -> &str;

    /// Establish the database session.
    async fn connect(&mut self) -> Result<()>;

    /// Release the session. A no-op when `connect` never succeeded.
    async fn disconnect(&mut self) -> Result<()>;

    /// Extract the full schema model.
    async fn get_schema(&self, excluded: &BTreeSet<String>, show_indexes: bool) -> Result<Schema>;
}

/// Run the catalog queries in order and assemble a [`Schema`].
///
/// Order: enums, tables, per-table columns and key roles, relationships,
/// enum relationships, then (only if `show_indexes`) per-table indexes.
pub async fn extract_schema<Q>(
    queries: &Q,
    excluded: &BTreeSet<String>,
    show_indexes: bool,
) -> Result<Schema>
where
    Q: CatalogQueries + ?Sized,
{
    let enums = queries.enum_types(excluded).await?;
    debug!("Loaded {} enum types", enums.len());

    let table_names = queries.base_tables(excluded).await?;
    let mut tables = Vec::with_capacity(table_names.len());

    for name in table_names.into_iter().filter(|n| !excluded.contains(n)) {
        let raw_columns = queries.columns(&name).await?;
        let roles = queries.key_roles(&name).await?;

        let columns: Vec<Column> = raw_columns
            .iter()
            .map(|raw| {
                let role = roles.get(&raw.name).copied().unwrap_or_default();
                Column {
                    name: raw.name.clone(),
                    data_type: queries.canonical_type(&name, raw),
                    is_primary_key: role.primary_key,
                    is_foreign_key: role.foreign_key,
                    is_unique: role.unique,
                    is_indexed: None,
                }
            })
            .collect();

        debug!("Loaded {} columns for {}", columns.len(), name);
        tables.push(Table {
            name,
            columns,
            indexes: None,
        });
    }

    let relationships: Vec<Relationship> = queries
        .foreign_keys(excluded)
        .await?
        .into_iter()
        .filter(|fk| {
            !excluded.contains(&fk.child_table) && !excluded.contains(&fk.parent_table)
        })
        .map(|fk| Relationship {
            kind: RelationshipKind::from_delete_rule(&fk.delete_rule),
            from_table: fk.parent_table,
            to_table: fk.child_table,
        })
        .collect();

    let enum_relationships: Vec<EnumRelationship> = queries
        .enum_usages(excluded)
        .await?
        .into_iter()
        .filter(|usage| !excluded.contains(&usage.table))
        .collect();

    if show_indexes {
        for table in &mut tables {
            let indexes = queries.indexes(&table.name).await?;
            let indexed: HashSet<&str> = indexes
                .iter()
                .flat_map(|idx| idx.columns.iter().map(String::as_str))
                .collect();
            for column in &mut table.columns {
                column.is_indexed = Some(indexed.contains(column.name.as_str()));
            }
            debug!("Loaded {} indexes for {}", indexes.len(), table.name);
            table.indexes = Some(indexes);
        }
    }

    let schema = Schema {
        enums,
        tables,
        relationships,
        enum_relationships,
    };

    info!(
        "Extracted {} tables, {} enums, {} relationships from {} catalog",
        schema.tables.len(),
        schema.enums.len(),
        schema.relationships.len(),
        queries.dialect()
    );
    Ok(schema)
}
