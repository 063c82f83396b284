//! Dialect-independent schema model.
//!
//! These types are the only thing passed from a schema adapter to the
//! diagram renderer. A [`Schema`] is built in one piece by
//! [`extract_schema`](super::traits::extract_schema) and never mutated
//! afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named enumeration.
///
/// For PostgreSQL this is a catalog enum type. MySQL has no standalone enum
/// types, so each enum column gets its own pseudo-type named
/// `{table}_{column}_enum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    /// Enum type name, unique within a schema.
    pub name: String,

    /// Labels in declaration order.
    pub values: Vec<String>,
}

/// Column metadata with resolved key roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Canonicalized display type (e.g. "varchar(255)", "numeric(10,2)").
    pub data_type: String,

    /// Column participates in the primary key.
    pub is_primary_key: bool,

    /// Column participates in a foreign key.
    pub is_foreign_key: bool,

    /// Column participates in a unique constraint.
    pub is_unique: bool,

    /// Column is covered by a secondary index. Only known when indexes were
    /// extracted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_indexed: Option<bool>,
}

impl Column {
    /// Indicator shown after the column type: PK beats FK beats UK.
    pub fn key_indicator(&self) -> KeyIndicator {
        if self.is_primary_key {
            KeyIndicator::PrimaryKey
        } else if self.is_foreign_key {
            KeyIndicator::ForeignKey
        } else if self.is_unique {
            KeyIndicator::Unique
        } else {
            KeyIndicator::None
        }
    }
}

/// Trailing key annotation on a rendered column line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIndicator {
    PrimaryKey,
    ForeignKey,
    Unique,
    None,
}

impl KeyIndicator {
    /// Suffix appended to the column line, including the leading space.
    pub fn suffix(&self) -> &'static str {
        match self {
            KeyIndicator::PrimaryKey => " PK",
            KeyIndicator::ForeignKey => " FK",
            KeyIndicator::Unique => " UK",
            KeyIndicator::None => "",
        }
    }
}

/// Secondary index metadata. Primary-key-backing indexes are never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,

    /// Indexed column names in key order.
    pub columns: Vec<String>,

    /// Whether the index is unique.
    pub is_unique: bool,
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,

    /// Columns in ordinal position order.
    pub columns: Vec<Column>,

    /// Secondary indexes, present only when index extraction was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes: Option<Vec<Index>>,
}

impl Table {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Relationship line style, derived from the foreign key's delete rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    /// ON DELETE CASCADE.
    Identifying,
    /// Any other delete rule (RESTRICT, SET NULL, NO ACTION, ...).
    NonIdentifying,
}

impl RelationshipKind {
    /// Classify a catalog delete rule string.
    pub fn from_delete_rule(rule: &str) -> Self {
        if rule.trim().eq_ignore_ascii_case("CASCADE") {
            RelationshipKind::Identifying
        } else {
            RelationshipKind::NonIdentifying
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::Identifying => f.write_str("identifying"),
            RelationshipKind::NonIdentifying => f.write_str("non-identifying"),
        }
    }
}

/// Foreign-key relationship between two tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Referenced (parent) table.
    pub from_table: String,

    /// Referencing (child) table.
    pub to_table: String,

    /// Relationship kind.
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
}

/// A table's use of an enum type through one of its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRelationship {
    /// Table name.
    pub table: String,

    /// Enum type name.
    pub enum_type: String,
}

/// Complete extracted schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub enums: Vec<EnumType>,
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    pub enum_relationships: Vec<EnumRelationship>,
}

impl Schema {
    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Total number of columns across all tables.
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    /// Total number of secondary indexes across all tables.
    pub fn index_count(&self) -> usize {
        self.tables
            .iter()
            .filter_map(|t| t.indexes.as_ref())
            .map(Vec::len)
            .sum()
    }
}
