//! Diagram rendering.
//!
//! [`MermaidGenerator`] turns a [`Schema`] into Mermaid `erDiagram` text.
//! Rendering is pure: no sorting, no validation, no I/O. Output order is the
//! order of the schema's sequences, so an unchanged schema renders to
//! byte-identical text.

use crate::core::schema::{
    Column, EnumType, Index, Relationship, RelationshipKind, Schema, Table,
};

pub use crate::core::schema::KeyIndicator;

/// A renderer from the schema model to diagram text.
pub trait DiagramGenerator {
    fn generate(&self, schema: &Schema) -> String;
}

/// Mermaid entity-relationship renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidGenerator;

const HEADER: &str = "erDiagram";
const BLOCK_INDENT: &str = "    ";
const FIELD_INDENT: &str = "        ";

/// Placeholder for a type that cleans down to nothing.
const UNKNOWN_TYPE: &str = "unknown";

impl MermaidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl DiagramGenerator for MermaidGenerator {
    fn generate(&self, schema: &Schema) -> String {
        let mut out = String::new();
        out.push_str(HEADER);
        out.push('\n');

        for enum_type in &schema.enums {
            render_enum(&mut out, enum_type);
        }
        for table in &schema.tables {
            render_table(&mut out, table);
        }
        for rel in &schema.relationships {
            push_line(&mut out, BLOCK_INDENT, &relationship_line(rel));
        }
        for usage in &schema.enum_relationships {
            push_line(
                &mut out,
                BLOCK_INDENT,
                &format!(
                    "{} }}o--|| {} : \"uses\"",
                    usage.table,
                    enum_entity_name(&usage.enum_type)
                ),
            );
        }

        out
    }
}

/// Make a native type string safe for Mermaid's attribute-type position.
///
/// Drops `NULL` tokens, turns commas into underscores and joins the remaining
/// whitespace-separated tokens with single underscores.
/// `numeric(10,2)` becomes `numeric(10_2)`.
pub fn clean_type(data_type: &str) -> String {
    let cleaned = data_type
        .replace(',', "_")
        .split_whitespace()
        .filter(|token| *token != "NULL")
        .collect::<Vec<_>>()
        .join("_");

    if cleaned.is_empty() {
        UNKNOWN_TYPE.to_string()
    } else {
        cleaned
    }
}

fn push_line(out: &mut String, indent: &str, text: &str) {
    out.push_str(indent);
    out.push_str(text);
    out.push('\n');
}

fn enum_entity_name(name: &str) -> String {
    format!("\"{} (ENUM)\"", name)
}

fn render_enum(out: &mut String, enum_type: &EnumType) {
    push_line(
        out,
        BLOCK_INDENT,
        &format!("{} {{", enum_entity_name(&enum_type.name)),
    );
    for value in &enum_type.values {
        push_line(out, FIELD_INDENT, &format!("{} string", value));
    }
    push_line(out, BLOCK_INDENT, "}");
}

fn render_table(out: &mut String, table: &Table) {
    push_line(out, BLOCK_INDENT, &format!("{} {{", table.name));
    for column in &table.columns {
        push_line(out, FIELD_INDENT, &column_line(column));
    }
    for index in table.indexes.iter().flatten() {
        push_line(out, FIELD_INDENT, &index_line(index));
    }
    push_line(out, BLOCK_INDENT, "}");
}

fn column_line(column: &Column) -> String {
    format!(
        "{} {}{}",
        column.name,
        clean_type(&column.data_type),
        column.key_indicator().suffix()
    )
}

fn index_line(index: &Index) -> String {
    let label = if index.is_unique {
        "UNIQUE INDEX"
    } else {
        "INDEX"
    };
    // Expression key parts may carry quoted identifiers.
    format!(
        "\"{}: {} ({})\" string",
        label,
        index.name,
        index.columns.join(", ").replace('"', "'")
    )
}

fn relationship_line(rel: &Relationship) -> String {
    let (connector, caption) = match rel.kind {
        RelationshipKind::Identifying => ("||--o{", "has"),
        RelationshipKind::NonIdentifying => ("||..o{", "references"),
    };
    format!(
        "{} {} {} : \"{}\"",
        rel.from_table, connector, rel.to_table, caption
    )
}
