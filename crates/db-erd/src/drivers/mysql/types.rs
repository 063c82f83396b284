//! MySQL type canonicalization and inline enum handling.
//!
//! MySQL has no standalone enum types: `ENUM('a','b')` is declared per
//! column. Each such column becomes its own pseudo-type named
//! `{table}_{column}_enum`, so two columns with identical labels still yield
//! two enum types.

use tracing::warn;

use crate::core::schema::{EnumType, Index};
use crate::core::traits::RawColumn;
use crate::drivers::postgres::{with_length, with_precision};

/// Synthesized enum type name for an enum column.
pub fn enum_type_name(table: &str, column: &str) -> String {
    format!("{}_{}_enum", table, column)
}

/// Canonical display type for a MySQL column.
pub fn canonical_type(table: &str, col: &RawColumn) -> String {
    let data_type = col.data_type.trim();
    match data_type.to_lowercase().as_str() {
        "enum" => enum_type_name(table, &col.name),
        "varchar" => with_length("varchar", col.max_length),
        "char" => with_length("char", col.max_length),
        "decimal" => with_precision("decimal", col.precision, col.scale),
        "numeric" => with_precision("numeric", col.precision, col.scale),
        _ => data_type.to_string(),
    }
}

/// Parse the labels out of a `COLUMN_TYPE` such as `enum('a','b''c','d,e')`.
///
/// Handles doubled single quotes and backslash escapes inside labels and
/// commas inside quoted labels. Returns `None` if the text is not an enum
/// declaration.
pub fn parse_enum_values(column_type: &str) -> Option<Vec<String>> {
    let trimmed = column_type.trim();
    let open = trimmed.find('(')?;
    if !trimmed[..open].trim().eq_ignore_ascii_case("enum") || !trimmed.ends_with(')') {
        return None;
    }
    let body = &trimmed[open + 1..trimmed.len() - 1];

    let mut values = Vec::new();
    let mut chars = body.chars().peekable();
    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some('\'') => {}
            Some(_) => return None,
        }

        let mut value = String::new();
        loop {
            match chars.next()? {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    value.push('\'');
                }
                '\'' => break,
                '\\' => value.push(chars.next()?),
                c => value.push(c),
            }
        }
        values.push(value);
    }

    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Build enum types from `(table, column, column_type)` rows in first-seen
/// order. When two columns synthesize the same name (`a_b.c` and `a.b_c`),
/// the first declaration wins and the clash is logged.
pub fn enum_types_from_columns<I>(rows: I) -> Vec<EnumType>
where
    I: IntoIterator<Item = (String, String, String)>,
{
    let mut enums: Vec<EnumType> = Vec::new();
    for (table, column, column_type) in rows {
        let Some(values) = parse_enum_values(&column_type) else {
            continue;
        };
        let name = enum_type_name(&table, &column);
        if enums.iter().any(|e| e.name == name) {
            warn!(
                "Enum name '{}' from {}.{} is already taken, keeping the first declaration",
                name, table, column
            );
            continue;
        }
        enums.push(EnumType { name, values });
    }
    enums
}

/// Build an [`Index`] from one grouped `STATISTICS` row.
///
/// `columns` is the comma-joined `GROUP_CONCAT` of plain key columns. It is
/// `NULL` when every key part is a functional expression, in which case the
/// index is skipped.
pub fn index_from_row(name: String, columns: Option<String>, is_unique: i64) -> Option<Index> {
    let columns: Vec<String> = columns?
        .split(',')
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if columns.is_empty() {
        return None;
    }
    Some(Index {
        name,
        columns,
        is_unique: is_unique == 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, data_type: &str) -> RawColumn {
        RawColumn {
            name: name.into(),
            data_type: data_type.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_enum_column_uses_synthesized_name() {
        assert_eq!(
            canonical_type("users", &col("status", "enum")),
            "users_status_enum"
        );
    }

    #[test]
    fn test_string_and_decimal_types() {
        let varchar = RawColumn {
            max_length: Some(120),
            ..col("name", "varchar")
        };
        assert_eq!(canonical_type("t", &varchar), "varchar(120)");

        let price = RawColumn {
            precision: Some(10),
            scale: Some(2),
            ..col("price", "decimal")
        };
        assert_eq!(canonical_type("t", &price), "decimal(10,2)");

        let whole = RawColumn {
            precision: Some(8),
            scale: Some(0),
            ..col("qty", "decimal")
        };
        assert_eq!(canonical_type("t", &whole), "decimal(8)");
    }

    #[test]
    fn test_passthrough() {
        let int = RawColumn {
            precision: Some(10),
            ..col("id", "int")
        };
        assert_eq!(canonical_type("t", &int), "int");
        assert_eq!(canonical_type("t", &col("body", "longtext")), "longtext");
        assert_eq!(canonical_type("t", &col("at", "datetime")), "datetime");
    }

    #[test]
    fn test_parse_enum_values() {
        assert_eq!(
            parse_enum_values("enum('active','inactive')").unwrap(),
            ["active", "inactive"]
        );
        assert_eq!(
            parse_enum_values("ENUM('it''s', 'a,b', 'c\\'d')").unwrap(),
            ["it's", "a,b", "c'd"]
        );
        assert_eq!(parse_enum_values("enum('')").unwrap(), [""]);
        assert!(parse_enum_values("set('a','b')").is_none());
        assert!(parse_enum_values("varchar(10)").is_none());
        assert!(parse_enum_values("enum('unterminated").is_none());
    }

    #[test]
    fn test_identical_values_stay_separate_types() {
        let enums = enum_types_from_columns(vec![
            ("users".into(), "status".into(), "enum('on','off')".into()),
            ("devices".into(), "status".into(), "enum('on','off')".into()),
        ]);
        assert_eq!(enums.len(), 2);
        assert_eq!(enums[0].name, "users_status_enum");
        assert_eq!(enums[1].name, "devices_status_enum");
        assert_eq!(enums[0].values, enums[1].values);
    }

    #[test]
    fn test_colliding_enum_names_keep_first_declaration() {
        let enums = enum_types_from_columns(vec![
            ("a_b".into(), "c".into(), "enum('x','y')".into()),
            ("a".into(), "b_c".into(), "enum('p','q')".into()),
        ]);
        assert_eq!(enums.len(), 1);
        assert_eq!(enums[0].name, "a_b_c_enum");
        assert_eq!(enums[0].values, ["x", "y"]);
    }

    #[test]
    fn test_index_from_row_splits_columns() {
        let index = index_from_row("idx_name_email".into(), Some("name,email".into()), 1).unwrap();
        assert_eq!(index.columns, ["name", "email"]);
        assert!(index.is_unique);

        let plain = index_from_row("idx_status".into(), Some("status".into()), 0).unwrap();
        assert!(!plain.is_unique);
    }

    #[test]
    fn test_functional_only_index_is_skipped() {
        assert!(index_from_row("idx_lower_name".into(), None, 0).is_none());
        assert!(index_from_row("idx_empty".into(), Some(String::new()), 0).is_none());
    }
}
