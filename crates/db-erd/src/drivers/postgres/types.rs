//! PostgreSQL type canonicalization and enum row grouping.

use crate::core::schema::EnumType;
use crate::core::traits::RawColumn;

/// Canonical display type for a PostgreSQL column.
///
/// - `character varying(n)` → `varchar(n)`, `character(n)` → `char(n)`
/// - `numeric(p,s)` → `numeric(p,s)`, scale dropped when zero or unknown
/// - `USER-DEFINED` → the underlying enum/composite name (`udt_name`)
/// - everything else verbatim
pub fn canonical_type(col: &RawColumn) -> String {
    let data_type = col.data_type.trim();
    match data_type.to_lowercase().as_str() {
        "user-defined" => col
            .udt_name
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| data_type.to_string()),
        "character varying" | "varchar" => with_length("varchar", col.max_length),
        "character" | "char" | "bpchar" => with_length("char", col.max_length),
        "numeric" | "decimal" => with_precision("numeric", col.precision, col.scale),
        _ => data_type.to_string(),
    }
}

/// `name(length)`, or the bare name when no length is declared.
pub(crate) fn with_length(name: &str, length: Option<i64>) -> String {
    match length {
        Some(n) if n > 0 => format!("{}({})", name, n),
        _ => name.to_string(),
    }
}

/// `name(precision[,scale])`, or the bare name when precision is unknown.
pub(crate) fn with_precision(name: &str, precision: Option<i64>, scale: Option<i64>) -> String {
    match (precision, scale) {
        (Some(p), Some(s)) if p > 0 && s > 0 => format!("{}({},{})", name, p, s),
        (Some(p), _) if p > 0 => format!("{}({})", name, p),
        _ => name.to_string(),
    }
}

/// Constraint type name for a `pg_constraint.contype` code, as understood by
/// [`collect_key_roles`](crate::core::traits::collect_key_roles).
pub fn constraint_type(contype: &str) -> &'static str {
    match contype {
        "p" => "PRIMARY KEY",
        "f" => "FOREIGN KEY",
        "u" => "UNIQUE",
        "c" => "CHECK",
        "x" => "EXCLUDE",
        _ => "OTHER",
    }
}

/// Group `(type name, label)` rows, already ordered by type and sort order,
/// into enum types.
pub fn group_enum_rows<I>(rows: I) -> Vec<EnumType>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut enums: Vec<EnumType> = Vec::new();
    for (name, label) in rows {
        match enums.last_mut() {
            Some(last) if last.name == name => last.values.push(label),
            _ => enums.push(EnumType {
                name,
                values: vec![label],
            }),
        }
    }
    enums
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(data_type: &str) -> RawColumn {
        RawColumn {
            name: "c".into(),
            data_type: data_type.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_varchar_with_length() {
        let c = RawColumn {
            max_length: Some(255),
            ..col("character varying")
        };
        assert_eq!(canonical_type(&c), "varchar(255)");
        assert_eq!(canonical_type(&col("character varying")), "varchar");
    }

    #[test]
    fn test_char_with_length() {
        let c = RawColumn {
            max_length: Some(2),
            ..col("character")
        };
        assert_eq!(canonical_type(&c), "char(2)");
    }

    #[test]
    fn test_numeric_precision_and_scale() {
        let c = RawColumn {
            precision: Some(10),
            scale: Some(2),
            ..col("numeric")
        };
        assert_eq!(canonical_type(&c), "numeric(10,2)");

        let no_scale = RawColumn {
            precision: Some(12),
            scale: Some(0),
            ..col("numeric")
        };
        assert_eq!(canonical_type(&no_scale), "numeric(12)");

        assert_eq!(canonical_type(&col("numeric")), "numeric");
    }

    #[test]
    fn test_user_defined_uses_udt_name() {
        let c = RawColumn {
            udt_name: Some("user_status".into()),
            ..col("USER-DEFINED")
        };
        assert_eq!(canonical_type(&c), "user_status");
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(canonical_type(&col("integer")), "integer");
        assert_eq!(
            canonical_type(&col("timestamp with time zone")),
            "timestamp with time zone"
        );
        // Integer precision is reported but never rendered.
        let int = RawColumn {
            precision: Some(32),
            ..col("integer")
        };
        assert_eq!(canonical_type(&int), "integer");
    }

    #[test]
    fn test_group_enum_rows_keeps_order() {
        let rows = vec![
            ("mood".to_string(), "sad".to_string()),
            ("mood".to_string(), "ok".to_string()),
            ("mood".to_string(), "happy".to_string()),
            ("status".to_string(), "active".to_string()),
        ];
        let enums = group_enum_rows(rows);
        assert_eq!(enums.len(), 2);
        assert_eq!(enums[0].name, "mood");
        assert_eq!(enums[0].values, ["sad", "ok", "happy"]);
        assert_eq!(enums[1].values, ["active"]);
    }

    #[test]
    fn test_contype_rows_become_key_roles() {
        use crate::core::traits::{collect_key_roles, KeyRoles};

        let rows = [
            ("id", "p"),
            ("email", "u"),
            ("user_id", "f"),
            ("total", "c"),
        ];
        let roles = collect_key_roles(
            rows.iter()
                .map(|(col, code)| (col.to_string(), constraint_type(code).to_string())),
        );

        assert!(roles["id"].primary_key && !roles["id"].foreign_key);
        assert!(roles["email"].unique && !roles["email"].primary_key);
        assert!(roles["user_id"].foreign_key && !roles["user_id"].unique);
        assert_eq!(roles["total"], KeyRoles::default());
    }
}
