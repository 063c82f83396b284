//! MySQL catalog queries over `INFORMATION_SCHEMA`.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::Row;
use tracing::debug;

use crate::core::schema::{EnumRelationship, EnumType, Index};
use crate::core::traits::{
    collect_key_roles, CatalogQueries, KeyRoles, RawColumn, RawForeignKey,
};
use crate::error::{ErdError, Result};

use super::types::{canonical_type, enum_type_name, enum_types_from_columns, index_from_row};

/// Catalog query set for one MySQL database.
pub struct MysqlCatalog {
    pool: MySqlPool,
    database: String,
}

impl MysqlCatalog {
    pub fn new(pool: MySqlPool, database: impl Into<String>) -> Self {
        Self {
            pool,
            database: database.into(),
        }
    }

    /// Close the pool and wait for connections to be released.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// `(table, column, column_type)` for every enum column of a base table.
    async fn enum_columns(
        &self,
        excluded: &BTreeSet<String>,
    ) -> Result<Vec<(String, String, String)>> {
        // CAST to CHAR to handle collation differences
        let query = r#"
            SELECT
                CAST(c.TABLE_NAME AS CHAR(255)) AS TABLE_NAME,
                CAST(c.COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
                CAST(c.COLUMN_TYPE AS CHAR(16384)) AS COLUMN_TYPE
            FROM INFORMATION_SCHEMA.COLUMNS c
            JOIN INFORMATION_SCHEMA.TABLES t
                ON t.TABLE_SCHEMA = c.TABLE_SCHEMA
                AND t.TABLE_NAME = c.TABLE_NAME
                AND t.TABLE_TYPE = 'BASE TABLE'
            WHERE c.TABLE_SCHEMA = ? AND c.DATA_TYPE = 'enum'
            ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ErdError::extraction(e, "listing MySQL enum columns"))?;

        Ok(rows
            .iter()
            .map(|row| {
                (
                    row.get::<String, _>("TABLE_NAME"),
                    row.get::<String, _>("COLUMN_NAME"),
                    row.get::<String, _>("COLUMN_TYPE"),
                )
            })
            .filter(|(table, _, _)| !excluded.contains(table))
            .collect())
    }
}

#[async_trait]
impl CatalogQueries for MysqlCatalog {
    fn dialect(&self) -> &str {
        "mysql"
    }

    async fn enum_types(&self, excluded: &BTreeSet<String>) -> Result<Vec<EnumType>> {
        let enums = enum_types_from_columns(self.enum_columns(excluded).await?);
        debug!("Found {} enum columns in '{}'", enums.len(), self.database);
        Ok(enums)
    }

    async fn base_tables(&self, excluded: &BTreeSet<String>) -> Result<Vec<String>> {
        let query = r#"
            SELECT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ErdError::extraction(e, "listing MySQL base tables"))?;

        let tables: Vec<String> = rows
            .iter()
            .map(|row| row.get::<String, _>("TABLE_NAME"))
            .filter(|name| !excluded.contains(name))
            .collect();
        debug!("Found {} tables in '{}'", tables.len(), self.database);
        Ok(tables)
    }

    async fn columns(&self, table: &str) -> Result<Vec<RawColumn>> {
        // Cap max_length at i32 max; LONGTEXT and friends report -1
        let query = r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
                CAST(DATA_TYPE AS CHAR(255)) AS DATA_TYPE,
                CAST(COLUMN_TYPE AS CHAR(16384)) AS COLUMN_TYPE,
                CAST(CASE
                    WHEN CHARACTER_MAXIMUM_LENGTH IS NULL THEN 0
                    WHEN CHARACTER_MAXIMUM_LENGTH > 2147483647 THEN -1
                    ELSE CHARACTER_MAXIMUM_LENGTH
                END AS SIGNED) AS max_length,
                CAST(COALESCE(NUMERIC_PRECISION, 0) AS SIGNED) AS num_precision,
                CAST(COALESCE(NUMERIC_SCALE, 0) AS SIGNED) AS num_scale,
                CAST(IF(IS_NULLABLE = 'YES', 1, 0) AS SIGNED) AS is_nullable,
                CAST(COLUMN_DEFAULT AS CHAR(4096)) AS COLUMN_DEFAULT
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                ErdError::extraction(e, format!("loading MySQL columns for {}", table))
            })?;

        let positive = |n: i64| (n > 0).then_some(n);

        Ok(rows
            .iter()
            .map(|row| RawColumn {
                name: row.get::<String, _>("COLUMN_NAME"),
                data_type: row.get::<String, _>("DATA_TYPE"),
                udt_name: None,
                column_type: Some(row.get::<String, _>("COLUMN_TYPE")),
                max_length: positive(row.get::<i64, _>("max_length")),
                precision: positive(row.get::<i64, _>("num_precision")),
                scale: Some(row.get::<i64, _>("num_scale")),
                is_nullable: row.get::<i64, _>("is_nullable") == 1,
                default: row.get::<Option<String>, _>("COLUMN_DEFAULT"),
            })
            .collect())
    }

    async fn key_roles(&self, table: &str) -> Result<HashMap<String, KeyRoles>> {
        let query = r#"
            SELECT
                CAST(kcu.COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
                CAST(tc.CONSTRAINT_TYPE AS CHAR(64)) AS CONSTRAINT_TYPE
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
            JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
                ON kcu.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA
                AND kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
                AND kcu.TABLE_NAME = tc.TABLE_NAME
            WHERE tc.TABLE_SCHEMA = ? AND tc.TABLE_NAME = ?
              AND tc.CONSTRAINT_TYPE IN ('PRIMARY KEY', 'FOREIGN KEY', 'UNIQUE')
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                ErdError::extraction(e, format!("loading MySQL key roles for {}", table))
            })?;

        Ok(collect_key_roles(rows.iter().map(|row| {
            (
                row.get::<String, _>("COLUMN_NAME"),
                row.get::<String, _>("CONSTRAINT_TYPE"),
            )
        })))
    }

    async fn foreign_keys(&self, excluded: &BTreeSet<String>) -> Result<Vec<RawForeignKey>> {
        let query = r#"
            SELECT
                CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME,
                CAST(REFERENCED_TABLE_NAME AS CHAR(255)) AS REFERENCED_TABLE_NAME,
                CAST(DELETE_RULE AS CHAR(64)) AS DELETE_RULE
            FROM INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS
            WHERE CONSTRAINT_SCHEMA = ?
            ORDER BY TABLE_NAME, CONSTRAINT_NAME
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ErdError::extraction(e, "listing MySQL foreign keys"))?;

        Ok(rows
            .iter()
            .map(|row| RawForeignKey {
                child_table: row.get::<String, _>("TABLE_NAME"),
                parent_table: row.get::<String, _>("REFERENCED_TABLE_NAME"),
                delete_rule: row.get::<String, _>("DELETE_RULE"),
            })
            .filter(|fk| {
                !excluded.contains(&fk.child_table) && !excluded.contains(&fk.parent_table)
            })
            .collect())
    }

    async fn enum_usages(&self, excluded: &BTreeSet<String>) -> Result<Vec<EnumRelationship>> {
        Ok(self
            .enum_columns(excluded)
            .await?
            .into_iter()
            .map(|(table, column, _)| EnumRelationship {
                enum_type: enum_type_name(&table, &column),
                table,
            })
            .collect())
    }

    async fn indexes(&self, table: &str) -> Result<Vec<Index>> {
        let query = r#"
            SELECT
                CAST(INDEX_NAME AS CHAR(255)) AS INDEX_NAME,
                GROUP_CONCAT(CAST(COLUMN_NAME AS CHAR(255)) ORDER BY SEQ_IN_INDEX) AS columns,
                CAST(IF(NON_UNIQUE = 0, 1, 0) AS SIGNED) AS is_unique
            FROM INFORMATION_SCHEMA.STATISTICS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
              AND INDEX_NAME != 'PRIMARY'
              AND COLUMN_NAME IS NOT NULL
            GROUP BY INDEX_NAME, NON_UNIQUE
            ORDER BY INDEX_NAME
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                ErdError::extraction(e, format!("loading MySQL indexes for {}", table))
            })?;

        // Functional key parts have a NULL COLUMN_NAME.
        Ok(rows
            .iter()
            .filter_map(|row| {
                index_from_row(
                    row.get("INDEX_NAME"),
                    row.get::<Option<String>, _>("columns"),
                    row.get("is_unique"),
                )
            })
            .collect())
    }

    fn canonical_type(&self, table: &str, column: &RawColumn) -> String {
        canonical_type(table, column)
    }
}
