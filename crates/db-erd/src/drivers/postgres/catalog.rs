//! PostgreSQL catalog queries.
//!
//! Reads `information_schema` and `pg_catalog` for one schema through a
//! deadpool-postgres pool. Every query failure surfaces as
//! [`ErdError::Extraction`] with the step that failed as context.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use deadpool_postgres::{Object, Pool};
use tracing::debug;

use crate::core::schema::{EnumRelationship, EnumType, Index};
use crate::core::traits::{
    collect_key_roles, CatalogQueries, KeyRoles, RawColumn, RawForeignKey,
};
use crate::error::{ErdError, Result};

use super::types::{canonical_type, constraint_type, group_enum_rows};

/// Catalog query set for one PostgreSQL schema.
pub struct PostgresCatalog {
    pool: Pool,
    schema: String,
}

impl PostgresCatalog {
    pub fn new(pool: Pool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// Close the underlying pool.
    pub fn close(&self) {
        self.pool.close();
    }

    async fn client(&self, context: &str) -> Result<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| ErdError::connection(e, format!("getting connection for {}", context)))
    }
}

fn excluded_vec(excluded: &BTreeSet<String>) -> Vec<String> {
    excluded.iter().cloned().collect()
}

#[async_trait]
impl CatalogQueries for PostgresCatalog {
    fn dialect(&self) -> &str {
        "postgres"
    }

    async fn enum_types(&self, _excluded: &BTreeSet<String>) -> Result<Vec<EnumType>> {
        let client = self.client("enum_types").await?;

        let query = r#"
            SELECT t.typname::text, e.enumlabel::text
            FROM pg_catalog.pg_type t
            JOIN pg_catalog.pg_enum e ON e.enumtypid = t.oid
            JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
            WHERE n.nspname = $1
            ORDER BY t.typname, e.enumsortorder
        "#;

        let rows = client
            .query(query, &[&self.schema])
            .await
            .map_err(|e| ErdError::extraction(e, "listing enum types"))?;

        Ok(group_enum_rows(
            rows.iter().map(|r| (r.get::<_, String>(0), r.get::<_, String>(1))),
        ))
    }

    async fn base_tables(&self, excluded: &BTreeSet<String>) -> Result<Vec<String>> {
        let client = self.client("base_tables").await?;

        let query = r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema::text = $1
              AND table_type = 'BASE TABLE'
              AND NOT (table_name::text = ANY($2))
            ORDER BY table_name
        "#;

        let rows = client
            .query(query, &[&self.schema, &excluded_vec(excluded)])
            .await
            .map_err(|e| ErdError::extraction(e, "listing base tables"))?;

        let tables: Vec<String> = rows.iter().map(|r| r.get(0)).collect();
        debug!("Found {} tables in schema '{}'", tables.len(), self.schema);
        Ok(tables)
    }

    async fn columns(&self, table: &str) -> Result<Vec<RawColumn>> {
        let client = self.client("columns").await?;

        let query = r#"
            SELECT
                column_name::text,
                data_type::text,
                udt_name::text,
                character_maximum_length::int8,
                numeric_precision::int8,
                numeric_scale::int8,
                is_nullable::text = 'YES',
                column_default::text
            FROM information_schema.columns
            WHERE table_schema::text = $1 AND table_name::text = $2
            ORDER BY ordinal_position
        "#;

        let rows = client
            .query(query, &[&self.schema, &table])
            .await
            .map_err(|e| ErdError::extraction(e, format!("loading columns for {}", table)))?;

        Ok(rows
            .iter()
            .map(|row| RawColumn {
                name: row.get(0),
                data_type: row.get(1),
                udt_name: row.get(2),
                column_type: None,
                max_length: row.get(3),
                precision: row.get(4),
                scale: row.get(5),
                is_nullable: row.get(6),
                default: row.get(7),
            })
            .collect())
    }

    async fn key_roles(&self, table: &str) -> Result<HashMap<String, KeyRoles>> {
        let client = self.client("key_roles").await?;

        // pg_constraint, unlike information_schema.table_constraints, is
        // visible to roles holding only SELECT on the table.
        let query = r#"
            SELECT a.attname::text, c.contype::text
            FROM pg_catalog.pg_constraint c
            JOIN pg_catalog.pg_class t ON t.oid = c.conrelid
            JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
            CROSS JOIN LATERAL unnest(c.conkey) AS k(attnum)
            JOIN pg_catalog.pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum
            WHERE n.nspname = $1
              AND t.relname = $2
              AND c.contype IN ('p', 'f', 'u')
        "#;

        let rows = client
            .query(query, &[&self.schema, &table])
            .await
            .map_err(|e| ErdError::extraction(e, format!("loading key roles for {}", table)))?;

        Ok(collect_key_roles(rows.iter().map(|r| {
            let contype: String = r.get(1);
            (r.get::<_, String>(0), constraint_type(&contype).to_string())
        })))
    }

    async fn foreign_keys(&self, excluded: &BTreeSet<String>) -> Result<Vec<RawForeignKey>> {
        let client = self.client("foreign_keys").await?;

        let query = r#"
            SELECT
                child.relname::text,
                parent.relname::text,
                CASE c.confdeltype
                    WHEN 'c' THEN 'CASCADE'
                    WHEN 'r' THEN 'RESTRICT'
                    WHEN 'n' THEN 'SET NULL'
                    WHEN 'd' THEN 'SET DEFAULT'
                    ELSE 'NO ACTION'
                END
            FROM pg_catalog.pg_constraint c
            JOIN pg_catalog.pg_class child ON child.oid = c.conrelid
            JOIN pg_catalog.pg_class parent ON parent.oid = c.confrelid
            JOIN pg_catalog.pg_namespace n ON n.oid = child.relnamespace
            WHERE c.contype = 'f'
              AND n.nspname = $1
              AND NOT (child.relname::text = ANY($2))
              AND NOT (parent.relname::text = ANY($2))
            ORDER BY child.relname, c.conname
        "#;

        let rows = client
            .query(query, &[&self.schema, &excluded_vec(excluded)])
            .await
            .map_err(|e| ErdError::extraction(e, "listing foreign keys"))?;

        Ok(rows
            .iter()
            .map(|row| RawForeignKey {
                child_table: row.get(0),
                parent_table: row.get(1),
                delete_rule: row.get(2),
            })
            .collect())
    }

    async fn enum_usages(&self, excluded: &BTreeSet<String>) -> Result<Vec<EnumRelationship>> {
        let client = self.client("enum_usages").await?;

        let query = r#"
            SELECT c.table_name::text, c.udt_name::text
            FROM information_schema.columns c
            JOIN information_schema.tables t
              ON t.table_schema = c.table_schema
             AND t.table_name = c.table_name
             AND t.table_type = 'BASE TABLE'
            JOIN pg_catalog.pg_type ty ON ty.typname = c.udt_name AND ty.typtype = 'e'
            JOIN pg_catalog.pg_namespace tn ON tn.oid = ty.typnamespace AND tn.nspname::text = $1
            WHERE c.table_schema::text = $1
              AND c.data_type = 'USER-DEFINED'
              AND NOT (c.table_name::text = ANY($2))
            ORDER BY c.table_name, c.ordinal_position
        "#;

        let rows = client
            .query(query, &[&self.schema, &excluded_vec(excluded)])
            .await
            .map_err(|e| ErdError::extraction(e, "listing enum columns"))?;

        Ok(rows
            .iter()
            .map(|row| EnumRelationship {
                table: row.get(0),
                enum_type: row.get(1),
            })
            .collect())
    }

    async fn indexes(&self, table: &str) -> Result<Vec<Index>> {
        let client = self.client("indexes").await?;

        // Key columns only (INCLUDE columns sit past indnkeyatts). Expression
        // key parts have attnum 0 and are labelled with their definition.
        let query = r#"
            SELECT
                i.relname::text AS index_name,
                ix.indisunique,
                array_agg(
                    COALESCE(a.attname::text, pg_get_indexdef(ix.indexrelid, k.ord::int, true))
                    ORDER BY k.ord
                )
            FROM pg_catalog.pg_index ix
            JOIN pg_catalog.pg_class i ON i.oid = ix.indexrelid
            JOIN pg_catalog.pg_class t ON t.oid = ix.indrelid
            JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
            CROSS JOIN LATERAL unnest(ix.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
            LEFT JOIN pg_catalog.pg_attribute a
              ON a.attrelid = t.oid AND a.attnum = k.attnum AND k.attnum > 0
            WHERE n.nspname = $1
              AND t.relname = $2
              AND NOT ix.indisprimary
              AND k.ord <= ix.indnkeyatts
            GROUP BY i.relname, ix.indisunique
            ORDER BY i.relname
        "#;

        let rows = client
            .query(query, &[&self.schema, &table])
            .await
            .map_err(|e| ErdError::extraction(e, format!("loading indexes for {}", table)))?;

        Ok(rows
            .iter()
            .map(|row| Index {
                name: row.get(0),
                is_unique: row.get(1),
                columns: row.get(2),
            })
            .collect())
    }

    fn canonical_type(&self, _table: &str, column: &RawColumn) -> String {
        canonical_type(column)
    }
}
