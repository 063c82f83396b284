//! In-memory catalog and adapter used by unit tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::drivers::postgres::canonical_type;
use crate::error::{ErdError, Result};

use super::schema::{EnumRelationship, EnumType, Index, Schema};
use super::traits::{
    extract_schema, CatalogQueries, KeyRoles, RawColumn, RawForeignKey, SchemaAdapter,
};

/// Catalog answers held in memory, in catalog order.
#[derive(Default)]
pub struct StaticCatalog {
    pub enums: Vec<EnumType>,
    pub tables: Vec<(String, Vec<RawColumn>)>,
    pub roles: HashMap<String, HashMap<String, KeyRoles>>,
    pub foreign_keys: Vec<RawForeignKey>,
    pub enum_usages: Vec<EnumRelationship>,
    pub indexes: HashMap<String, Vec<Index>>,
    honor_exclusions: bool,
    failing_table: Option<String>,
    index_calls: AtomicUsize,
}

fn raw(name: &str, data_type: &str) -> RawColumn {
    RawColumn {
        name: name.to_string(),
        data_type: data_type.to_string(),
        is_nullable: true,
        ..Default::default()
    }
}

fn roles(pk: bool, fk: bool, unique: bool) -> KeyRoles {
    KeyRoles {
        primary_key: pk,
        foreign_key: fk,
        unique,
    }
}

impl StaticCatalog {
    /// users / orders / audit_log with one enum and two foreign keys.
    pub fn shop() -> Self {
        let users = vec![
            raw("id", "integer"),
            RawColumn {
                max_length: Some(255),
                ..raw("email", "character varying")
            },
            RawColumn {
                udt_name: Some("user_status".into()),
                ..raw("status", "USER-DEFINED")
            },
        ];
        let orders = vec![
            raw("user_id", "integer"),
            raw("created_at", "timestamp without time zone"),
            RawColumn {
                precision: Some(10),
                scale: Some(2),
                ..raw("total", "numeric")
            },
        ];
        let audit_log = vec![raw("id", "bigint"), raw("user_id", "integer"), raw("note", "text")];

        let mut role_map = HashMap::new();
        role_map.insert(
            "users".to_string(),
            HashMap::from([
                ("id".to_string(), roles(true, false, false)),
                ("email".to_string(), roles(false, false, true)),
            ]),
        );
        role_map.insert(
            "orders".to_string(),
            HashMap::from([("user_id".to_string(), roles(true, true, false))]),
        );
        role_map.insert(
            "audit_log".to_string(),
            HashMap::from([
                ("id".to_string(), roles(true, false, false)),
                ("user_id".to_string(), roles(false, true, false)),
            ]),
        );

        Self {
            enums: vec![EnumType {
                name: "user_status".into(),
                values: vec!["active".into(), "inactive".into()],
            }],
            tables: vec![
                ("users".into(), users),
                ("orders".into(), orders),
                ("audit_log".into(), audit_log),
            ],
            roles: role_map,
            foreign_keys: vec![
                RawForeignKey {
                    child_table: "orders".into(),
                    parent_table: "users".into(),
                    delete_rule: "CASCADE".into(),
                },
                RawForeignKey {
                    child_table: "audit_log".into(),
                    parent_table: "users".into(),
                    delete_rule: "SET NULL".into(),
                },
            ],
            enum_usages: vec![EnumRelationship {
                table: "users".into(),
                enum_type: "user_status".into(),
            }],
            indexes: HashMap::from([(
                "orders".to_string(),
                vec![Index {
                    name: "idx_orders_created_at".into(),
                    columns: vec!["created_at".into()],
                    is_unique: false,
                }],
            )]),
            honor_exclusions: true,
            failing_table: None,
            index_calls: AtomicUsize::new(0),
        }
    }

    /// Return excluded tables from every query, as a sloppy catalog would.
    pub fn ignoring_exclusions(mut self) -> Self {
        self.honor_exclusions = false;
        self
    }

    /// Fail the column query for `table`.
    pub fn failing_columns_for(mut self, table: &str) -> Self {
        self.failing_table = Some(table.to_string());
        self
    }

    /// Number of index queries issued so far.
    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }

    fn keep(&self, excluded: &BTreeSet<String>, table: &str) -> bool {
        !self.honor_exclusions || !excluded.contains(table)
    }
}

#[async_trait]
impl CatalogQueries for StaticCatalog {
    fn dialect(&self) -> &str {
        "static"
    }

    async fn enum_types(&self, _excluded: &BTreeSet<String>) -> Result<Vec<EnumType>> {
        Ok(self.enums.clone())
    }

    async fn base_tables(&self, excluded: &BTreeSet<String>) -> Result<Vec<String>> {
        Ok(self
            .tables
            .iter()
            .map(|(name, _)| name.clone())
            .filter(|name| self.keep(excluded, name))
            .collect())
    }

    async fn columns(&self, table: &str) -> Result<Vec<RawColumn>> {
        if self.failing_table.as_deref() == Some(table) {
            return Err(ErdError::extraction(
                "simulated failure",
                format!("loading columns for {}", table),
            ));
        }
        Ok(self
            .tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, cols)| cols.clone())
            .unwrap_or_default())
    }

    async fn key_roles(&self, table: &str) -> Result<HashMap<String, KeyRoles>> {
        Ok(self.roles.get(table).cloned().unwrap_or_default())
    }

    async fn foreign_keys(&self, excluded: &BTreeSet<String>) -> Result<Vec<RawForeignKey>> {
        Ok(self
            .foreign_keys
            .iter()
            .filter(|fk| {
                self.keep(excluded, &fk.child_table) && self.keep(excluded, &fk.parent_table)
            })
            .cloned()
            .collect())
    }

    async fn enum_usages(&self, excluded: &BTreeSet<String>) -> Result<Vec<EnumRelationship>> {
        Ok(self
            .enum_usages
            .iter()
            .filter(|u| self.keep(excluded, &u.table))
            .cloned()
            .collect())
    }

    async fn indexes(&self, table: &str) -> Result<Vec<Index>> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.indexes.get(table).cloned().unwrap_or_default())
    }

    fn canonical_type(&self, _table: &str, column: &RawColumn) -> String {
        canonical_type(column)
    }
}

/// Shared counters observed by tests after the adapter has been consumed.
#[derive(Debug, Default)]
pub struct AdapterProbe {
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
}

/// Adapter over a [`StaticCatalog`] with injectable connect failures.
pub struct StaticAdapter {
    catalog: StaticCatalog,
    probe: Arc<AdapterProbe>,
    fail_connect: bool,
    fail_disconnect: bool,
    connected: bool,
}

impl StaticAdapter {
    pub fn new(catalog: StaticCatalog, probe: Arc<AdapterProbe>) -> Self {
        Self {
            catalog,
            probe,
            fail_connect: false,
            fail_disconnect: false,
            connected: false,
        }
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }
}

#[async_trait]
impl SchemaAdapter for StaticAdapter {
    fn dialect(&self) -> &str {
        "static"
    }

    async fn connect(&mut self) -> Result<()> {
        self.probe.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(ErdError::connection(
                "connection refused",
                "connecting to static catalog",
            ));
        }
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.probe.disconnects.fetch_add(1, Ordering::SeqCst);
        self.connected = false;
        if self.fail_disconnect {
            return Err(ErdError::connection(
                "socket closed",
                "disconnecting from static catalog",
            ));
        }
        Ok(())
    }

    async fn get_schema(&self, excluded: &BTreeSet<String>, show_indexes: bool) -> Result<Schema> {
        if !self.connected {
            return Err(ErdError::NotConnected("static".into()));
        }
        extract_schema(&self.catalog, excluded, show_indexes).await
    }
}
