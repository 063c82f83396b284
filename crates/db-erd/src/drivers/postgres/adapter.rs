//! PostgreSQL schema adapter.

use std::collections::BTreeSet;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::Config as PgConfig;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::core::schema::Schema;
use crate::core::traits::{extract_schema, SchemaAdapter};
use crate::drivers::common::{SslMode, TlsBuilder};
use crate::error::{ErdError, Result};

use super::catalog::PostgresCatalog;

/// Extraction runs one query at a time, so one connection is enough.
const POOL_SIZE: usize = 1;

/// Schema adapter for PostgreSQL.
pub struct PostgresAdapter {
    config: DatabaseConfig,
    catalog: Option<PostgresCatalog>,
}

impl PostgresAdapter {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            catalog: None,
        }
    }

    fn build_pool(&self) -> Result<Pool> {
        let mut pg_config = PgConfig::new();
        pg_config.host(&self.config.host);
        pg_config.port(self.config.port());
        pg_config.dbname(&self.config.database);
        pg_config.user(&self.config.user);
        pg_config.password(&self.config.password);
        pg_config.application_name("db-erd");

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let ssl_mode = SslMode::parse(&self.config.ssl_mode)?;
        let mgr = match TlsBuilder::new(ssl_mode).build()? {
            Some(tls) => Manager::from_config(pg_config, tls, mgr_config),
            None => {
                if self.config.host != "localhost" && self.config.host != "127.0.0.1" {
                    warn!(
                        "PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext."
                    );
                }
                Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config)
            }
        };

        Pool::builder(mgr)
            .max_size(POOL_SIZE)
            .build()
            .map_err(|e| ErdError::connection(e, "creating PostgreSQL pool"))
    }
}

#[async_trait]
impl SchemaAdapter for PostgresAdapter {
    fn dialect(&self) -> &str {
        "postgres"
    }

    async fn connect(&mut self) -> Result<()> {
        let pool = self.build_pool()?;

        let client = pool
            .get()
            .await
            .map_err(|e| ErdError::connection(e, "connecting to PostgreSQL"))?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| ErdError::connection(e, "testing PostgreSQL connection"))?;
        drop(client);

        info!(
            "Connected to PostgreSQL: {}:{}/{} (schema '{}')",
            self.config.host,
            self.config.port(),
            self.config.database,
            self.config.schema()
        );

        self.catalog = Some(PostgresCatalog::new(pool, self.config.schema()));
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(catalog) = self.catalog.take() {
            catalog.close();
            info!("Disconnected from PostgreSQL");
        }
        Ok(())
    }

    async fn get_schema(&self, excluded: &BTreeSet<String>, show_indexes: bool) -> Result<Schema> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| ErdError::NotConnected("postgres".into()))?;
        extract_schema(catalog, excluded, show_indexes).await
    }
}
