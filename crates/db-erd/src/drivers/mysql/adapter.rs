//! MySQL schema adapter.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::core::schema::Schema;
use crate::core::traits::{extract_schema, SchemaAdapter};
use crate::drivers::common::SslMode;
use crate::error::{ErdError, Result};

use super::catalog::MysqlCatalog;

/// Timeout for acquiring a connection from the pool.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Schema adapter for MySQL and MariaDB.
pub struct MysqlAdapter {
    config: DatabaseConfig,
    catalog: Option<MysqlCatalog>,
}

impl MysqlAdapter {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            catalog: None,
        }
    }

    fn connect_options(&self) -> Result<MySqlConnectOptions> {
        let ssl_mode = SslMode::parse(&self.config.ssl_mode)?;
        Ok(MySqlConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port())
            .database(&self.config.database)
            .username(&self.config.user)
            .password(&self.config.password)
            .ssl_mode(ssl_mode.to_mysql()))
    }
}

#[async_trait]
impl SchemaAdapter for MysqlAdapter {
    fn dialect(&self) -> &str {
        "mysql"
    }

    async fn connect(&mut self) -> Result<()> {
        let options = self.connect_options()?;

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| ErdError::connection(e, "creating MySQL pool"))?;

        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| ErdError::connection(e, "testing MySQL connection"))?;

        info!(
            "Connected to MySQL: {}:{}/{}",
            self.config.host,
            self.config.port(),
            self.config.database
        );

        self.catalog = Some(MysqlCatalog::new(pool, self.config.schema()));
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(catalog) = self.catalog.take() {
            catalog.close().await;
            info!("Disconnected from MySQL");
        }
        Ok(())
    }

    async fn get_schema(&self, excluded: &BTreeSet<String>, show_indexes: bool) -> Result<Schema> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| ErdError::NotConnected("mysql".into()))?;
        extract_schema(catalog, excluded, show_indexes).await
    }
}
