//! Adapter registry for explicit dependency injection.
//!
//! The [`AdapterRegistry`] maps each [`DbType`] to a factory that builds a
//! [`SchemaAdapter`] from a [`DatabaseConfig`]. It is constructed explicitly
//! and handed to the orchestrator, so tests can swap in in-memory adapters.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{DatabaseConfig, DbType};
use crate::drivers::{MysqlAdapter, PostgresAdapter};
use crate::error::{ErdError, Result};

use super::traits::SchemaAdapter;

/// Builds an unconnected adapter from database configuration.
pub type AdapterFactory = Arc<dyn Fn(&DatabaseConfig) -> Box<dyn SchemaAdapter> + Send + Sync>;

/// Registry of schema adapter factories keyed by dialect.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = AdapterRegistry::new();
/// registry.register(DbType::Postgres, |cfg| Box::new(PostgresAdapter::new(cfg.clone())));
///
/// let orchestrator = Orchestrator::with_registry(config, registry);
/// ```
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    factories: HashMap<DbType, AdapterFactory>,
}

impl AdapterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the PostgreSQL and MySQL adapters registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(DbType::Postgres, |cfg| {
            Box::new(PostgresAdapter::new(cfg.clone()))
        });
        registry.register(DbType::Mysql, |cfg| Box::new(MysqlAdapter::new(cfg.clone())));
        registry
    }

    /// Register (or replace) the factory for a dialect.
    pub fn register<F>(&mut self, db_type: DbType, factory: F)
    where
        F: Fn(&DatabaseConfig) -> Box<dyn SchemaAdapter> + Send + Sync + 'static,
    {
        self.factories.insert(db_type, Arc::new(factory));
    }

    /// Check if a dialect is registered.
    pub fn has(&self, db_type: DbType) -> bool {
        self.factories.contains_key(&db_type)
    }

    /// Registered dialects, sorted by tag.
    pub fn db_types(&self) -> Vec<DbType> {
        let mut types: Vec<DbType> = self.factories.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }

    /// Build an unconnected adapter for the configured dialect.
    pub fn create(&self, config: &DatabaseConfig) -> Result<Box<dyn SchemaAdapter>> {
        let factory = self.factories.get(&config.r#type).ok_or_else(|| {
            ErdError::Config(format!(
                "No schema adapter registered for database type '{}'",
                config.r#type
            ))
        })?;
        Ok(factory(config))
    }
}
