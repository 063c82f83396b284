//! # db-erd
//!
//! Database schema to Mermaid ER diagram generator.
//!
//! This library reads the catalog of a PostgreSQL or MySQL/MariaDB database
//! and renders it as a Mermaid `erDiagram` with support for:
//!
//! - **Two dialects** behind one [`SchemaAdapter`] interface
//! - **Enum types** rendered as pseudo-entities
//! - **Key indicators** with PK > FK > UK precedence
//! - **README splicing** between configurable markers
//! - **Git automation** to commit (and push) the refreshed diagram
//!
//! ## Example
//!
//! ```rust,no_run
//! use db_erd::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("db-erd.yaml")?;
//!     let orchestrator = Orchestrator::new(config);
//!     let summary = orchestrator.run(false).await?;
//!     println!("Rendered {} tables", summary.tables);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod publish;
pub mod render;
pub mod splice;

// Re-exports for convenient access
pub use config::{Config, DatabaseConfig, DbType, GitConfig, OutputConfig};
pub use core::{AdapterRegistry, Schema, SchemaAdapter};
pub use error::{ErdError, Result};
pub use orchestrator::{HealthCheckResult, Orchestrator, RunSummary};
pub use render::{clean_type, DiagramGenerator, KeyIndicator, MermaidGenerator};
pub use splice::DocumentSplicer;
