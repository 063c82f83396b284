//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Supported catalog dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// PostgreSQL (enum types live in the catalog).
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    /// MySQL / MariaDB (enums are inline column types).
    #[serde(alias = "mariadb")]
    Mysql,
}

impl DbType {
    /// Parse a database type tag, accepting common aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(DbType::Postgres),
            "mysql" | "mariadb" => Some(DbType::Mysql),
            _ => None,
        }
    }

    /// Canonical tag used in logs and registry lookups.
    pub fn as_str(&self) -> &'static str {
        match self {
            DbType::Postgres => "postgres",
            DbType::Mysql => "mysql",
        }
    }

    /// Default server port for this dialect.
    pub fn default_port(&self) -> u16 {
        match self {
            DbType::Postgres => 5432,
            DbType::Mysql => 3306,
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database to introspect.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Diagram and README output.
    #[serde(default)]
    pub output: OutputConfig,

    /// Git automation after writing output.
    #[serde(default)]
    pub git: GitConfig,
}

/// Database connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database type (default: postgres).
    #[serde(default)]
    pub r#type: DbType,

    /// Database host (default: localhost).
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port (default: 5432 for PostgreSQL, 3306 for MySQL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    #[serde(default)]
    pub database: String,

    /// Username.
    #[serde(default)]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Schema to introspect (default: "public" for PostgreSQL, the database
    /// name for MySQL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// SSL mode: disable, require, verify-ca, verify-full (default: disable).
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
}

impl DatabaseConfig {
    /// Effective port.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.r#type.default_port())
    }

    /// Effective schema name.
    pub fn schema(&self) -> &str {
        match (&self.schema, self.r#type) {
            (Some(schema), _) if !schema.is_empty() => schema,
            (_, DbType::Postgres) => "public",
            (_, DbType::Mysql) => &self.database,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            r#type: DbType::default(),
            host: default_host(),
            port: None,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            schema: None,
            ssl_mode: default_ssl_mode(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Diagram file, overwritten on every run (default: docs/database.mmd).
    #[serde(default = "default_diagram_path")]
    pub diagram_path: PathBuf,

    /// Splice the diagram into a README (default: false).
    #[serde(default)]
    pub update_readme: bool,

    /// README to splice into (default: README.md).
    #[serde(default = "default_readme_path")]
    pub readme_path: PathBuf,

    /// Include secondary indexes in the diagram (default: false).
    #[serde(default)]
    pub show_indexes: bool,

    /// Tables to leave out (exact, case-sensitive names).
    #[serde(default)]
    pub exclude_tables: Vec<String>,

    /// README marker opening the generated region.
    #[serde(default = "default_start_marker")]
    pub start_marker: String,

    /// README marker closing the generated region.
    #[serde(default = "default_end_marker")]
    pub end_marker: String,

    /// Title used when the README has to be created.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            diagram_path: default_diagram_path(),
            update_readme: false,
            readme_path: default_readme_path(),
            show_indexes: false,
            exclude_tables: Vec::new(),
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
            title: default_title(),
        }
    }
}

/// Git automation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Stage and commit written files (default: false).
    #[serde(default)]
    pub auto_commit: bool,

    /// Push after committing (default: false).
    #[serde(default)]
    pub push: bool,

    /// Commit message.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            auto_commit: false,
            push: false,
            commit_message: default_commit_message(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}

fn default_diagram_path() -> PathBuf {
    PathBuf::from("docs/database.mmd")
}

fn default_readme_path() -> PathBuf {
    PathBuf::from("README.md")
}

pub(crate) fn default_start_marker() -> String {
    "<!-- ERD_START -->".to_string()
}

pub(crate) fn default_end_marker() -> String {
    "<!-- ERD_END -->".to_string()
}

pub(crate) fn default_title() -> String {
    "# Database Schema".to_string()
}

fn default_commit_message() -> String {
    "docs: update database ER diagram".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_type_parse_aliases() {
        assert_eq!(DbType::parse("postgres"), Some(DbType::Postgres));
        assert_eq!(DbType::parse("PostgreSQL"), Some(DbType::Postgres));
        assert_eq!(DbType::parse("pg"), Some(DbType::Postgres));
        assert_eq!(DbType::parse("mysql"), Some(DbType::Mysql));
        assert_eq!(DbType::parse("MariaDB"), Some(DbType::Mysql));
        assert_eq!(DbType::parse("oracle"), None);
    }

    #[test]
    fn test_effective_port_and_schema() {
        let mut db = DatabaseConfig {
            database: "shop".into(),
            ..Default::default()
        };
        assert_eq!(db.port(), 5432);
        assert_eq!(db.schema(), "public");

        db.r#type = DbType::Mysql;
        assert_eq!(db.port(), 3306);
        assert_eq!(db.schema(), "shop");

        db.port = Some(13306);
        db.schema = Some("inventory".into());
        assert_eq!(db.port(), 13306);
        assert_eq!(db.schema(), "inventory");
    }

    #[test]
    fn test_debug_redacts_password() {
        let db = DatabaseConfig {
            password: "super_secret_password_123".into(),
            ..Default::default()
        };
        let debug_output = format!("{:?}", db);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password_123"));
    }
}
