//! Configuration loading, environment overrides and validation.
//!
//! A [`Config`] is built once at startup (YAML file, then environment, then
//! CLI flags) and passed by value into the orchestrator. Nothing below reads
//! the process environment on its own.

mod types;
mod validation;

pub use types::*;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ErdError, Result};

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML string without validating, so later layers can still
    /// fill in missing fields.
    pub fn from_yaml_unvalidated(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Unset variables leave the current value alone. Malformed values
    /// (a non-numeric port, an unknown boolean) are configuration errors.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DB_TYPE") {
            self.database.r#type = DbType::parse(&v).ok_or_else(|| {
                ErdError::Config(format!(
                    "Unknown database type: '{}'. Supported types: postgres, mysql",
                    v
                ))
            })?;
        }
        if let Some(v) = get("DB_HOST") {
            self.database.host = v;
        }
        if let Some(v) = get("DB_PORT") {
            let port = v.trim().parse::<u16>().map_err(|_| {
                ErdError::Config(format!("DB_PORT must be a port number, got '{}'", v))
            })?;
            self.database.port = Some(port);
        }
        if let Some(v) = get("DB_NAME") {
            self.database.database = v;
        }
        if let Some(v) = get("DB_USER") {
            self.database.user = v;
        }
        if let Some(v) = lookup("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = get("DB_SCHEMA") {
            self.database.schema = Some(v);
        }
        if let Some(v) = get("DB_SSL_MODE") {
            self.database.ssl_mode = v;
        }

        if let Some(v) = get("OUTPUT_PATH") {
            self.output.diagram_path = PathBuf::from(v);
        }
        if let Some(v) = get("README_PATH") {
            self.output.readme_path = PathBuf::from(v);
        }
        if let Some(v) = get("UPDATE_README") {
            self.output.update_readme = parse_bool("UPDATE_README", &v)?;
        }
        if let Some(v) = get("SHOW_INDEXES") {
            self.output.show_indexes = parse_bool("SHOW_INDEXES", &v)?;
        }
        if let Some(v) = get("EXCLUDE_TABLES") {
            self.output.exclude_tables = split_list(&v);
        }

        if let Some(v) = get("GIT_AUTO_COMMIT") {
            self.git.auto_commit = parse_bool("GIT_AUTO_COMMIT", &v)?;
        }
        if let Some(v) = get("GIT_PUSH") {
            self.git.push = parse_bool("GIT_PUSH", &v)?;
        }
        if let Some(v) = get("GIT_COMMIT_MESSAGE") {
            self.git.commit_message = v;
        }

        debug!("Applied environment overrides: {:?}", self.database);
        Ok(self)
    }

    /// Excluded table names as a set.
    pub fn excluded_tables(&self) -> BTreeSet<String> {
        self.output.exclude_tables.iter().cloned().collect()
    }
}

/// Parse a boolean environment value.
fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ErdError::Config(format!(
            "{} must be a boolean (true/false), got '{}'",
            key, other
        ))),
    }
}

/// Split a comma-separated list, dropping empty entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
