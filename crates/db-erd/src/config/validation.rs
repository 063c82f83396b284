//! Configuration validation.

use super::Config;
use crate::drivers::common::SslMode;
use crate::error::{ErdError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let db = &config.database;
    if db.host.is_empty() {
        return Err(ErdError::Config("database.host is required".into()));
    }
    if db.database.is_empty() {
        return Err(ErdError::Config("database.database is required".into()));
    }
    if db.user.is_empty() {
        return Err(ErdError::Config("database.user is required".into()));
    }
    if db.port() == 0 {
        return Err(ErdError::Config("database.port must be non-zero".into()));
    }
    SslMode::parse(&db.ssl_mode)?;

    let output = &config.output;
    if output.diagram_path.as_os_str().is_empty() {
        return Err(ErdError::Config("output.diagram_path is required".into()));
    }
    if output.update_readme {
        if output.readme_path.as_os_str().is_empty() {
            return Err(ErdError::Config(
                "output.readme_path is required when update_readme is set".into(),
            ));
        }
        if output.start_marker.trim().is_empty() || output.end_marker.trim().is_empty() {
            return Err(ErdError::Config("README markers cannot be empty".into()));
        }
        if output.start_marker == output.end_marker {
            return Err(ErdError::Config(
                "output.start_marker and output.end_marker must differ".into(),
            ));
        }
    }

    if config.git.push && !config.git.auto_commit {
        return Err(ErdError::Config("git.push requires git.auto_commit".into()));
    }
    if config.git.auto_commit && config.git.commit_message.trim().is_empty() {
        return Err(ErdError::Config("git.commit_message cannot be empty".into()));
    }

    Ok(())
}
