//! Error types for schema extraction and diagram generation.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for db-erd operations.
#[derive(Error, Debug)]
pub enum ErdError {
    /// Configuration error (invalid YAML, missing fields, bad env values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Could not establish a session with the database server
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// A catalog query failed mid-extraction
    #[error("Schema extraction failed: {message}\n  Context: {context}")]
    Extraction { message: String, context: String },

    /// An adapter was asked for a schema before `connect` succeeded
    #[error("{0} adapter is not connected")]
    NotConnected(String),

    /// README/document splice failed
    #[error("Failed to update document {}: {message}", path.display())]
    Splice { path: PathBuf, message: String },

    /// A git command exited unsuccessfully
    #[error("Git error: {0}")]
    Git(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ErdError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        ErdError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create an Extraction error with context about which catalog query failed
    pub fn extraction(message: impl ToString, context: impl Into<String>) -> Self {
        ErdError::Extraction {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Splice error for the given document path
    pub fn splice(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ErdError::Splice {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErdError::Config(_) | ErdError::Yaml(_) => 2,
            ErdError::Connection { .. } | ErdError::NotConnected(_) => 3,
            ErdError::Extraction { .. } => 4,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for db-erd operations.
pub type Result<T> = std::result::Result<T, ErdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ErdError::Config("bad".into()).exit_code(), 2);
        assert_eq!(ErdError::connection("refused", "connecting").exit_code(), 3);
        assert_eq!(ErdError::NotConnected("postgres".into()).exit_code(), 3);
        assert_eq!(ErdError::extraction("boom", "listing tables").exit_code(), 4);
        assert_eq!(ErdError::Git("nothing".into()).exit_code(), 1);
    }

    #[test]
    fn test_format_detailed_includes_context() {
        let err = ErdError::extraction("relation does not exist", "loading columns for users");
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: Schema extraction failed"));
        assert!(detailed.contains("loading columns for users"));
    }

    #[test]
    fn test_format_detailed_walks_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = ErdError::from(io);
        let detailed = err.format_detailed();
        assert!(detailed.contains("IO error: read-only"));
    }
}
