//! Splicing a rendered diagram into a Markdown document between markers.

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::config::{default_end_marker, default_start_marker, default_title, OutputConfig};
use crate::error::{ErdError, Result};

/// Fence language for Mermaid code blocks.
pub const DEFAULT_LANGUAGE: &str = "mermaid";

/// Replaces (or appends) a fenced diagram block delimited by two markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSplicer {
    pub start_marker: String,
    pub end_marker: String,
    /// First line of a newly created document.
    pub title: String,
    pub language: String,
}

impl Default for DocumentSplicer {
    fn default() -> Self {
        Self {
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
            title: default_title(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl DocumentSplicer {
    /// Splicer using the markers and title from the output configuration.
    pub fn from_config(output: &OutputConfig) -> Self {
        Self {
            start_marker: output.start_marker.clone(),
            end_marker: output.end_marker.clone(),
            title: output.title.clone(),
            ..Self::default()
        }
    }

    /// The marked, fenced block for `diagram`.
    pub fn block(&self, diagram: &str) -> String {
        let newline = if diagram.ends_with('\n') { "" } else { "\n" };
        format!(
            "{}\n```{}\n{}{}```\n{}",
            self.start_marker, self.language, diagram, newline, self.end_marker
        )
    }

    /// Splice `diagram` into `existing`.
    ///
    /// - markers present in order: the region from the start marker through
    ///   the end marker is replaced, text outside it is untouched
    /// - markers missing or out of order: the block is appended after a
    ///   blank line
    /// - no document: a new one holding the title and the block
    pub fn splice(&self, existing: Option<&str>, diagram: &str) -> String {
        let block = self.block(diagram);

        let Some(doc) = existing else {
            return format!("{}\n\n{}\n", self.title, block);
        };

        if let Some(start) = doc.find(&self.start_marker) {
            let search_from = start + self.start_marker.len();
            if let Some(offset) = doc[search_from..].find(&self.end_marker) {
                let end = search_from + offset + self.end_marker.len();
                return format!("{}{}{}", &doc[..start], block, &doc[end..]);
            }
        }

        let body = doc.trim_end();
        if body.is_empty() {
            format!("{}\n", block)
        } else {
            format!("{}\n\n{}\n", body, block)
        }
    }

    /// Splice `diagram` into the document at `path`, creating it if absent.
    pub fn update_file(&self, path: &Path, diagram: &str) -> Result<()> {
        let existing = match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(ErdError::splice(path, e)),
        };

        if existing.is_none() {
            debug!("{} does not exist, creating it", path.display());
        }

        let updated = self.splice(existing.as_deref(), diagram);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ErdError::splice(path, e))?;
        }
        std::fs::write(path, updated).map_err(|e| ErdError::splice(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const DIAGRAM: &str = "erDiagram\n    users {\n        id integer PK\n    }\n";

    #[test]
    fn test_creates_document_when_absent() {
        let splicer = DocumentSplicer::default();
        let doc = splicer.splice(None, DIAGRAM);
        assert_eq!(
            doc,
            "# Database Schema\n\n<!-- ERD_START -->\n```mermaid\nerDiagram\n    users {\n        \
id integer PK\n    }\n```\n<!-- ERD_END -->\n"
        );
    }

    #[test]
    fn test_replaces_marked_region_only() {
        let splicer = DocumentSplicer::default();
        let existing = "# Project\n\nIntro.\n\n<!-- ERD_START -->\nstale\n<!-- ERD_END -->\n\n## Usage\n";
        let doc = splicer.splice(Some(existing), DIAGRAM);

        assert!(doc.starts_with("# Project\n\nIntro.\n\n<!-- ERD_START -->\n```mermaid\n"));
        assert!(doc.ends_with("```\n<!-- ERD_END -->\n\n## Usage\n"));
        assert!(!doc.contains("stale"));
        assert_eq!(doc.matches("<!-- ERD_START -->").count(), 1);
    }

    #[test]
    fn test_splice_is_stable_on_rerun() {
        let splicer = DocumentSplicer::default();
        let first = splicer.splice(Some("# Notes\n"), DIAGRAM);
        let second = splicer.splice(Some(&first), DIAGRAM);
        assert_eq!(first, second);
    }

    #[test]
    fn test_appends_when_markers_missing() {
        let splicer = DocumentSplicer::default();
        let doc = splicer.splice(Some("# Project\n\nSome text.\n\n"), DIAGRAM);
        assert!(doc.starts_with("# Project\n\nSome text.\n\n<!-- ERD_START -->\n"));
        assert!(doc.ends_with("<!-- ERD_END -->\n"));
    }

    #[test]
    fn test_appends_when_markers_out_of_order() {
        let splicer = DocumentSplicer::default();
        let existing = "<!-- ERD_END -->\nmiddle\n<!-- ERD_START -->\n";
        let doc = splicer.splice(Some(existing), DIAGRAM);
        assert!(doc.starts_with(existing.trim_end()));
        assert_eq!(doc.matches("```mermaid").count(), 1);
        assert!(doc.ends_with("```\n<!-- ERD_END -->\n"));
    }

    #[test]
    fn test_custom_markers_and_missing_trailing_newline() {
        let splicer = DocumentSplicer {
            start_marker: "<!-- BEGIN -->".into(),
            end_marker: "<!-- END -->".into(),
            ..Default::default()
        };
        let block = splicer.block("erDiagram");
        assert_eq!(block, "<!-- BEGIN -->\n```mermaid\nerDiagram\n```\n<!-- END -->");
    }

    #[test]
    fn test_update_file_rewrites_existing() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "# Readme\n\n<!-- ERD_START -->\nold\n<!-- ERD_END -->\n").unwrap();

        DocumentSplicer::default()
            .update_file(file.path(), DIAGRAM)
            .unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("id integer PK"));
        assert!(!content.contains("old"));
    }

    #[test]
    fn test_update_file_creates_missing_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs").join("README.md");

        DocumentSplicer::default().update_file(&path, DIAGRAM).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Database Schema\n\n<!-- ERD_START -->"));
    }

    #[test]
    fn test_update_file_reports_path_on_failure() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be read as a document.
        let err = DocumentSplicer::default()
            .update_file(dir.path(), DIAGRAM)
            .unwrap_err();
        match err {
            ErdError::Splice { path, .. } => assert_eq!(path, dir.path()),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
