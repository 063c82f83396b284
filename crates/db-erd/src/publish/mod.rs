//! Writing the diagram artifact and committing it with git.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::GitConfig;
use crate::error::{ErdError, Result};

/// Write `text` to `path`, creating parent directories and replacing any
/// previous content.
///
/// The text goes to a temp file in the same directory which is then renamed
/// over `path`. A failed rename drops (and deletes) the temp file.
pub fn write_diagram(path: &Path, text: &str) -> Result<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(text.as_bytes())?;
    temp.persist(path).map_err(|e| e.error)?;

    debug!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

/// Outcome of a [`GitPublisher::commit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing changed, so no commit was created.
    Unchanged,
    Committed { pushed: bool },
}

/// Stages, commits and optionally pushes generated files.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    message: String,
    push: bool,
}

impl GitPublisher {
    pub fn new(repo_dir: impl Into<PathBuf>, message: impl Into<String>, push: bool) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            message: message.into(),
            push,
        }
    }

    /// Publisher for the current directory using the git configuration.
    pub fn from_config(git: &GitConfig) -> Self {
        Self::new(".", git.commit_message.clone(), git.push)
    }

    /// Stage `paths` and commit them if anything is staged.
    pub async fn commit(&self, paths: &[PathBuf]) -> Result<CommitOutcome> {
        if paths.is_empty() {
            return Ok(CommitOutcome::Unchanged);
        }

        let mut add_args = vec!["add".to_string(), "--".to_string()];
        add_args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        self.git(add_args.as_slice()).await?;

        // `git diff --cached --quiet` exits 0 when nothing is staged
        if self.git_succeeds(&["diff", "--cached", "--quiet"]).await? {
            info!("Diagram unchanged, skipping commit");
            return Ok(CommitOutcome::Unchanged);
        }

        self.git(&["commit", "-m", self.message.as_str()]).await?;
        info!("Committed {} file(s): {}", paths.len(), self.message);

        if self.push {
            self.git(&["push"]).await?;
            info!("Pushed diagram commit");
        }

        Ok(CommitOutcome::Committed { pushed: self.push })
    }

    async fn git<S: AsRef<str>>(&self, args: &[S]) -> Result<()> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        debug!("git {}", args.join(" "));

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| ErdError::Git(format!("failed to run git {}: {}", args[0], e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ErdError::Git(format!(
                "git {} failed ({}): {}",
                args[0],
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    async fn git_succeeds(&self, args: &[&str]) -> Result<bool> {
        let status = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .status()
            .await
            .map_err(|e| ErdError::Git(format!("failed to run git {}: {}", args[0], e)))?;
        Ok(status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_diagram_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs").join("schema").join("database.mmd");

        write_diagram(&path, "erDiagram\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "erDiagram\n");
    }

    #[test]
    fn test_write_diagram_overwrites_in_full() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("database.mmd");

        write_diagram(&path, "erDiagram\n    a {\n    }\n").unwrap();
        write_diagram(&path, "erDiagram\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "erDiagram\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_diagram_leaves_same_stem_sibling_alone() {
        let dir = TempDir::new().unwrap();
        let sibling = dir.path().join("database.tmp");
        std::fs::write(&sibling, "keep me").unwrap();

        write_diagram(&dir.path().join("database.mmd"), "erDiagram\n").unwrap();

        assert_eq!(std::fs::read_to_string(&sibling).unwrap(), "keep me");
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // A directory at the target path makes the final rename fail.
        let target = dir.path().join("database.mmd");
        std::fs::create_dir(&target).unwrap();

        assert!(write_diagram(&target, "erDiagram\n").is_err());

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, [std::ffi::OsString::from("database.mmd")]);
    }

    #[test]
    fn test_from_config() {
        let git = GitConfig {
            auto_commit: true,
            push: true,
            commit_message: "docs: refresh ERD".into(),
        };
        let publisher = GitPublisher::from_config(&git);
        assert_eq!(publisher.message, "docs: refresh ERD");
        assert!(publisher.push);
        assert_eq!(publisher.repo_dir, PathBuf::from("."));
    }

    #[tokio::test]
    async fn test_commit_nothing_is_unchanged() {
        let publisher = GitPublisher::new("/nonexistent", "msg", false);
        assert_eq!(publisher.commit(&[]).await.unwrap(), CommitOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_commit_outside_repository_is_git_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("database.mmd"), "erDiagram\n").unwrap();

        let publisher = GitPublisher::new(dir.path(), "msg", false);
        let err = publisher
            .commit(&[PathBuf::from("database.mmd")])
            .await
            .unwrap_err();
        assert!(matches!(err, ErdError::Git(_)));
    }
}
