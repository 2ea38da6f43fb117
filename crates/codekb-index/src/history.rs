//! Version-control history lookup for extracted files.

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::{IndexError, Result};

/// Source of recent commit messages for a file.
pub trait HistoryProvider: Send + Sync {
    /// Up to `n` commit subjects touching `relative_path`, most recent first.
    /// Untracked paths yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the history backend cannot be queried.
    fn last_commit_messages(
        &self,
        relative_path: &str,
        n: usize,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// History read from a git working tree through the `git` executable.
#[derive(Debug, Clone)]
pub struct GitHistory {
    root: PathBuf,
}

impl GitHistory {
    /// Open the repository containing `root`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::History`] if `git` is not installed or `root` is
    /// not inside a git work tree.
    pub async fn open(root: &Path) -> Result<Self> {
        let output = Command::new("git")
            .arg("rev-parse")
            .arg("--git-dir")
            .current_dir(root)
            .output()
            .await
            .map_err(|e| IndexError::History(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            return Err(IndexError::History(format!(
                "{} is not a git repository: {}",
                root.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

impl HistoryProvider for GitHistory {
    async fn last_commit_messages(&self, relative_path: &str, n: usize) -> Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let output = Command::new("git")
            .arg("log")
            .arg("--format=%s")
            .arg("-n")
            .arg(n.to_string())
            .arg("--")
            .arg(relative_path)
            .current_dir(&self.root)
            .output()
            .await
            .map_err(|e| IndexError::History(format!("failed to run git log: {e}")))?;

        if !output.status.success() {
            return Err(IndexError::History(format!(
                "git log failed for {relative_path}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect())
    }
}
