//! Source tree scanning.

use std::path::Path;

use crate::extract::{extension_of, normalize_extension};

/// Relative paths (forward slashes, sorted) of every file under `root` whose
/// extension is in `extensions`.
///
/// Honours `.gitignore` files, also outside a git repository, and skips
/// hidden entries. Unreadable entries are logged and skipped.
#[must_use]
pub fn scan_files(root: &Path, extensions: &[String]) -> Vec<String> {
    let wanted: Vec<String> = extensions.iter().map(|e| normalize_extension(e)).collect();

    let mut files: Vec<String> = ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .require_git(false)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|e| extension_of(e.path()).is_some_and(|ext| wanted.contains(&ext)))
        .filter_map(|e| {
            let rel = e.path().strip_prefix(root).ok()?;
            Some(rel.to_string_lossy().replace('\\', "/"))
        })
        .collect();

    files.sort();
    tracing::debug!(root = %root.display(), files = files.len(), "scan complete");
    files
}
