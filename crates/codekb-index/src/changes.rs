//! Content-hash change detection against stored file fingerprints.

use std::collections::HashSet;
use std::path::Path;

use codekb_store::BlockStore;

use crate::error::Result;

/// Outcome of [`detect_changes`].
#[derive(Debug, Default)]
pub struct ChangeReport {
    /// Files that need extraction, in input order.
    pub to_process: Vec<String>,
    pub new: usize,
    pub changed: usize,
    /// Unchanged files whose previous run left blocks unpersisted.
    pub resumed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    /// Blocks deleted because their file changed.
    pub blocks_removed: u64,
    pub warnings: Vec<String>,
}

impl ChangeReport {
    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.skipped += 1;
        self.warnings.push(message);
    }
}

/// Outcome of [`prune_missing`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub files_removed: usize,
    pub blocks_removed: u64,
    pub warnings: Vec<String>,
}

/// blake3 hex digest of `bytes`.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Decide which of `files` (relative to `root`) need extraction.
///
/// New files get a fingerprint recorded. Changed files lose their stored
/// blocks before the new fingerprint is written, so a failure in between
/// leaves the file looking changed on the next run. Files with a matching
/// but incomplete fingerprint are processed again with their stored blocks
/// kept. Per-file failures are reported as warnings and the file is skipped.
pub async fn detect_changes(store: &BlockStore, root: &Path, files: &[String]) -> ChangeReport {
    let mut report = ChangeReport::default();

    for rel_path in files {
        let bytes = match tokio::fs::read(root.join(rel_path)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                report.warn(format!("failed to read {rel_path}: {e}"));
                continue;
            }
        };
        let hash = content_hash(&bytes);

        let stored = match store.fingerprint(rel_path).await {
            Ok(stored) => stored,
            Err(e) => {
                report.warn(format!("failed to look up fingerprint for {rel_path}: {e}"));
                continue;
            }
        };

        match stored {
            Some(previous) if previous.hash == hash && previous.complete => {
                report.unchanged += 1;
            }
            Some(previous) if previous.hash == hash => {
                if let Err(e) = store.set_file_hash(rel_path, &hash).await {
                    report.warn(format!("failed to update fingerprint for {rel_path}: {e}"));
                    continue;
                }
                tracing::debug!(file = %rel_path, "resuming incomplete file");
                report.resumed += 1;
                report.to_process.push(rel_path.clone());
            }
            Some(_) => {
                let removed = match store.delete_file_blocks(rel_path).await {
                    Ok(n) => n,
                    Err(e) => {
                        report.warn(format!("failed to delete stale blocks of {rel_path}: {e}"));
                        continue;
                    }
                };
                if let Err(e) = store.set_file_hash(rel_path, &hash).await {
                    report.warn(format!("failed to update fingerprint for {rel_path}: {e}"));
                    continue;
                }
                tracing::debug!(file = %rel_path, removed, "file changed");
                report.blocks_removed += removed;
                report.changed += 1;
                report.to_process.push(rel_path.clone());
            }
            None => {
                if let Err(e) = store.set_file_hash(rel_path, &hash).await {
                    report.warn(format!("failed to record fingerprint for {rel_path}: {e}"));
                    continue;
                }
                tracing::debug!(file = %rel_path, "new file");
                report.new += 1;
                report.to_process.push(rel_path.clone());
            }
        }
    }

    tracing::info!(
        new = report.new,
        changed = report.changed,
        resumed = report.resumed,
        unchanged = report.unchanged,
        skipped = report.skipped,
        "change detection complete"
    );
    report
}

/// Remove blocks and fingerprints of files no longer present in `current`.
///
/// # Errors
///
/// Returns an error if the fingerprinted file list cannot be read. Failures
/// for individual files are collected as warnings.
pub async fn prune_missing(store: &BlockStore, current: &[String]) -> Result<PruneReport> {
    let current: HashSet<&str> = current.iter().map(String::as_str).collect();
    let mut report = PruneReport::default();

    for path in store.fingerprinted_files().await? {
        if current.contains(path.as_str()) {
            continue;
        }
        let removed = match store.delete_file_blocks(&path).await {
            Ok(n) => n,
            Err(e) => {
                let message = format!("failed to prune blocks of {path}: {e}");
                tracing::warn!("{message}");
                report.warnings.push(message);
                continue;
            }
        };
        if let Err(e) = store.delete_file_hash(&path).await {
            let message = format!("failed to prune fingerprint of {path}: {e}");
            tracing::warn!("{message}");
            report.warnings.push(message);
            continue;
        }
        tracing::debug!(file = %path, removed, "pruned vanished file");
        report.files_removed += 1;
        report.blocks_removed += removed;
    }

    if report.files_removed > 0 {
        tracing::info!(
            files = report.files_removed,
            blocks = report.blocks_removed,
            "removed vanished files"
        );
    }
    Ok(report)
}
