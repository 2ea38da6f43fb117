//! Incremental indexing run: scan → detect changes → extract → persist.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use codekb_llm::EmbeddingProvider;
use codekb_store::BlockStore;
use tokio::time::Instant;

use crate::changes::{detect_changes, prune_missing};
use crate::error::{IndexError, Result};
use crate::extract::text::DEFAULT_TOKEN_LIMIT;
use crate::history::GitHistory;
use crate::orchestrator::{HistorySource, extract_blocks};
use crate::pipeline::{BackfillReport, EmbedMode, backfill, persist_blocks};
use crate::registry::ParserRegistry;
use crate::walk::scan_files;

/// Indexer configuration.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub token_limit: usize,
    /// Commit messages attached per file; history is off when `None`.
    pub history_commits: Option<usize>,
    pub batch_size: usize,
    /// Overall budget for the embedding phase.
    pub embed_timeout: Duration,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            extensions: ["py", "md", "yml", "conf"].map(String::from).to_vec(),
            token_limit: DEFAULT_TOKEN_LIMIT,
            history_commits: Some(3),
            batch_size: 1,
            embed_timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Summary of an indexing run.
#[derive(Debug, Default)]
pub struct IndexReport {
    pub files_scanned: usize,
    pub files_new: usize,
    pub files_changed: usize,
    /// Files retried because an earlier run left some of their blocks unstored.
    pub files_resumed: usize,
    pub files_unchanged: usize,
    pub files_skipped: usize,
    pub files_removed: usize,
    /// Files that will be processed again on the next run.
    pub files_incomplete: usize,
    pub blocks_extracted: usize,
    pub blocks_created: usize,
    pub blocks_duplicate: usize,
    pub blocks_failed: usize,
    pub blocks_timed_out: usize,
    pub blocks_removed: u64,
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

/// Drives incremental indexing of one source tree into a [`BlockStore`].
pub struct Indexer<P> {
    store: BlockStore,
    provider: Option<P>,
    registry: ParserRegistry,
    config: IndexerConfig,
}

impl<P: EmbeddingProvider> Indexer<P> {
    /// `provider` may be `None` for runs that only persist blocks
    /// ([`EmbedMode::Deferred`]).
    #[must_use]
    pub fn new(store: BlockStore, provider: Option<P>, config: IndexerConfig) -> Self {
        let registry = ParserRegistry::for_extensions(&config.extensions, config.token_limit);
        Self {
            store,
            provider,
            registry,
            config,
        }
    }

    #[must_use]
    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    #[must_use]
    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    #[must_use]
    pub fn into_store(self) -> BlockStore {
        self.store
    }

    /// Index the configured root incrementally.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::MissingProvider`] for [`EmbedMode::Immediate`]
    /// without a provider, or a store error if vanished files cannot be
    /// listed. Per-file and per-block failures are reported, not returned;
    /// the affected files are flagged incomplete and retried on the next run.
    pub async fn run(&self, mode: EmbedMode) -> Result<IndexReport> {
        if mode == EmbedMode::Immediate && self.provider.is_none() {
            return Err(IndexError::MissingProvider);
        }

        let start = std::time::Instant::now();
        let mut report = IndexReport::default();
        let root = &self.config.root;

        let files = scan_files(root, &self.config.extensions);
        report.files_scanned = files.len();
        tracing::info!(root = %root.display(), files = files.len(), %mode, "indexing started");

        let pruned = prune_missing(&self.store, &files).await?;
        report.files_removed = pruned.files_removed;
        report.blocks_removed = pruned.blocks_removed;
        report.warnings.extend(pruned.warnings);

        let changes = detect_changes(&self.store, root, &files).await;
        report.files_new = changes.new;
        report.files_changed = changes.changed;
        report.files_resumed = changes.resumed;
        report.files_unchanged = changes.unchanged;
        report.files_skipped = changes.skipped;
        report.blocks_removed += changes.blocks_removed;
        report.warnings.extend(changes.warnings);

        let history = self.open_history().await;
        let history_source = history.as_ref().zip(self.config.history_commits).map(
            |(provider, commits)| HistorySource {
                provider,
                commits,
            },
        );
        let extracted =
            extract_blocks(&self.registry, root, &changes.to_process, history_source).await;
        report.files_skipped += extracted.files_skipped;
        report.blocks_extracted = extracted.blocks.len();
        report.warnings.extend(extracted.warnings);

        let deadline = Instant::now() + self.config.embed_timeout;
        let persisted = persist_blocks(
            &self.store,
            self.provider.as_ref(),
            &extracted.blocks,
            mode,
            deadline,
        )
        .await?;
        report.blocks_created = persisted.created;
        report.blocks_duplicate = persisted.duplicates;
        report.blocks_failed = persisted.failed;
        report.blocks_timed_out = persisted.timed_out;
        report.warnings.extend(persisted.warnings);

        let incomplete: BTreeSet<&str> = extracted
            .skipped_paths
            .iter()
            .chain(&persisted.incomplete_paths)
            .map(String::as_str)
            .collect();
        for rel_path in incomplete {
            match self.store.mark_file_incomplete(rel_path).await {
                Ok(_) => report.files_incomplete += 1,
                Err(e) => {
                    let message = format!("failed to flag {rel_path} for retry: {e}");
                    tracing::warn!("{message}");
                    report.warnings.push(message);
                }
            }
        }

        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            files_scanned = report.files_scanned,
            files_processed = changes.to_process.len(),
            blocks_created = report.blocks_created,
            files_incomplete = report.files_incomplete,
            warnings = report.warnings.len(),
            duration_ms = report.duration_ms,
            "indexing complete"
        );
        Ok(report)
    }

    /// Attach vectors to every stored block that has none.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::MissingProvider`] without a provider, or a store
    /// error if the pending set cannot be read.
    pub async fn embed_pending(&self) -> Result<BackfillReport> {
        let provider = self.provider.as_ref().ok_or(IndexError::MissingProvider)?;
        let deadline = Instant::now() + self.config.embed_timeout;
        backfill(&self.store, provider, self.config.batch_size, deadline).await
    }

    async fn open_history(&self) -> Option<GitHistory> {
        self.config.history_commits?;
        match GitHistory::open(&self.config.root).await {
            Ok(history) => Some(history),
            Err(e) => {
                tracing::info!("running without commit history: {e}");
                None
            }
        }
    }
}
