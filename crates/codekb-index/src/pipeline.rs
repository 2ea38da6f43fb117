//! Embedding generation and persistence.
//!
//! Blocks are handled one at a time. In [`EmbedMode::Immediate`] each new
//! block is embedded and stored with its vector in one row; in
//! [`EmbedMode::Deferred`] blocks are stored without a vector and
//! [`backfill`] attaches vectors later. A block whose identity is already
//! stored is never embedded again.

use std::collections::BTreeSet;
use std::fmt;

use codekb_llm::EmbeddingProvider;
use codekb_store::{BlockStore, StoredBlock};
use tokio::time::{Instant, timeout_at};

use crate::block::Block;
use crate::context::embedding_text;
use crate::error::{IndexError, Result};

/// How [`persist_blocks`] treats vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    /// Embed, then persist block and vector together.
    Immediate,
    /// Persist blocks with an empty vector for a later [`backfill`].
    Deferred,
}

impl fmt::Display for EmbedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => f.write_str("immediate"),
            Self::Deferred => f.write_str("deferred"),
        }
    }
}

/// Per-block outcomes of [`persist_blocks`].
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub created: usize,
    pub duplicates: usize,
    pub failed: usize,
    /// Blocks abandoned because the deadline passed.
    pub timed_out: usize,
    /// Relative paths of files with at least one failed or abandoned block.
    pub incomplete_paths: BTreeSet<String>,
    pub warnings: Vec<String>,
}

impl PipelineReport {
    fn fail(&mut self, block: &Block, message: String) {
        warn(&mut self.warnings, message);
        self.failed += 1;
        self.incomplete_paths.insert(block.relative_path.clone());
    }
}

/// Per-block outcomes of [`backfill`].
#[derive(Debug, Default)]
pub struct BackfillReport {
    pub pending: usize,
    pub embedded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub warnings: Vec<String>,
}

fn warn(warnings: &mut Vec<String>, message: String) {
    tracing::warn!("{message}");
    warnings.push(message);
}

/// Persist `blocks` in order, skipping identities that are already stored.
///
/// Embedding and insert failures skip the block with a warning. Once
/// `deadline` passes the remaining blocks are abandoned; rows written
/// before that stay valid. Files owning a skipped or abandoned block are
/// listed in [`PipelineReport::incomplete_paths`].
///
/// # Errors
///
/// Returns [`IndexError::MissingProvider`] when `mode` is
/// [`EmbedMode::Immediate`] and no provider is given.
pub async fn persist_blocks<P: EmbeddingProvider>(
    store: &BlockStore,
    provider: Option<&P>,
    blocks: &[Block],
    mode: EmbedMode,
    deadline: Instant,
) -> Result<PipelineReport> {
    let provider = match (mode, provider) {
        (EmbedMode::Immediate, None) => return Err(IndexError::MissingProvider),
        (EmbedMode::Immediate, Some(p)) => Some(p),
        (EmbedMode::Deferred, _) => None,
    };

    let mut report = PipelineReport::default();
    tracing::info!(blocks = blocks.len(), %mode, "persisting blocks");

    for (i, block) in blocks.iter().enumerate() {
        let text = embedding_text(block);
        let row = block.as_insert(&text);

        match store.block_exists(&row).await {
            Ok(true) => {
                tracing::debug!(%block, "already stored");
                report.duplicates += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                report.fail(block, format!("failed to check {block} against the store: {e}"));
                continue;
            }
        }

        let vector = match provider {
            None => None,
            Some(provider) => match timeout_at(deadline, provider.embed(&text)).await {
                Ok(Ok(vector)) if !vector.is_empty() => Some(vector),
                Ok(Ok(_)) => {
                    report.fail(block, format!("provider returned an empty vector for {block}"));
                    continue;
                }
                Ok(Err(e)) => {
                    report.fail(block, format!("failed to embed {block}: {e}"));
                    continue;
                }
                Err(_) => {
                    report.timed_out = blocks.len() - i;
                    report
                        .incomplete_paths
                        .extend(blocks[i..].iter().map(|b| b.relative_path.clone()));
                    warn(
                        &mut report.warnings,
                        format!(
                            "embedding deadline passed, abandoning {} blocks",
                            report.timed_out
                        ),
                    );
                    break;
                }
            },
        };

        match store.insert_block(&row, vector.as_deref()).await {
            Ok(id) => {
                tracing::debug!(id, %block, "stored");
                report.created += 1;
            }
            Err(e) => report.fail(block, format!("failed to store {block}: {e}")),
        }
    }

    tracing::info!(
        created = report.created,
        duplicates = report.duplicates,
        failed = report.failed,
        timed_out = report.timed_out,
        "blocks persisted"
    );
    Ok(report)
}

/// Generate vectors for every stored block that has none yet.
///
/// Only the vector column is updated. With `batch_size > 1` texts are sent
/// through [`EmbeddingProvider::embed_batch`] and a failed batch skips all
/// of its blocks.
///
/// # Errors
///
/// Returns an error only if the pending set cannot be read.
pub async fn backfill<P: EmbeddingProvider>(
    store: &BlockStore,
    provider: &P,
    batch_size: usize,
    deadline: Instant,
) -> Result<BackfillReport> {
    let pending = store.pending_blocks().await?;
    let mut report = BackfillReport {
        pending: pending.len(),
        ..BackfillReport::default()
    };

    if pending.is_empty() {
        tracing::info!("no blocks waiting for embeddings");
        return Ok(report);
    }
    tracing::info!(pending = pending.len(), batch_size, "backfilling embeddings");

    let batch_size = batch_size.max(1);
    let mut done = 0;
    for batch in pending.chunks(batch_size) {
        let vectors = if batch_size == 1 {
            timeout_at(deadline, provider.embed(&batch[0].embedding_text))
                .await
                .map(|r| r.map(|v| vec![v]))
        } else {
            let texts: Vec<String> = batch.iter().map(|b| b.embedding_text.clone()).collect();
            timeout_at(deadline, provider.embed_batch(&texts)).await
        };

        match vectors {
            Ok(Ok(vectors)) => store_vectors(store, batch, &vectors, &mut report).await,
            Ok(Err(e)) => {
                report.failed += batch.len();
                warn(
                    &mut report.warnings,
                    format!("failed to embed {}: {e}", describe(batch)),
                );
            }
            Err(_) => {
                report.timed_out = pending.len() - done;
                warn(
                    &mut report.warnings,
                    format!(
                        "embedding deadline passed, {} blocks left pending",
                        report.timed_out
                    ),
                );
                break;
            }
        }
        done += batch.len();
    }

    tracing::info!(
        embedded = report.embedded,
        failed = report.failed,
        timed_out = report.timed_out,
        "backfill complete"
    );
    Ok(report)
}

async fn store_vectors(
    store: &BlockStore,
    batch: &[StoredBlock],
    vectors: &[Vec<f32>],
    report: &mut BackfillReport,
) {
    for (block, vector) in batch.iter().zip(vectors) {
        if vector.is_empty() {
            report.failed += 1;
            warn(
                &mut report.warnings,
                format!("provider returned an empty vector for block {}", block.id),
            );
            continue;
        }
        match store.update_embedding(block.id, vector).await {
            Ok(true) => report.embedded += 1,
            Ok(false) => {
                report.failed += 1;
                warn(
                    &mut report.warnings,
                    format!("block {} vanished before its vector was stored", block.id),
                );
            }
            Err(e) => {
                report.failed += 1;
                warn(
                    &mut report.warnings,
                    format!("failed to store vector for block {}: {e}", block.id),
                );
            }
        }
    }
}

fn describe(batch: &[StoredBlock]) -> String {
    match batch {
        [single] => format!(
            "block {} ({}:{}-{})",
            single.id, single.relative_path, single.start_line, single.end_line
        ),
        _ => format!("batch of {} blocks", batch.len()),
    }
}
