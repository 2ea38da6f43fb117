//! Per-file extraction driven by the parser registry.

use std::path::Path;

use crate::block::Block;
use crate::extract::decode_source;
use crate::history::HistoryProvider;
use crate::registry::ParserRegistry;

/// Where commit messages for extracted blocks come from.
pub struct HistorySource<'a, H> {
    pub provider: &'a H,
    pub commits: usize,
}

impl<H> Clone for HistorySource<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for HistorySource<'_, H> {}

/// Outcome of [`extract_blocks`].
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub blocks: Vec<Block>,
    pub files_parsed: usize,
    pub files_skipped: usize,
    /// Relative paths of the skipped files, in input order.
    pub skipped_paths: Vec<String>,
    pub warnings: Vec<String>,
}

impl ExtractReport {
    fn skip(&mut self, rel_path: &str, message: String) {
        tracing::warn!("{message}");
        self.files_skipped += 1;
        self.skipped_paths.push(rel_path.to_string());
        self.warnings.push(message);
    }
}

/// Extract blocks from `files` (relative to `root`) in order.
///
/// Files without a registered extractor, or that cannot be read or parsed,
/// are skipped with a warning. Content that is not valid UTF-8 is decoded
/// lossily. Every block gets its file's relative path and, when `history` is
/// given, that file's recent commit messages.
pub async fn extract_blocks<H: HistoryProvider>(
    registry: &ParserRegistry,
    root: &Path,
    files: &[String],
    history: Option<HistorySource<'_, H>>,
) -> ExtractReport {
    let mut report = ExtractReport::default();

    for rel_path in files {
        let path = root.join(rel_path);
        let Some(extractor) = registry.resolve_path(&path) else {
            report.skip(rel_path, format!("no extractor registered for {rel_path}"));
            continue;
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                report.skip(rel_path, format!("failed to read {rel_path}: {e}"));
                continue;
            }
        };
        let source = decode_source(&bytes);
        let mut blocks = match extractor.parse_source(&source, &path.to_string_lossy()) {
            Ok(blocks) => blocks,
            Err(e) => {
                report.skip(rel_path, format!("failed to parse {rel_path}: {e}"));
                continue;
            }
        };

        let commits = match history {
            Some(h) => match h.provider.last_commit_messages(rel_path, h.commits).await {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::debug!(file = %rel_path, "no commit history: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        for block in &mut blocks {
            block.relative_path.clone_from(rel_path);
            block.commit_messages.clone_from(&commits);
        }

        tracing::debug!(
            file = %rel_path,
            extractor = extractor.name(),
            blocks = blocks.len(),
            "extracted"
        );
        report.files_parsed += 1;
        report.blocks.extend(blocks);
    }

    tracing::info!(
        files = report.files_parsed,
        skipped = report.files_skipped,
        blocks = report.blocks.len(),
        "extraction complete"
    );
    report
}
