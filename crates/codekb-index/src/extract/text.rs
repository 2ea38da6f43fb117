//! Token-bounded splitter for markdown, YAML, config, and plain text files.

use std::path::Path;

use super::{Extractor, extension_of};
use crate::block::{Block, BlockKind};
use crate::error::Result;
use crate::tokenizer::count_tokens;

pub const DEFAULT_TOKEN_LIMIT: usize = 1600;

const TEXT_EXTENSIONS: [&str; 7] = ["md", "markdown", "yml", "yaml", "conf", "config", "txt"];

#[derive(Debug, Clone, Copy)]
pub struct TextExtractor {
    token_limit: usize,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LIMIT)
    }
}

impl TextExtractor {
    #[must_use]
    pub fn new(token_limit: usize) -> Self {
        Self { token_limit }
    }
}

impl Extractor for TextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn can_handle(&self, extension: &str) -> bool {
        TEXT_EXTENSIONS.contains(&extension)
    }

    fn parse_source(&self, source: &str, file_path: &str) -> Result<Vec<Block>> {
        let kind = kind_for(file_path);
        let lines: Vec<&str> = source.lines().collect();

        Ok(split_by_tokens(&lines, self.token_limit)
            .into_iter()
            .map(|(start, end)| {
                Block::new(file_path, kind, start + 1, end + 1, lines[start..=end].join("\n"))
            })
            .collect())
    }
}

fn kind_for(file_path: &str) -> BlockKind {
    match extension_of(Path::new(file_path)).as_deref() {
        Some("md" | "markdown") => BlockKind::Markdown,
        Some("yml" | "yaml") => BlockKind::Yaml,
        Some("conf" | "config") => BlockKind::Config,
        _ => BlockKind::Text,
    }
}

/// Partition `lines` into consecutive 0-based inclusive ranges whose token
/// sums stay within `limit`. A single line above the limit forms its own range.
#[must_use]
pub fn split_by_tokens(lines: &[&str], limit: usize) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut pending_tokens = 0;

    for (i, line) in lines.iter().enumerate() {
        let tokens = count_tokens(line);
        if pending_tokens + tokens > limit && i > start {
            ranges.push((start, i - 1));
            start = i;
            pending_tokens = 0;
        }
        pending_tokens += tokens;
    }

    if start < lines.len() {
        ranges.push((start, lines.len() - 1));
    }
    ranges
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn small_file_is_one_block() {
        let blocks = TextExtractor::default()
            .parse_source("# Title\n\nSome text.\n", "README.md")
            .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Markdown);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 3));
        assert_eq!(blocks[0].raw_text, "# Title\n\nSome text.");
    }

    #[test]
    fn splits_when_budget_exceeded() {
        // 2 tokens per line, budget 4 => two lines per block
        let source = "a b\nc d\ne f\ng h\ni j\n";
        let blocks = TextExtractor::new(4).parse_source(source, "notes.txt").unwrap();
        let ranges: Vec<_> = blocks.iter().map(|b| (b.start_line, b.end_line)).collect();
        assert_eq!(ranges, vec![(1, 2), (3, 4), (5, 5)]);
        assert!(blocks.iter().all(|b| b.kind == BlockKind::Text));
    }

    #[test]
    fn latin1_file_is_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, b"caf\xe9 notes\nsecond line\n").unwrap();

        let blocks = TextExtractor::default().parse(&path).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 2));
        assert_eq!(blocks[0].raw_text, "caf\u{fffd} notes\nsecond line");
    }

    #[test]
    fn oversized_line_is_not_split() {
        let lines = ["one two three four five", "six"];
        assert_eq!(split_by_tokens(&lines, 2), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn empty_source_has_no_blocks() {
        assert!(split_by_tokens(&[], 10).is_empty());
        let blocks = TextExtractor::default().parse_source("", "a.yml").unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn kind_follows_extension() {
        assert_eq!(kind_for("a.yaml"), BlockKind::Yaml);
        assert_eq!(kind_for("a.YML"), BlockKind::Yaml);
        assert_eq!(kind_for("nginx.conf"), BlockKind::Config);
        assert_eq!(kind_for("app.config"), BlockKind::Config);
        assert_eq!(kind_for("docs/guide.md"), BlockKind::Markdown);
        assert_eq!(kind_for("LICENSE.txt"), BlockKind::Text);
    }

    proptest! {
        #[test]
        fn ranges_partition_lines(
            lines in proptest::collection::vec("[a-z ,.!]{0,30}", 0..40),
            limit in 1usize..20,
        ) {
            let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
            let ranges = split_by_tokens(&refs, limit);

            let mut next = 0;
            for &(start, end) in &ranges {
                prop_assert_eq!(start, next);
                prop_assert!(start <= end);
                let tokens: usize = refs[start..=end].iter().map(|l| count_tokens(l)).sum();
                prop_assert!(tokens <= limit || start == end);
                next = end + 1;
            }
            prop_assert_eq!(next, refs.len());
        }
    }
}
