//! Canonical embedding text for a block.

use std::fmt::Write as _;

use crate::block::Block;

/// Text sent to the embedding provider for `block`: a metadata header
/// followed by the raw code. Absent names and an empty commit list omit
/// their lines.
#[must_use]
pub fn embedding_text(block: &Block) -> String {
    let mut text = String::with_capacity(block.raw_text.len() + 128);

    let _ = writeln!(text, "File: {}", block.display_path());
    if let Some(class) = &block.class_name {
        let _ = writeln!(text, "Class: {class}");
    }
    if let Some(method) = &block.method_name {
        let _ = writeln!(text, "Method/Function: {method}");
    }
    let _ = writeln!(text, "Lines: {}-{}", block.start_line, block.end_line);
    if !block.commit_messages.is_empty() {
        let _ = writeln!(text, "Recent commits: {}", block.commit_messages.join("; "));
    }

    text.push_str("\nCode:\n");
    text.push_str(&block.raw_text);
    text
}
