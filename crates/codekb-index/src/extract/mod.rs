//! Language block extractors.
//!
//! Each extractor turns the content of one file into an ordered list of
//! [`Block`]s. Extraction is approximate: lexical scanning for most
//! languages, a grammar walk for Go.

#[cfg(feature = "lang-go")]
pub mod go;
pub mod javascript;
pub mod php;
pub mod python;
pub mod text;

use std::borrow::Cow;
use std::path::Path;

use regex::Regex;

use crate::block::{Block, BlockKind};
use crate::error::Result;

/// Converts file content into blocks for one language family.
pub trait Extractor: Send + Sync {
    /// Registry key, e.g. `"python"`.
    fn name(&self) -> &'static str;

    /// Whether this extractor handles files with `extension`
    /// (lowercase, without the leading dot).
    fn can_handle(&self, extension: &str) -> bool;

    /// Extract blocks from already-loaded content.
    ///
    /// # Errors
    ///
    /// Returns an error only when the whole file cannot be processed; a
    /// construct that fails to extract is skipped.
    fn parse_source(&self, source: &str, file_path: &str) -> Result<Vec<Block>>;

    /// Read `path` and extract its blocks.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or
    /// [`parse_source`](Self::parse_source) fails.
    fn parse(&self, path: &Path) -> Result<Vec<Block>> {
        let bytes = std::fs::read(path)?;
        self.parse_source(&decode_source(&bytes), &path.to_string_lossy())
    }
}

/// File content as text, with invalid UTF-8 replaced by U+FFFD.
#[must_use]
pub fn decode_source(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Lowercase extension of `path` without the dot.
#[must_use]
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Normalize a user-supplied extension (`".PY"`, `"py"`) to `"py"`.
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Text of the first capture group of `re` in `text`.
pub(crate) fn first_capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Most recently seen class header of one file scan.
///
/// Classes do not nest: a new header replaces the previous one for the rest
/// of the file.
#[derive(Debug, Default)]
pub(crate) struct ClassScope {
    current: Option<(String, usize)>,
}

impl ClassScope {
    pub(crate) fn enter(&mut self, name: &str, indent: usize) {
        self.current = Some((name.to_string(), indent));
    }

    /// `Method` with the class name when a class was seen and `indent` is
    /// deeper than its header, otherwise `Function`.
    pub(crate) fn classify(&self, indent: usize) -> (BlockKind, Option<String>) {
        match &self.current {
            Some((name, class_indent)) if indent > *class_indent => {
                (BlockKind::Method, Some(name.clone()))
            }
            _ => (BlockKind::Function, None),
        }
    }

    pub(crate) fn is_inside(&self, indent: usize) -> bool {
        matches!(self.current, Some((_, class_indent)) if indent > class_indent)
    }
}
