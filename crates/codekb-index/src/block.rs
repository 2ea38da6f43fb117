//! The unit of extraction: a contiguous, meaningful span of a source file.

use std::fmt;

use codekb_store::BlockInsert;

/// Kind of span a block covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Function,
    Method,
    Struct,
    Markdown,
    Yaml,
    Config,
    Text,
}

impl BlockKind {
    /// Identifier persisted in the `block_type` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Struct => "struct",
            Self::Markdown => "markdown",
            Self::Yaml => "yaml",
            Self::Config => "config",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span of a source file with 1-based inclusive line numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub file_path: String,
    /// Display path relative to the scanned root. Empty until the orchestrator sets it.
    pub relative_path: String,
    pub kind: BlockKind,
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub start_line: usize,
    pub end_line: usize,
    pub raw_text: String,
    pub commit_messages: Vec<String>,
}

impl Block {
    #[must_use]
    pub fn new(
        file_path: &str,
        kind: BlockKind,
        start_line: usize,
        end_line: usize,
        raw_text: String,
    ) -> Self {
        Self {
            file_path: file_path.to_string(),
            relative_path: String::new(),
            kind,
            class_name: None,
            method_name: None,
            start_line,
            end_line,
            raw_text,
            commit_messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_class(mut self, class_name: Option<String>) -> Self {
        self.class_name = class_name;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method_name: impl Into<String>) -> Self {
        self.method_name = Some(method_name.into());
        self
    }

    /// Relative path for display, falling back to the file path.
    #[must_use]
    pub fn display_path(&self) -> &str {
        if self.relative_path.is_empty() {
            &self.file_path
        } else {
            &self.relative_path
        }
    }

    /// Borrowed row for the store.
    #[must_use]
    pub fn as_insert<'a>(&'a self, embedding_text: &'a str) -> BlockInsert<'a> {
        BlockInsert {
            file_path: &self.file_path,
            relative_path: self.display_path(),
            block_type: self.kind.as_str(),
            class_name: self.class_name.as_deref(),
            method_name: self.method_name.as_deref(),
            start_line: self.start_line,
            end_line: self.end_line,
            commit_messages: &self.commit_messages,
            raw_text: &self.raw_text,
            embedding_text,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Block {}", self.kind)?;
        if let Some(class) = &self.class_name {
            write!(f, " {class}")?;
        }
        if let Some(method) = &self.method_name {
            write!(f, " {method}")?;
        }
        write!(
            f,
            " {}:{}-{}>",
            self.display_path(),
            self.start_line,
            self.end_line
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method_block() -> Block {
        Block::new("/repo/app.py", BlockKind::Method, 2, 3, "def bar(self):".into())
            .with_class(Some("Foo".into()))
            .with_method("bar")
    }

    #[test]
    fn display_path_defaults_to_file_path() {
        let mut block = method_block();
        assert_eq!(block.display_path(), "/repo/app.py");
        block.relative_path = "app.py".into();
        assert_eq!(block.display_path(), "app.py");
    }

    #[test]
    fn display_includes_names_and_range() {
        assert_eq!(
            method_block().to_string(),
            "<Block method Foo bar /repo/app.py:2-3>"
        );
    }

    #[test]
    fn display_omits_absent_names() {
        let block = Block::new("notes.md", BlockKind::Markdown, 1, 4, String::new());
        assert_eq!(block.to_string(), "<Block markdown notes.md:1-4>");
    }

    #[test]
    fn as_insert_maps_fields() {
        let block = method_block();
        let insert = block.as_insert("text");
        assert_eq!(insert.file_path, "/repo/app.py");
        assert_eq!(insert.relative_path, "/repo/app.py");
        assert_eq!(insert.block_type, "method");
        assert_eq!(insert.class_name, Some("Foo"));
        assert_eq!(insert.method_name, Some("bar"));
        assert_eq!(insert.start_line, 2);
        assert_eq!(insert.end_line, 3);
        assert_eq!(insert.embedding_text, "text");
    }
}
