//! Regex/brace extractor for PHP sources.

use std::sync::LazyLock;

use regex::Regex;

use super::{ClassScope, Extractor, first_capture};
use crate::block::Block;
use crate::error::Result;
use crate::scan::{extract_braced_body, indent_level};

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:abstract|final|readonly)\s+)*(?:class|interface|trait|enum)\s+(\w+)")
        .expect("class regex is valid")
});

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:public|private|protected|static|abstract|final)\s+)*function\s+&?\s*(\w+)\s*\(",
    )
    .expect("function regex is valid")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct PhpExtractor;

impl Extractor for PhpExtractor {
    fn name(&self) -> &'static str {
        "php"
    }

    fn can_handle(&self, extension: &str) -> bool {
        extension == "php"
    }

    fn parse_source(&self, source: &str, file_path: &str) -> Result<Vec<Block>> {
        let lines: Vec<&str> = source.lines().collect();
        let mut scope = ClassScope::default();
        let mut blocks = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with("//")
                || trimmed.starts_with('#')
                || trimmed.starts_with("/*")
                || trimmed.starts_with('*')
                || trimmed.starts_with("namespace ")
            {
                continue;
            }
            let indent = indent_level(line);

            if let Some(name) = first_capture(&CLASS_RE, trimmed) {
                scope.enter(name, indent);
                continue;
            }

            let Some(name) = first_capture(&FUNCTION_RE, trimmed) else {
                continue;
            };
            let Some(body) = extract_braced_body(&lines, i) else {
                continue;
            };

            let (kind, class_name) = scope.classify(indent);
            blocks.push(
                Block::new(file_path, kind, i + 1, body.end + 1, body.text)
                    .with_class(class_name)
                    .with_method(name),
            );
        }

        Ok(blocks)
    }
}
