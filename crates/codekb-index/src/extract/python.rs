//! Indentation-based extractor for Python sources.

use super::{ClassScope, Extractor};
use crate::block::Block;
use crate::error::Result;
use crate::scan::{extract_indented_body, indent_level};

#[derive(Debug, Default, Clone, Copy)]
pub struct PythonExtractor;

impl Extractor for PythonExtractor {
    fn name(&self) -> &'static str {
        "python"
    }

    fn can_handle(&self, extension: &str) -> bool {
        extension == "py"
    }

    fn parse_source(&self, source: &str, file_path: &str) -> Result<Vec<Block>> {
        let lines: Vec<&str> = source.lines().collect();
        let mut scope = ClassScope::default();
        let mut blocks = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || !trimmed.contains(':') {
                continue;
            }
            let indent = indent_level(line);

            if let Some(rest) = trimmed.strip_prefix("class ") {
                let name = header_name(rest);
                if !name.is_empty() {
                    scope.enter(name, indent);
                }
                continue;
            }

            let declaration = trimmed.strip_prefix("async ").map_or(trimmed, str::trim_start);
            let Some(rest) = declaration.strip_prefix("def ") else {
                continue;
            };
            let name = header_name(rest);
            if name.is_empty() {
                continue;
            }
            let Some(body) = extract_indented_body(&lines, i, indent) else {
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

/// Identifier after `class`/`def`, up to the first `(` or `:`.
fn header_name(rest: &str) -> &str {
    let end = rest.find(['(', ':']).unwrap_or(rest.len());
    rest[..end].trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;

    fn parse(source: &str) -> Vec<Block> {
        PythonExtractor.parse_source(source, "app.py").unwrap()
    }

    #[test]
    fn method_in_class() {
        let blocks = parse("class Foo:\n    def bar(self):\n        return 1\n");
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!(b.kind, BlockKind::Method);
        assert_eq!(b.method_name.as_deref(), Some("bar"));
        assert_eq!(b.class_name.as_deref(), Some("Foo"));
        assert_eq!((b.start_line, b.end_line), (2, 3));
        assert_eq!(b.raw_text, "    def bar(self):\n        return 1");
    }

    #[test]
    fn top_level_function() {
        let blocks = parse("import os\n\ndef main():\n    print(os.getcwd())\n\nmain()\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Function);
        assert_eq!(blocks[0].class_name, None);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (3, 4));
    }

    #[test]
    fn function_after_class_at_same_indent() {
        let source = "\
class Foo(Base):
    def a(self):
        pass

def helper():
    return 2
";
        let blocks = parse(source);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Method);
        assert_eq!(blocks[0].class_name.as_deref(), Some("Foo"));
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (2, 3));
        assert_eq!(blocks[1].kind, BlockKind::Function);
        assert_eq!(blocks[1].method_name.as_deref(), Some("helper"));
        assert_eq!((blocks[1].start_line, blocks[1].end_line), (5, 6));
    }

    #[test]
    fn new_class_replaces_context() {
        let source = "\
class A:
    def one(self):
        pass
class B:
    def two(self):
        pass
";
        let blocks = parse(source);
        assert_eq!(blocks[0].class_name.as_deref(), Some("A"));
        assert_eq!(blocks[1].class_name.as_deref(), Some("B"));
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let source = "# def fake():\n\ndef real():\n    # comment: inside\n    return 1\n";
        let blocks = parse(source);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].method_name.as_deref(), Some("real"));
        assert_eq!(blocks[0].end_line, 5);
    }

    #[test]
    fn nested_function_emitted_separately() {
        let source = "def outer():\n    def inner():\n        return 1\n    return inner\n";
        let blocks = parse(source);
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 4));
        assert_eq!((blocks[1].start_line, blocks[1].end_line), (2, 3));
        assert_eq!(blocks[1].kind, BlockKind::Function);
    }

    #[test]
    fn async_def_is_a_function() {
        let blocks = parse("async def fetch(url):\n    return await get(url)\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].method_name.as_deref(), Some("fetch"));
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 2));
    }

    #[test]
    fn empty_source_yields_nothing() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn handles_only_py() {
        assert!(PythonExtractor.can_handle("py"));
        assert!(!PythonExtractor.can_handle("js"));
    }
}
