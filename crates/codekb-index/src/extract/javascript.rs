//! Regex/brace extractor for JavaScript and TypeScript sources.

use std::sync::LazyLock;

use regex::Regex;

use super::{ClassScope, Extractor, first_capture};
use crate::block::Block;
use crate::error::Result;
use crate::scan::{Body, extract_braced_body, indent_level};

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?(?:abstract\s+)?(?:class|interface)\s+(\w+)")
        .expect("class regex is valid")
});

static ARROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:export\s+)?(?:const|let|var)\s+(\w+)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|\w+)\s*(?::[^=]+)?=>",
    )
    .expect("arrow regex is valid")
});

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(\w+)\s*[<(]")
        .expect("function regex is valid")
});

static ASSIGNED_FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?(?:function\b|\()")
        .expect("assigned function regex is valid")
});

static OBJECT_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)\s*:\s*(?:async\s+)?(?:function\b|\()")
        .expect("object method regex is valid")
});

static CLASS_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:public|private|protected|static|async|readonly|override|get|set)\s+)*\*?(\w+)\s*(?:<[^>]*>)?\s*\([^)]*\)\s*(?::\s*[^{]+)?\{",
    )
    .expect("class method regex is valid")
});

/// Words that look like `name(...) {` but open control flow, not a method.
const NOT_METHODS: [&str; 10] = [
    "if", "for", "while", "switch", "catch", "return", "function", "with", "else", "do",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct JavaScriptExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Arrow,
    Braced,
}

impl Extractor for JavaScriptExtractor {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn can_handle(&self, extension: &str) -> bool {
        matches!(extension, "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx")
    }

    fn parse_source(&self, source: &str, file_path: &str) -> Result<Vec<Block>> {
        let lines: Vec<&str> = source.lines().collect();
        let mut scope = ClassScope::default();
        let mut blocks = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with("//")
                || trimmed.starts_with("/*")
                || trimmed.starts_with('*')
            {
                continue;
            }
            let indent = indent_level(line);

            if let Some(name) = first_capture(&CLASS_RE, trimmed) {
                scope.enter(name, indent);
                continue;
            }

            let Some((name, shape)) = match_function(trimmed, &scope, indent) else {
                continue;
            };
            let body = match shape {
                Shape::Arrow => extract_arrow_body(&lines, i),
                Shape::Braced => extract_braced_body(&lines, i),
            };
            let Some(body) = body else {
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

/// First matching declaration shape on a trimmed line. Each line yields at
/// most one construct.
fn match_function<'a>(
    trimmed: &'a str,
    scope: &ClassScope,
    indent: usize,
) -> Option<(&'a str, Shape)> {
    if let Some(name) = first_capture(&ARROW_RE, trimmed) {
        return Some((name, Shape::Arrow));
    }
    if let Some(name) = first_capture(&FUNCTION_RE, trimmed) {
        return Some((name, Shape::Braced));
    }
    if let Some(name) = first_capture(&ASSIGNED_FUNCTION_RE, trimmed)
        && !is_value_expression(trimmed)
    {
        return Some((name, Shape::Braced));
    }
    if let Some(name) = first_capture(&OBJECT_METHOD_RE, trimmed) {
        let shape = if trimmed.contains("=>") {
            Shape::Arrow
        } else {
            Shape::Braced
        };
        return Some((name, shape));
    }
    if scope.is_inside(indent)
        && let Some(name) = first_capture(&CLASS_METHOD_RE, trimmed)
        && !NOT_METHODS.contains(&name)
    {
        return Some((name, Shape::Braced));
    }
    None
}

/// `const x = (a + b) * 2` is a value, not a function, with or without the
/// trailing `;`. A parenthesized right-hand side without `=>` is a function
/// only while its parameter list continues on the next line.
fn is_value_expression(trimmed: &str) -> bool {
    if trimmed.contains("function") || trimmed.contains("=>") {
        return false;
    }
    !(trimmed.ends_with('(') || trimmed.ends_with(','))
}

/// Body of an arrow function declared at `start`.
///
/// A `{` on the header line means a block body. Otherwise the expression body
/// runs until a line ending in `;` (inclusive) or a blank line (exclusive).
fn extract_arrow_body(lines: &[&str], start: usize) -> Option<Body> {
    let header = lines.get(start)?;
    if header.contains('{') {
        return extract_braced_body(lines, start);
    }

    let mut end = start;
    if !header.trim_end().ends_with(';') {
        for (i, line) in lines.iter().enumerate().skip(start + 1) {
            if line.trim().is_empty() {
                break;
            }
            end = i;
            if line.trim_end().ends_with(';') {
                break;
            }
        }
    }

    Some(Body {
        end,
        text: lines[start..=end].join("\n"),
    })
}
