//! Lexical body scanning shared by the indentation and brace extractors.
//!
//! Braces and colons inside string literals or comments are counted like any
//! other character, so unusual sources can end a body early or late.

/// A body found by one of the scanners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    /// 0-based index of the last line included.
    pub end: usize,
    /// Lines `start..=end` joined with `\n`.
    pub text: String,
}

impl Body {
    fn from_range(lines: &[&str], start: usize, end: usize) -> Self {
        Self {
            end,
            text: lines[start..=end].join("\n"),
        }
    }
}

/// Number of leading space or tab characters. Tabs are not expanded.
#[must_use]
pub fn indent_level(line: &str) -> usize {
    line.chars().take_while(|c| matches!(c, ' ' | '\t')).count()
}

/// Body starting at `start` and ending where the running `{` minus `}` count
/// returns to zero after having gone positive.
///
/// A line ending in `;` before any brace opened ends the body there (a
/// declaration without a body). Running out of lines ends it at the last line.
/// Returns `None` if `start` is out of range.
#[must_use]
pub fn extract_braced_body(lines: &[&str], start: usize) -> Option<Body> {
    if start >= lines.len() {
        return None;
    }

    let mut depth: i64 = 0;
    let mut opened = false;
    let mut end = start;

    for (i, line) in lines.iter().enumerate().skip(start) {
        end = i;
        for c in line.chars() {
            match c {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        if opened && depth <= 0 {
            break;
        }
        if !opened && line.trim_end().ends_with(';') {
            break;
        }
    }

    Some(Body::from_range(lines, start, end))
}

/// Body of an indentation-delimited construct whose header is at `start`.
///
/// Following lines belong to the body until a non-blank line indented at most
/// `base_indent`. Blank lines inside the body are kept; trailing blank lines
/// are not part of it.
#[must_use]
pub fn extract_indented_body(lines: &[&str], start: usize, base_indent: usize) -> Option<Body> {
    if start >= lines.len() {
        return None;
    }

    let mut end = start;
    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        if line.trim().is_empty() {
            continue;
        }
        if indent_level(line) <= base_indent {
            break;
        }
        end = i;
    }

    Some(Body::from_range(lines, start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_counts_spaces_and_tabs() {
        assert_eq!(indent_level("def f():"), 0);
        assert_eq!(indent_level("    x = 1"), 4);
        assert_eq!(indent_level("\t\tx"), 2);
        assert_eq!(indent_level(" \t x"), 3);
        assert_eq!(indent_level(""), 0);
    }

    #[test]
    fn braced_body_multi_line() {
        let lines = ["function add(a, b) {", "  return a + b;", "}", "after();"];
        let body = extract_braced_body(&lines, 0).unwrap();
        assert_eq!(body.end, 2);
        assert_eq!(body.text, "function add(a, b) {\n  return a + b;\n}");
    }

    #[test]
    fn braced_body_nested() {
        let lines = ["fn() {", "  if (x) {", "    y();", "  }", "}", "z"];
        assert_eq!(extract_braced_body(&lines, 0).unwrap().end, 4);
    }

    #[test]
    fn braced_body_single_line() {
        let lines = ["function f() { return 1; }", "next"];
        assert_eq!(extract_braced_body(&lines, 0).unwrap().end, 0);
    }

    #[test]
    fn braced_body_brace_on_next_line() {
        let lines = ["function f(a,", "           b)", "{", "  return a;", "}"];
        let body = extract_braced_body(&lines, 0).unwrap();
        assert_eq!(body.end, 4);
        assert!(body.text.starts_with("function f(a,"));
    }

    #[test]
    fn braced_body_declaration_without_body() {
        let lines = ["abstract function f();", "function g() {", "}"];
        assert_eq!(extract_braced_body(&lines, 0).unwrap().end, 0);
    }

    #[test]
    fn braced_body_unterminated_runs_to_end() {
        let lines = ["function f() {", "  x();"];
        assert_eq!(extract_braced_body(&lines, 0).unwrap().end, 1);
    }

    #[test]
    fn braced_body_out_of_range() {
        assert!(extract_braced_body(&["x"], 1).is_none());
    }

    #[test]
    fn indented_body_stops_at_dedent() {
        let lines = ["def f():", "    a = 1", "", "    return a", "def g():"];
        let body = extract_indented_body(&lines, 0, 0).unwrap();
        assert_eq!(body.end, 3);
        assert_eq!(body.text, "def f():\n    a = 1\n\n    return a");
    }

    #[test]
    fn indented_body_drops_trailing_blank_lines() {
        let lines = ["def f():", "    pass", "", ""];
        assert_eq!(extract_indented_body(&lines, 0, 0).unwrap().end, 1);
    }

    #[test]
    fn indented_body_header_only() {
        let lines = ["def f(): pass", "x = 1"];
        let body = extract_indented_body(&lines, 0, 0).unwrap();
        assert_eq!(body.end, 0);
        assert_eq!(body.text, "def f(): pass");
    }
}
