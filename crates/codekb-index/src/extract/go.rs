//! Grammar-aware extractor for Go sources (tree-sitter).

use tree_sitter::{Node, Parser};

use super::Extractor;
use crate::block::{Block, BlockKind};
use crate::error::{IndexError, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct GoExtractor;

struct WalkCtx<'a> {
    source: &'a str,
    lines: Vec<&'a str>,
    file_path: &'a str,
}

impl Extractor for GoExtractor {
    fn name(&self) -> &'static str {
        "go"
    }

    fn can_handle(&self, extension: &str) -> bool {
        extension == "go"
    }

    fn parse_source(&self, source: &str, file_path: &str) -> Result<Vec<Block>> {
        let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| IndexError::Parse(format!("set_language failed: {e}")))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| IndexError::Parse(format!("parse failed for {file_path}")))?;

        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!(file = file_path, "Go source has syntax errors, extracting what parsed");
        }

        let ctx = WalkCtx {
            source,
            lines: source.lines().collect(),
            file_path,
        };
        let mut blocks = Vec::new();
        walk(&ctx, &root, &mut blocks);
        Ok(blocks)
    }
}

/// Visit every named node in document order, emitting declarations.
fn walk(ctx: &WalkCtx<'_>, node: &Node, out: &mut Vec<Block>) {
    match node.kind() {
        "function_declaration" => {
            if let Some(name) = field_text(ctx, node, "name")
                && let Some(block) = make_block(ctx, node, BlockKind::Function, None)
            {
                out.push(block.with_method(name));
            }
        }
        "method_declaration" => {
            let receiver = receiver_type(ctx, node);
            if let Some(name) = field_text(ctx, node, "name")
                && let Some(mut block) = make_block(ctx, node, BlockKind::Method, receiver.clone())
            {
                if let Some(receiver) = &receiver {
                    block.raw_text = format!("// Method of {receiver}\n{}", block.raw_text);
                }
                out.push(block.with_method(name));
            }
        }
        "type_spec" => {
            let is_struct = node
                .child_by_field_name("type")
                .is_some_and(|t| t.kind() == "struct_type");
            if is_struct
                && let Some(name) = field_text(ctx, node, "name")
                && let Some(mut block) =
                    make_block(ctx, node, BlockKind::Struct, Some(name.to_string()))
            {
                block.raw_text = format!("// Type definition\n{}", block.raw_text);
                out.push(block);
            }
        }
        _ => {}
    }

    let child_count = u32::try_from(node.named_child_count()).unwrap_or(u32::MAX);
    for i in 0..child_count {
        let Some(child) = node.named_child(i) else {
            continue;
        };
        walk(ctx, &child, out);
    }
}

fn field_text<'a>(ctx: &WalkCtx<'a>, node: &Node, field: &str) -> Option<&'a str> {
    let source = ctx.source;
    node.child_by_field_name(field)
        .map(|n| &source[n.byte_range()])
}

/// Whole source lines covered by `node`.
fn make_block(
    ctx: &WalkCtx<'_>,
    node: &Node,
    kind: BlockKind,
    class_name: Option<String>,
) -> Option<Block> {
    let start = node.start_position().row;
    let end = node.end_position().row.min(ctx.lines.len().checked_sub(1)?);
    if start > end {
        return None;
    }
    let text = ctx.lines[start..=end].join("\n");
    Some(Block::new(ctx.file_path, kind, start + 1, end + 1, text).with_class(class_name))
}

/// Receiver type name of a method: `T` for both `(t T)` and `(t *T)`.
fn receiver_type(ctx: &WalkCtx<'_>, method: &Node) -> Option<String> {
    let params = method.child_by_field_name("receiver")?;
    let child_count = u32::try_from(params.named_child_count()).unwrap_or(u32::MAX);
    let decl = (0..child_count)
        .filter_map(|i| params.named_child(i))
        .find(|n| n.kind() == "parameter_declaration")?;

    let mut ty = decl.child_by_field_name("type")?;
    if ty.kind() == "pointer_type" {
        ty = ty.named_child(0)?;
    }
    if ty.kind() == "generic_type" {
        ty = ty.child_by_field_name("type")?;
    }
    (ty.kind() == "type_identifier").then(|| ctx.source[ty.byte_range()].to_string())
}
