use std::borrow::Cow;
use std::io::Write;

use super::BlockStore;
use super::blocks::encode_embedding;
use crate::error::StoreError;

const CSV_HEADER: [&str; 13] = [
    "id",
    "file_path",
    "relative_path",
    "block_type",
    "class_name",
    "method_name",
    "start_line",
    "end_line",
    "commit_messages",
    "raw_text",
    "embedding_text",
    "embedding",
    "created_at",
];

impl BlockStore {
    /// Write every stored block as CSV (header row first) and return the
    /// number of data rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the blocks or writing to `out` fails.
    pub async fn export_csv<W: Write>(&self, out: &mut W) -> Result<usize, StoreError> {
        let blocks = self.all_blocks().await?;

        write_record(out, &CSV_HEADER)?;
        for block in &blocks {
            let commits = if block.commit_messages.is_empty() {
                String::new()
            } else {
                serde_json::to_string(&block.commit_messages)?
            };
            let id = block.id.to_string();
            let start = block.start_line.to_string();
            let end = block.end_line.to_string();
            let embedding = encode_embedding(&block.embedding)?;
            write_record(
                out,
                &[
                    &id,
                    &block.file_path,
                    &block.relative_path,
                    &block.block_type,
                    block.class_name.as_deref().unwrap_or(""),
                    block.method_name.as_deref().unwrap_or(""),
                    &start,
                    &end,
                    &commits,
                    &block.raw_text,
                    &block.embedding_text,
                    &embedding,
                    &block.created_at,
                ],
            )?;
        }
        out.flush()?;

        tracing::info!(rows = blocks.len(), "exported blocks to CSV");
        Ok(blocks.len())
    }
}

fn write_record<W: Write>(out: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    out.write_all(line.as_bytes())?;
    out.write_all(b"\r\n")
}

/// Quote a field when it contains a delimiter, quote, or line break.
fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
