use super::BlockStore;
use crate::error::StoreError;

/// Parameters for inserting a block row.
#[derive(Debug, Clone, Copy)]
pub struct BlockInsert<'a> {
    pub file_path: &'a str,
    pub relative_path: &'a str,
    pub block_type: &'a str,
    pub class_name: Option<&'a str>,
    pub method_name: Option<&'a str>,
    pub start_line: usize,
    pub end_line: usize,
    pub commit_messages: &'a [String],
    pub raw_text: &'a str,
    pub embedding_text: &'a str,
}

/// A persisted block with its (possibly still empty) embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlock {
    pub id: i64,
    pub file_path: String,
    pub relative_path: String,
    pub block_type: String,
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub start_line: usize,
    pub end_line: usize,
    pub commit_messages: Vec<String>,
    pub raw_text: String,
    pub embedding_text: String,
    pub embedding: Vec<f32>,
    pub created_at: String,
}

impl StoredBlock {
    #[must_use]
    pub fn has_embedding(&self) -> bool {
        !self.embedding.is_empty()
    }
}

#[derive(sqlx::FromRow)]
struct BlockRow {
    id: i64,
    file_path: String,
    relative_path: String,
    block_type: String,
    class_name: Option<String>,
    method_name: Option<String>,
    start_line: i64,
    end_line: i64,
    commit_messages: Option<String>,
    raw_text: String,
    embedding_text: String,
    embedding: String,
    created_at: String,
}

impl TryFrom<BlockRow> for StoredBlock {
    type Error = StoreError;

    fn try_from(row: BlockRow) -> Result<Self, Self::Error> {
        let commit_messages = match row.commit_messages.as_deref() {
            None | Some("") => Vec::new(),
            Some(json) => serde_json::from_str(json)?,
        };
        Ok(Self {
            id: row.id,
            file_path: row.file_path,
            relative_path: row.relative_path,
            block_type: row.block_type,
            class_name: row.class_name,
            method_name: row.method_name,
            start_line: usize::try_from(row.start_line)?,
            end_line: usize::try_from(row.end_line)?,
            commit_messages,
            raw_text: row.raw_text,
            embedding_text: row.embedding_text,
            embedding: decode_embedding(&row.embedding)?,
            created_at: row.created_at,
        })
    }
}

const SELECT_BLOCKS: &str = "SELECT id, file_path, relative_path, block_type, class_name, \
     method_name, start_line, end_line, commit_messages, raw_text, embedding_text, embedding, \
     CAST(created_at AS TEXT) AS created_at FROM blocks";

pub(crate) fn encode_embedding(vector: &[f32]) -> Result<String, StoreError> {
    if vector.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_json::to_string(vector)?)
}

fn decode_embedding(text: &str) -> Result<Vec<f32>, StoreError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(text)?)
}

impl BlockStore {
    /// Check whether a block with this identity tuple is already stored.
    ///
    /// Absent class and method names compare equal to empty strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn block_exists(&self, block: &BlockInsert<'_>) -> Result<bool, StoreError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM blocks \
             WHERE file_path = ? AND block_type = ? \
             AND IFNULL(class_name, '') = ? AND IFNULL(method_name, '') = ? \
             AND start_line = ? AND end_line = ?",
        )
        .bind(block.file_path)
        .bind(block.block_type)
        .bind(block.class_name.unwrap_or(""))
        .bind(block.method_name.unwrap_or(""))
        .bind(i64::try_from(block.start_line)?)
        .bind(i64::try_from(block.end_line)?)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 > 0)
    }

    /// Insert a block. `None` or an empty vector stores the row as pending.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the insert fails, including a
    /// violation of the identity uniqueness constraint.
    pub async fn insert_block(
        &self,
        block: &BlockInsert<'_>,
        embedding: Option<&[f32]>,
    ) -> Result<i64, StoreError> {
        let embedding = encode_embedding(embedding.unwrap_or_default())?;
        let commits = if block.commit_messages.is_empty() {
            None
        } else {
            Some(serde_json::to_string(block.commit_messages)?)
        };

        let row: (i64,) = sqlx::query_as(
            "INSERT INTO blocks \
             (embedding, file_path, relative_path, block_type, class_name, method_name, \
              start_line, end_line, commit_messages, raw_text, embedding_text) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(embedding)
        .bind(block.file_path)
        .bind(block.relative_path)
        .bind(block.block_type)
        .bind(block.class_name)
        .bind(block.method_name)
        .bind(i64::try_from(block.start_line)?)
        .bind(i64::try_from(block.end_line)?)
        .bind(commits)
        .bind(block.raw_text)
        .bind(block.embedding_text)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    /// Delete every block recorded under `relative_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_file_blocks(&self, relative_path: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM blocks WHERE relative_path = ?")
            .bind(relative_path)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Blocks whose embedding has not been generated yet, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn pending_blocks(&self) -> Result<Vec<StoredBlock>, StoreError> {
        let rows: Vec<BlockRow> =
            sqlx::query_as(&format!("{SELECT_BLOCKS} WHERE embedding = '' ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(StoredBlock::try_from).collect()
    }

    /// Every stored block ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn all_blocks(&self) -> Result<Vec<StoredBlock>, StoreError> {
        let rows: Vec<BlockRow> = sqlx::query_as(&format!("{SELECT_BLOCKS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(StoredBlock::try_from).collect()
    }

    /// Set the embedding of an existing row, leaving every other column untouched.
    ///
    /// Returns `false` when no row has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the update fails.
    pub async fn update_embedding(&self, id: i64, vector: &[f32]) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE blocks SET embedding = ? WHERE id = ?")
            .bind(encode_embedding(vector)?)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
