use super::BlockStore;
use crate::error::StoreError;

/// Recorded state of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub hash: String,
    /// `false` when some of the file's blocks were not persisted.
    pub complete: bool,
}

impl BlockStore {
    /// Stored content hash for `file_path`, if the file has been seen before.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn file_hash(&self, file_path: &str) -> Result<Option<String>, StoreError> {
        Ok(self.fingerprint(file_path).await?.map(|fp| fp.hash))
    }

    /// Stored hash and completeness flag for `file_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn fingerprint(&self, file_path: &str) -> Result<Option<Fingerprint>, StoreError> {
        let row: Option<(String, bool)> =
            sqlx::query_as("SELECT file_hash, complete FROM file_hashes WHERE file_path = ?")
                .bind(file_path)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(hash, complete)| Fingerprint { hash, complete }))
    }

    /// Record (or overwrite) the content hash for `file_path` and mark the
    /// file complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn set_file_hash(&self, file_path: &str, hash: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO file_hashes (file_path, file_hash, updated_at) \
             VALUES (?, ?, CURRENT_TIMESTAMP) \
             ON CONFLICT(file_path) DO UPDATE SET \
             file_hash = excluded.file_hash, complete = 1, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(file_path)
        .bind(hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Flag `file_path` as having blocks that still need to be persisted.
    ///
    /// Returns `false` when the file has no fingerprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn mark_file_incomplete(&self, file_path: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE file_hashes SET complete = 0, updated_at = CURRENT_TIMESTAMP \
             WHERE file_path = ?",
        )
        .bind(file_path)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_file_hash(&self, file_path: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM file_hashes WHERE file_path = ?")
            .bind(file_path)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All paths with a recorded fingerprint, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn fingerprinted_files(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT file_path FROM file_hashes ORDER BY file_path")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(p,)| p).collect())
    }
}
