mod blocks;
mod export;
mod fingerprints;
mod stats;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use crate::error::StoreError;

pub use blocks::{BlockInsert, StoredBlock};
pub use fingerprints::Fingerprint;
pub use stats::StoreStats;

/// Durable store of blocks, vectors, and file fingerprints.
///
/// Writes are issued one statement at a time over a single connection;
/// concurrent external writers to the same file are not supported.
#[derive(Debug, Clone)]
pub struct BlockStore {
    pool: SqlitePool,
}

impl BlockStore {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// `":memory:"` opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let opts = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;

        sqlx::migrate!("../../migrations").run(&pool).await?;

        tracing::debug!(path, "block store opened");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_row() -> BlockInsert<'static> {
        BlockInsert {
            file_path: "/repo/app.py",
            relative_path: "app.py",
            block_type: "function",
            class_name: None,
            method_name: Some("main"),
            start_line: 1,
            end_line: 2,
            commit_messages: &[],
            raw_text: "def main():\n    pass",
            embedding_text: "File: app.py\nMethod/Function: main\nLines: 1-2\n\nCode:\ndef main():\n    pass",
        }
    }

    #[tokio::test]
    async fn file_db_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.sqlite3");
        let store = BlockStore::open(path.to_str().unwrap()).await.unwrap();

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[tokio::test]
    async fn reopen_keeps_pending_rows_and_fingerprints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.sqlite3");
        let path = path.to_str().unwrap();

        let store = BlockStore::open(path).await.unwrap();
        store.set_file_hash("app.py", "abc").await.unwrap();
        store.insert_block(&pending_row(), None).await.unwrap();
        store.mark_file_incomplete("app.py").await.unwrap();
        store.pool().close().await;

        let store = BlockStore::open(path).await.unwrap();
        let fingerprint = store.fingerprint("app.py").await.unwrap().unwrap();
        assert_eq!(fingerprint.hash, "abc");
        assert!(!fingerprint.complete);

        let pending = store.pending_blocks().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].method_name.as_deref(), Some("main"));
        assert!(store.block_exists(&pending_row()).await.unwrap());
    }
}
