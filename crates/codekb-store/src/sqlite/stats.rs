use std::collections::BTreeMap;

use super::BlockStore;
use crate::error::StoreError;

/// Aggregate counts over the stored blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total_blocks: i64,
    pub with_embeddings: i64,
    pub without_embeddings: i64,
    pub file_count: i64,
    pub by_kind: BTreeMap<String, i64>,
}

impl BlockStore {
    /// # Errors
    ///
    /// Returns an error if any of the aggregate queries fail.
    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        let (total_blocks, with_embeddings, file_count): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
             COALESCE(SUM(CASE WHEN embedding != '' THEN 1 ELSE 0 END), 0), \
             COUNT(DISTINCT file_path) \
             FROM blocks",
        )
        .fetch_one(&self.pool)
        .await?;

        let kinds: Vec<(String, i64)> = sqlx::query_as(
            "SELECT block_type, COUNT(*) FROM blocks GROUP BY block_type ORDER BY block_type",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(StoreStats {
            total_blocks,
            with_embeddings,
            without_embeddings: total_blocks - with_embeddings,
            file_count,
            by_kind: kinds.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockInsert;

    fn block<'a>(path: &'a str, kind: &'a str, start: usize) -> BlockInsert<'a> {
        BlockInsert {
            file_path: path,
            relative_path: path,
            block_type: kind,
            class_name: None,
            method_name: None,
            start_line: start,
            end_line: start,
            commit_messages: &[],
            raw_text: "x",
            embedding_text: "x",
        }
    }

    #[tokio::test]
    async fn empty_store_stats() {
        let store = BlockStore::open(":memory:").await.unwrap();
        assert_eq!(store.stats().await.unwrap(), StoreStats::default());
    }

    #[tokio::test]
    async fn counts_by_kind_and_embedding_state() {
        let store = BlockStore::open(":memory:").await.unwrap();
        store
            .insert_block(&block("a.py", "function", 1), Some(&[1.0]))
            .await
            .unwrap();
        store
            .insert_block(&block("a.py", "method", 5), None)
            .await
            .unwrap();
        store
            .insert_block(&block("README.md", "markdown", 1), Some(&[1.0]))
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_blocks, 3);
        assert_eq!(stats.with_embeddings, 2);
        assert_eq!(stats.without_embeddings, 1);
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.by_kind.get("function"), Some(&1));
        assert_eq!(stats.by_kind.get("markdown"), Some(&1));
        assert_eq!(stats.by_kind.get("method"), Some(&1));
    }
}
