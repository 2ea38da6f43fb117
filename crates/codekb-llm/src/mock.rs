//! Test-only mock embedding provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LlmError, Result};
use crate::provider::EmbeddingProvider;

#[derive(Debug, Clone)]
pub struct MockEmbedder {
    pub embedding: Vec<f32>,
    /// Texts containing this marker fail to embed.
    pub fail_marker: Option<String>,
    /// Milliseconds to sleep before every response.
    pub delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            embedding: vec![0.1, 0.2, 0.3],
            fail_marker: None,
            delay_ms: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self {
            fail_marker: Some(marker.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Number of texts embedded so far, including failed attempts.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if let Some(marker) = &self.fail_marker
            && text.contains(marker.as_str())
        {
            return Err(LlmError::Other("mock embedding error".into()));
        }
        Ok(self.embedding.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeds_and_counts_calls() {
        let mock = MockEmbedder::default();
        assert_eq!(mock.embed("x").await.unwrap(), vec![0.1, 0.2, 0.3]);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn fails_on_marker() {
        let mock = MockEmbedder::failing_on("boom");
        assert!(mock.embed("a boom b").await.is_err());
        assert!(mock.embed("fine").await.is_ok());
    }

    #[tokio::test]
    async fn default_batch_embeds_each_text() {
        let mock = MockEmbedder::default();
        let out = mock
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(mock.calls(), 2);
    }
}
