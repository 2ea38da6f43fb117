use crate::error::Result;

/// A backend able to turn text into embedding vectors.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or an
    /// empty/malformed response.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>>> + Send;

    /// Embed several texts, returning one vector per input in input order.
    ///
    /// The default implementation issues one [`embed`](Self::embed) call per text.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    fn embed_batch(&self, texts: &[String]) -> impl Future<Output = Result<Vec<Vec<f32>>>> + Send {
        async move {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.embed(text).await?);
            }
            Ok(vectors)
        }
    }

    fn name(&self) -> &'static str;
}
