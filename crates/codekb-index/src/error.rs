//! Error types for codekb-index.

/// Errors that can occur while extracting and embedding blocks.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// IO error reading source files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted store error.
    #[error("store error: {0}")]
    Store(#[from] codekb_store::StoreError),

    /// Embedding provider error.
    #[error("embedding error: {0}")]
    Llm(#[from] codekb_llm::LlmError),

    /// Grammar-aware parsing failed.
    #[error("parse failed: {0}")]
    Parse(String),

    /// Immediate embedding was requested without a provider.
    #[error("immediate embedding requires an embedding provider")]
    MissingProvider,

    /// Repository history could not be opened or queried.
    #[error("history unavailable: {0}")]
    History(String),
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
