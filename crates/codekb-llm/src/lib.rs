//! Embedding provider abstraction.
//!
//! The indexing pipeline only needs `text -> vector`; this crate hides the
//! HTTP details of the backend behind [`EmbeddingProvider`].

pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod openai;
pub mod provider;

pub use error::{LlmError, Result};
pub use provider::EmbeddingProvider;
