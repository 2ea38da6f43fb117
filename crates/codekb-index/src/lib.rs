//! Incremental code block extraction and embedding.
//!
//! Files are fingerprinted by content, changed files are split into blocks
//! (functions, methods, types, or token-bounded text chunks) by a
//! per-language [`Extractor`], and each new block is embedded and persisted
//! exactly once per identity.

pub mod block;
pub mod changes;
pub mod context;
pub mod error;
pub mod extract;
pub mod history;
pub mod indexer;
pub mod orchestrator;
pub mod pipeline;
pub mod registry;
pub mod scan;
pub mod tokenizer;
pub mod walk;

pub use block::{Block, BlockKind};
pub use error::{IndexError, Result};
pub use extract::Extractor;
pub use indexer::{IndexReport, Indexer, IndexerConfig};
pub use pipeline::{BackfillReport, EmbedMode};
pub use registry::ParserRegistry;
