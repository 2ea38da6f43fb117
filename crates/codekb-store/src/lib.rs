//! `SQLite` persistence for extracted blocks, their embeddings, and the
//! per-file content fingerprints used for change detection.

pub mod error;
mod sqlite;

pub use error::{Result, StoreError};
pub use sqlite::{BlockInsert, BlockStore, Fingerprint, StoreStats, StoredBlock};
