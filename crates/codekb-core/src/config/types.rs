use serde::{Deserialize, Serialize};

use crate::secret::Secret;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            extensions: default_extensions(),
            store: StoreConfig::default(),
            history: HistoryConfig::default(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            log_level: default_log_level(),
            secrets: ResolvedSecrets::default(),
        }
    }
}

fn default_root_dir() -> String {
    ".".into()
}

fn default_extensions() -> Vec<String> {
    ["py", "md", "yml", "conf"].map(String::from).to_vec()
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "embeddings.sqlite3".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_enabled")]
    pub enabled: bool,
    #[serde(default = "default_history_commits")]
    pub commits: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_history_enabled(),
            commits: default_history_commits(),
        }
    }
}

fn default_history_enabled() -> bool {
    true
}

fn default_history_commits() -> usize {
    3
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_token_limit")]
    pub token_limit: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            token_limit: default_token_limit(),
        }
    }
}

fn default_token_limit() -> usize {
    codekb_index::extract::text::DEFAULT_TOKEN_LIMIT
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
    /// Budget for one embedding phase, in seconds.
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            batch_size: default_embedding_batch_size(),
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

fn default_embedding_batch_size() -> usize {
    1
}

fn default_embedding_timeout_secs() -> u64 {
    30 * 60
}

/// Secrets taken from the environment, never from the config file.
#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub openai_api_key: Option<Secret>,
}
