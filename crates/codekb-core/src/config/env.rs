use codekb_index::extract::normalize_extension;

use super::Config;
use crate::secret::Secret;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CODEKB_ROOT_DIR") {
            self.root_dir = v;
        }
        if let Ok(v) = std::env::var("CODEKB_FILE_EXTENSIONS") {
            self.extensions = parse_extensions(&v);
        }
        if let Ok(v) = std::env::var("CODEKB_DB_PATH") {
            self.store.path = v;
        }
        if let Ok(v) = std::env::var("CODEKB_N_COMMITS")
            && let Ok(n) = v.parse::<usize>()
        {
            self.history.commits = n;
        }
        if let Ok(v) = std::env::var("CODEKB_HISTORY_ENABLED")
            && let Ok(enabled) = v.parse::<bool>()
        {
            self.history.enabled = enabled;
        }
        if let Ok(v) = std::env::var("CODEKB_TOKEN_LIMIT")
            && let Ok(limit) = v.parse::<usize>()
        {
            self.chunking.token_limit = limit;
        }
        if let Ok(v) = std::env::var("CODEKB_EMBEDDING_BASE_URL") {
            self.embedding.base_url = v;
        }
        if let Ok(v) = std::env::var("CODEKB_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Ok(v) = std::env::var("CODEKB_EMBEDDING_BATCH_SIZE")
            && let Ok(size) = v.parse::<usize>()
        {
            self.embedding.batch_size = size;
        }
        if let Ok(v) = std::env::var("CODEKB_EMBEDDING_TIMEOUT")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.embedding.timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("CODEKB_LOG_LEVEL") {
            self.log_level = v;
        }

        let key = std::env::var("CODEKB_OPENAI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        if let Some(key) = key {
            self.secrets.openai_api_key = Some(Secret::new(key.trim()));
        }
    }
}

/// Comma-separated extension list; dots, blanks, and case are normalized.
#[must_use]
pub fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_extension)
        .filter(|e| !e.is_empty())
        .collect()
}
