mod env;
mod types;

#[cfg(test)]
mod tests;

pub use env::parse_extensions;
pub use types::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use codekb_index::IndexerConfig;

use crate::secret::Secret;

/// Accepted range for `chunking.token_limit`.
pub const TOKEN_LIMIT_RANGE: std::ops::RangeInclusive<usize> = 100..=8000;

/// Shortest credential accepted for the embedding API.
pub const MIN_API_KEY_LEN: usize = 20;

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Check settings every command depends on.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.root_dir.trim().is_empty() {
            bail!("root_dir must not be empty");
        }
        if !Path::new(&self.root_dir).is_dir() {
            bail!("root_dir {} does not exist or is not a directory", self.root_dir);
        }
        if self.extensions.is_empty() {
            bail!("at least one file extension must be configured");
        }
        if !TOKEN_LIMIT_RANGE.contains(&self.chunking.token_limit) {
            bail!(
                "chunking.token_limit must be within {}..={}, got {}",
                TOKEN_LIMIT_RANGE.start(),
                TOKEN_LIMIT_RANGE.end(),
                self.chunking.token_limit
            );
        }
        if self.store.path.trim().is_empty() {
            bail!("store.path must not be empty");
        }
        if self.embedding.batch_size == 0 {
            bail!("embedding.batch_size must be at least 1");
        }
        if self.embedding.timeout_secs == 0 {
            bail!("embedding.timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Credential for the embedding API. Only commands that embed need it.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is set or it is too short to be real.
    pub fn api_key(&self) -> anyhow::Result<&Secret> {
        let Some(key) = &self.secrets.openai_api_key else {
            bail!("OPENAI_API_KEY (or CODEKB_OPENAI_API_KEY) is not set");
        };
        if key.len() < MIN_API_KEY_LEN {
            bail!("embedding API key is too short (expected at least {MIN_API_KEY_LEN} characters)");
        }
        Ok(key)
    }

    #[must_use]
    pub fn indexer_config(&self) -> IndexerConfig {
        IndexerConfig {
            root: PathBuf::from(&self.root_dir),
            extensions: self.extensions.clone(),
            token_limit: self.chunking.token_limit,
            history_commits: self.history.enabled.then_some(self.history.commits),
            batch_size: self.embedding.batch_size,
            embed_timeout: Duration::from_secs(self.embedding.timeout_secs),
        }
    }
}
