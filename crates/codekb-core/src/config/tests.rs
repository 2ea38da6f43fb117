use std::io::Write;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 13] = [
    "CODEKB_ROOT_DIR",
    "CODEKB_FILE_EXTENSIONS",
    "CODEKB_DB_PATH",
    "CODEKB_N_COMMITS",
    "CODEKB_HISTORY_ENABLED",
    "CODEKB_TOKEN_LIMIT",
    "CODEKB_EMBEDDING_BASE_URL",
    "CODEKB_EMBEDDING_MODEL",
    "CODEKB_EMBEDDING_BATCH_SIZE",
    "CODEKB_EMBEDDING_TIMEOUT",
    "CODEKB_LOG_LEVEL",
    "CODEKB_OPENAI_API_KEY",
    "OPENAI_API_KEY",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn defaults_when_file_missing() {
    let config = Config::default();
    assert_eq!(config.root_dir, ".");
    assert_eq!(config.extensions, vec!["py", "md", "yml", "conf"]);
    assert_eq!(config.store.path, "embeddings.sqlite3");
    assert!(config.history.enabled);
    assert_eq!(config.history.commits, 3);
    assert_eq!(config.chunking.token_limit, 1600);
    assert_eq!(config.embedding.base_url, "https://api.openai.com/v1");
    assert_eq!(config.embedding.model, "text-embedding-3-small");
    assert_eq!(config.embedding.batch_size, 1);
    assert_eq!(config.embedding.timeout_secs, 1800);
    assert_eq!(config.log_level, "info");
    assert!(config.secrets.openai_api_key.is_none());
}

#[test]
#[serial]
fn load_missing_file_uses_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.store.path, "embeddings.sqlite3");
    assert_eq!(config.chunking.token_limit, 1600);
}

#[test]
#[serial]
fn load_partial_file_keeps_other_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
root_dir = "src"
extensions = ["js", "ts"]

[store]
path = "kb.sqlite3"

[embedding]
batch_size = 16
"#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.root_dir, "src");
    assert_eq!(config.extensions, vec!["js", "ts"]);
    assert_eq!(config.store.path, "kb.sqlite3");
    assert_eq!(config.embedding.batch_size, 16);
    assert_eq!(config.embedding.model, "text-embedding-3-small");
    assert_eq!(config.history.commits, 3);
}

#[test]
#[serial]
fn load_rejects_malformed_toml() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "extensions = [\"py\"");
    assert!(Config::load(&path).is_err());
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[history]\ncommits = 5\n");

    unsafe {
        std::env::set_var("CODEKB_FILE_EXTENSIONS", " .PY, md ,,go");
        std::env::set_var("CODEKB_DB_PATH", "/tmp/override.sqlite3");
        std::env::set_var("CODEKB_N_COMMITS", "7");
        std::env::set_var("CODEKB_HISTORY_ENABLED", "false");
        std::env::set_var("CODEKB_TOKEN_LIMIT", "500");
        std::env::set_var("CODEKB_EMBEDDING_BATCH_SIZE", "8");
        std::env::set_var("CODEKB_EMBEDDING_TIMEOUT", "60");
        std::env::set_var("CODEKB_LOG_LEVEL", "debug");
    }

    let config = Config::load(&path).unwrap();
    clear_env();

    assert_eq!(config.extensions, vec!["py", "md", "go"]);
    assert_eq!(config.store.path, "/tmp/override.sqlite3");
    assert_eq!(config.history.commits, 7);
    assert!(!config.history.enabled);
    assert_eq!(config.chunking.token_limit, 500);
    assert_eq!(config.embedding.batch_size, 8);
    assert_eq!(config.embedding.timeout_secs, 60);
    assert_eq!(config.log_level, "debug");
}

#[test]
#[serial]
fn invalid_numeric_env_is_ignored() {
    clear_env();
    unsafe { std::env::set_var("CODEKB_TOKEN_LIMIT", "lots") };
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("absent.toml")).unwrap();
    clear_env();
    assert_eq!(config.chunking.token_limit, 1600);
}

#[test]
#[serial]
fn prefixed_api_key_wins() {
    clear_env();
    unsafe {
        std::env::set_var("OPENAI_API_KEY", "sk-generic-key-000000000");
        std::env::set_var("CODEKB_OPENAI_API_KEY", "sk-codekb-key-111111111");
    }
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("absent.toml")).unwrap();
    clear_env();

    assert_eq!(config.api_key().unwrap().expose(), "sk-codekb-key-111111111");
    assert!(!format!("{config:?}").contains("sk-codekb"));
}

#[test]
fn api_key_missing_or_short_is_rejected() {
    let mut config = Config::default();
    assert!(config.api_key().is_err());

    config.secrets.openai_api_key = Some(Secret::new("short"));
    assert!(config.api_key().is_err());

    config.secrets.openai_api_key = Some(Secret::new("x".repeat(MIN_API_KEY_LEN)));
    assert!(config.api_key().is_ok());
}

#[test]
fn validate_accepts_defaults_in_existing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        root_dir: dir.path().to_string_lossy().into_owned(),
        ..Config::default()
    };
    config.validate().unwrap();
}

#[test]
fn validate_rejects_bad_settings() {
    let dir = tempfile::tempdir().unwrap();
    let valid = || Config {
        root_dir: dir.path().to_string_lossy().into_owned(),
        ..Config::default()
    };

    let mut config = valid();
    config.root_dir = String::new();
    assert!(config.validate().is_err());

    let mut config = valid();
    config.root_dir = dir.path().join("missing").to_string_lossy().into_owned();
    assert!(config.validate().is_err());

    let mut config = valid();
    config.extensions.clear();
    assert!(config.validate().is_err());

    let mut config = valid();
    config.chunking.token_limit = 99;
    assert!(config.validate().is_err());
    config.chunking.token_limit = 8001;
    assert!(config.validate().is_err());
    config.chunking.token_limit = 8000;
    assert!(config.validate().is_ok());

    let mut config = valid();
    config.embedding.batch_size = 0;
    assert!(config.validate().is_err());

    let mut config = valid();
    config.embedding.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn indexer_config_reflects_settings() {
    let mut config = Config::default();
    config.history.enabled = false;
    config.embedding.timeout_secs = 90;
    config.embedding.batch_size = 4;

    let indexer = config.indexer_config();
    assert_eq!(indexer.root, PathBuf::from("."));
    assert_eq!(indexer.history_commits, None);
    assert_eq!(indexer.batch_size, 4);
    assert_eq!(indexer.embed_timeout, Duration::from_secs(90));

    config.history.enabled = true;
    assert_eq!(config.indexer_config().history_commits, Some(3));
}

#[test]
fn parse_extensions_normalizes() {
    assert_eq!(parse_extensions("py,.JS, md"), vec!["py", "js", "md"]);
    assert!(parse_extensions(" , ").is_empty());
}
