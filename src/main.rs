mod cli;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use codekb_core::Config;
use codekb_index::{BackfillReport, EmbedMode, IndexReport, Indexer};
use codekb_llm::openai::OpenAiEmbedder;
use codekb_store::{BlockStore, StoreStats};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());

    let mut config = Config::load(&config_path)?;
    cli.apply_overrides(&mut config);
    init_subscriber(&config.log_level);
    tracing::debug!(config = %config_path.display(), "configuration loaded");

    config.validate().context("invalid configuration")?;
    let provider = if cli.command.needs_embeddings() {
        Some(build_provider(&config)?)
    } else {
        None
    };

    let store = BlockStore::open(&config.store.path)
        .await
        .with_context(|| format!("failed to open store at {}", config.store.path))?;

    match cli.command {
        Command::Run => {
            let indexer = Indexer::new(store, provider, config.indexer_config());
            let report = indexer.run(EmbedMode::Immediate).await?;
            print_index_report(&report);
        }
        Command::Preprocess => {
            let indexer = Indexer::new(store, provider, config.indexer_config());
            let report = indexer.run(EmbedMode::Deferred).await?;
            print_index_report(&report);
        }
        Command::Embed => {
            let indexer = Indexer::new(store, provider, config.indexer_config());
            let report = indexer.embed_pending().await?;
            print_backfill_report(&report);
        }
        Command::Stats => {
            let stats = store.stats().await?;
            print_stats(&stats);
        }
        Command::Export { output } => {
            let rows = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    let mut out = BufWriter::new(file);
                    let rows = store.export_csv(&mut out).await?;
                    out.flush()?;
                    rows
                }
                None => {
                    let mut out = std::io::stdout().lock();
                    let rows = store.export_csv(&mut out).await?;
                    out.flush()?;
                    rows
                }
            };
            tracing::info!(rows, "export finished");
        }
    }

    Ok(())
}

fn build_provider(config: &Config) -> anyhow::Result<OpenAiEmbedder> {
    let key = config.api_key().context("embedding requires an API key")?;
    let embedder = OpenAiEmbedder::new(
        key.expose().to_owned(),
        config.embedding.base_url.clone(),
        config.embedding.model.clone(),
    )?;
    Ok(embedder)
}

fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("CODEKB_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber(level: &str) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_index_report(report: &IndexReport) {
    println!(
        "files: {} scanned, {} new, {} changed, {} resumed, {} unchanged, {} skipped, {} removed",
        report.files_scanned,
        report.files_new,
        report.files_changed,
        report.files_resumed,
        report.files_unchanged,
        report.files_skipped,
        report.files_removed
    );
    println!(
        "blocks: {} extracted, {} stored, {} duplicate, {} failed, {} timed out, {} removed",
        report.blocks_extracted,
        report.blocks_created,
        report.blocks_duplicate,
        report.blocks_failed,
        report.blocks_timed_out,
        report.blocks_removed
    );
    if report.files_incomplete > 0 {
        println!(
            "{} files will be retried on the next run",
            report.files_incomplete
        );
    }
    println!(
        "{} warnings, finished in {} ms",
        report.warnings.len(),
        report.duration_ms
    );
}

fn print_backfill_report(report: &BackfillReport) {
    println!(
        "embeddings: {} pending, {} generated, {} failed, {} timed out",
        report.pending, report.embedded, report.failed, report.timed_out
    );
}

fn print_stats(stats: &StoreStats) {
    println!("total blocks:       {}", stats.total_blocks);
    println!("with embeddings:    {}", stats.with_embeddings);
    println!("without embeddings: {}", stats.without_embeddings);
    println!("files:              {}", stats.file_count);
    for (kind, count) in &stats.by_kind {
        println!("  {kind:<10} {count}");
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn config_path_precedence() {
        unsafe { std::env::remove_var("CODEKB_CONFIG") };
        assert_eq!(
            resolve_config_path(None),
            PathBuf::from("config/default.toml")
        );

        unsafe { std::env::set_var("CODEKB_CONFIG", "/etc/codekb.toml") };
        assert_eq!(resolve_config_path(None), PathBuf::from("/etc/codekb.toml"));
        assert_eq!(
            resolve_config_path(Some(Path::new("local.toml"))),
            PathBuf::from("local.toml")
        );
        unsafe { std::env::remove_var("CODEKB_CONFIG") };
    }

    #[test]
    fn provider_requires_key() {
        let mut config = Config::default();
        assert!(build_provider(&config).is_err());

        config.secrets.openai_api_key = Some(codekb_core::Secret::new("sk-test-0123456789abcdef"));
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.model(), "text-embedding-3-small");
    }
}
