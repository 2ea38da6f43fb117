use std::path::PathBuf;

use clap::{Parser, Subcommand};
use codekb_core::Config;
use codekb_core::config::parse_extensions;

#[derive(Parser, Debug)]
#[command(name = "codekb")]
#[command(about = "Incremental code block extraction and embedding", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to the TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Source tree to index (overrides config)")]
    pub root: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Comma-separated file extensions, e.g. py,js,md (overrides config)"
    )]
    pub extensions: Option<String>,

    #[arg(long, global = true, help = "SQLite database path (overrides config)")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    #[command(about = "Detect changes, extract blocks, embed and store them")]
    Run,

    #[command(about = "Detect changes and store extracted blocks without embeddings")]
    Preprocess,

    #[command(about = "Generate embeddings for stored blocks that have none")]
    Embed,

    #[command(about = "Show store statistics")]
    Stats,

    #[command(about = "Export all stored blocks as CSV")]
    Export {
        #[arg(short, long, help = "Output file (stdout when omitted)")]
        output: Option<PathBuf>,
    },
}

impl Command {
    /// Whether the command calls the embedding API.
    #[must_use]
    pub fn needs_embeddings(&self) -> bool {
        matches!(self, Self::Run | Self::Embed)
    }
}

impl Cli {
    /// Apply command-line overrides on top of file and environment settings.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.root_dir.clone_from(root);
        }
        if let Some(extensions) = &self.extensions {
            config.extensions = parse_extensions(extensions);
        }
        if let Some(db) = &self.db {
            config.store.path.clone_from(db);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["codekb", "run"]).unwrap();
        assert_eq!(cli.command, Command::Run);
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["codekb", "export", "-o", "blocks.csv"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Export {
                output: Some(PathBuf::from("blocks.csv"))
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "codekb",
            "preprocess",
            "--root",
            "src",
            "--extensions",
            "py,.JS",
            "--db",
            "kb.sqlite3",
            "--config",
            "alt.toml",
        ])
        .unwrap();
        assert_eq!(cli.command, Command::Preprocess);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.root_dir, "src");
        assert_eq!(config.extensions, vec!["py", "js"]);
        assert_eq!(config.store.path, "kb.sqlite3");
    }

    #[test]
    fn no_overrides_keep_config() {
        let cli = Cli::try_parse_from(["codekb", "stats"]).unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.store.path, "embeddings.sqlite3");
        assert_eq!(config.extensions.len(), 4);
    }

    #[test]
    fn only_run_and_embed_need_credentials() {
        assert!(Command::Run.needs_embeddings());
        assert!(Command::Embed.needs_embeddings());
        assert!(!Command::Preprocess.needs_embeddings());
        assert!(!Command::Stats.needs_embeddings());
        assert!(!Command::Export { output: None }.needs_embeddings());
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["codekb"]).is_err());
    }
}
