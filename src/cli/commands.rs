//! CLI commands and argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pocket full-article exporter
#[derive(Parser, Debug)]
#[command(name = "pocket-exporter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Checkpoint file path
    #[arg(long, global = true, default_value = ".pocket_checkpoint")]
    pub checkpoint: PathBuf,

    /// Access token cache path (defaults to ~/.pocket_access_token)
    #[arg(long, global = true)]
    pub token_path: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorize with Pocket and cache the access token
    Login {
        /// Re-run authorization even if a token is cached
        #[arg(long)]
        force: bool,
    },

    /// Export the saved-article collection
    Export {
        /// Output format
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Output file for JSON export
        #[arg(long, default_value = "pocket_articles.json")]
        outfile: PathBuf,

        /// Output directory for Markdown export
        #[arg(long, default_value = "PocketExport")]
        outdir: PathBuf,

        /// Items per API page (max 30)
        #[arg(long, default_value = "30")]
        batch: u32,

        /// Debug: stop after N items total
        #[arg(long)]
        limit: Option<usize>,

        /// Skip article extraction and export the raw records
        #[arg(long)]
        no_extract: bool,
    },

    /// Show checkpoint status
    Status,

    /// Remove the checkpoint and spooled items
    Reset,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Single pretty-printed JSON file
    Json,
    /// One Markdown file per article
    Md,
}
