//! Command line argument parsing for the kontos CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kontos - a hybrid retrieval and grounded answer engine
#[derive(Parser, Debug, Clone)]
#[command(name = "kontos")]
#[command(about = "Ask questions against an indexed documentation corpus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct KontosArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl KontosArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build an index artifact from chunk records
    Index(IndexArgs),

    /// Ask a question against an index
    Ask(AskArgs),

    /// Rank chunks for a query without generating an answer
    Search(SearchArgs),

    /// Show index statistics
    Stats(StatsArgs),
}

/// Arguments for building an index artifact
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Chunk records file (JSONL, one chunk per line)
    #[arg(value_name = "CHUNKS_FILE")]
    pub chunks_file: PathBuf,

    /// Path of the index artifact to write
    #[arg(short, long, value_name = "INDEX_PATH", default_value = "kontos.idx")]
    pub index_path: PathBuf,

    /// Embedding dimension
    #[arg(long, default_value = "128")]
    pub dimension: usize,

    /// Distance metric (cosine, euclidean, manhattan)
    #[arg(long, default_value = "cosine")]
    pub metric: String,

    /// Overwrite an existing artifact
    #[arg(long)]
    pub force: bool,
}

/// Arguments for asking a question
#[derive(Parser, Debug, Clone)]
pub struct AskArgs {
    /// Path to the index artifact
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// The question to answer
    #[arg(value_name = "QUESTION")]
    pub question: String,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long, value_name = "K")]
    pub top_k: Option<usize>,

    /// Generation backend (extractive, ollama, openai)
    #[arg(short, long, default_value = "extractive")]
    pub backend: String,

    /// Model name passed to a remote backend
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL of a remote backend
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key for the OpenAI-style backend
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Generation timeout in seconds
    #[arg(long, default_value = "60")]
    pub timeout: u64,
}

/// Arguments for searching without generation
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Path to the index artifact
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of results to return
    #[arg(short = 'k', long, value_name = "K")]
    pub top_k: Option<usize>,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Path to the index artifact
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
