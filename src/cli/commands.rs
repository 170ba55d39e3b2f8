//! Command implementations for the kontos CLI.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::cli::args::{AskArgs, Command, IndexArgs, KontosArgs, SearchArgs, StatsArgs};
use crate::cli::output::{self, IndexBuildReport};
use crate::corpus::ChunkRecord;
use crate::embedding::EmbeddingConfig;
use crate::engine::{AnswerEngine, EngineConfig};
use crate::error::{KontosError, Result};
use crate::generation::{BackendKind, GenerationConfig};
use crate::vector::{DistanceMetric, IndexArtifact};

/// Execute a parsed CLI invocation.
pub async fn execute_command(args: KontosArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => build_index(index_args.clone(), &args),
        Command::Ask(ask_args) => ask(ask_args.clone(), &args).await,
        Command::Search(search_args) => search(search_args.clone(), &args),
        Command::Stats(stats_args) => show_stats(stats_args.clone(), &args),
    }
}

/// Build an index artifact from a chunk records file.
fn build_index(args: IndexArgs, cli_args: &KontosArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Indexing chunks from: {}", args.chunks_file.display());
    }

    if args.index_path.exists() && !args.force {
        return Err(KontosError::config(
            "index artifact already exists, use --force to overwrite",
        ));
    }

    let start_time = Instant::now();
    let records = read_chunk_records(&args.chunks_file, cli_args)?;
    if records.is_empty() {
        return Err(KontosError::config(format!(
            "no chunk records found in {}",
            args.chunks_file.display()
        )));
    }

    let metric = DistanceMetric::parse_str(&args.metric)?;
    let embedding_config = EmbeddingConfig {
        dimension: args.dimension,
        ..Default::default()
    };

    let artifact = IndexArtifact::build(records, embedding_config, metric)?;
    artifact.save(&args.index_path)?;
    let duration = start_time.elapsed();

    output::print_index_report(
        &IndexBuildReport {
            path: args.index_path.to_string_lossy().to_string(),
            chunks_indexed: artifact.metadata.chunk_count,
            dimension: artifact.metadata.dimension,
            duration_ms: duration.as_millis() as u64,
        },
        cli_args,
    )
}

/// Read chunk records from a JSONL file, skipping malformed lines.
fn read_chunk_records(path: &Path, cli_args: &KontosArgs) -> Result<Vec<ChunkRecord>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ChunkRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                if cli_args.verbosity() > 0 {
                    eprintln!("Skipping malformed record on line {}: {}", line_num + 1, e);
                }
            }
        }
    }
    Ok(records)
}

/// Answer a question against an index.
async fn ask(args: AskArgs, cli_args: &KontosArgs) -> Result<()> {
    let engine = AnswerEngine::open(&args.index_path, engine_config(&args)?)?;
    let result = engine.ask(&args.question, args.top_k).await;
    output::print_answer(&result, cli_args)
}

/// Assemble the engine configuration from ask-command flags.
fn engine_config(args: &AskArgs) -> Result<EngineConfig> {
    let mut generation = GenerationConfig {
        backend: BackendKind::parse_str(&args.backend)?,
        base_url: args.base_url.clone(),
        api_key: args.api_key.clone(),
        timeout_secs: args.timeout,
        ..Default::default()
    };
    if let Some(model) = &args.model {
        generation.model = model.clone();
    }

    Ok(EngineConfig {
        generation,
        ..Default::default()
    })
}

/// Rank chunks for a query without generating an answer.
fn search(args: SearchArgs, cli_args: &KontosArgs) -> Result<()> {
    let engine = AnswerEngine::open(&args.index_path, EngineConfig::default())?;

    let start_time = Instant::now();
    let hits = engine.search(&args.query, args.top_k);
    let duration = start_time.elapsed();

    output::print_search_hits(&hits, duration.as_millis() as u64, cli_args)
}

/// Show statistics for an index.
fn show_stats(args: StatsArgs, cli_args: &KontosArgs) -> Result<()> {
    let engine = AnswerEngine::open(&args.index_path, EngineConfig::default())?;
    output::print_stats(&engine.stats(), cli_args)
}
