//! Human and JSON rendering of command results.

use serde::Serialize;

use crate::cli::args::{KontosArgs, OutputFormat};
use crate::corpus::{SNIPPET_MAX_CHARS, snippet_of};
use crate::engine::{AnswerResult, EngineStats, SearchHit};
use crate::error::Result;

/// Summary of a completed index build.
#[derive(Debug, Serialize)]
pub struct IndexBuildReport {
    pub path: String,
    pub chunks_indexed: usize,
    pub dimension: usize,
    pub duration_ms: u64,
}

/// JSON envelope for search results.
#[derive(Debug, Serialize)]
struct SearchReport<'a> {
    hits: &'a [SearchHit],
    total_hits: usize,
    duration_ms: u64,
}

/// Output an index build report in the selected format.
pub fn print_index_report(report: &IndexBuildReport, args: &KontosArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => print_json(report, args),
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!(
                    "Indexed {} chunks (dimension {}) in {}ms",
                    report.chunks_indexed, report.dimension, report.duration_ms
                );
                println!("Artifact written to: {}", report.path);
            }
            Ok(())
        }
    }
}

/// Output an answer with its sources in the selected format.
pub fn print_answer(result: &AnswerResult, args: &KontosArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => print_json(result, args),
        OutputFormat::Human => {
            println!("{}", result.answer);

            if args.verbosity() > 0 && !result.sources.is_empty() {
                println!();
                println!("Sources ({}):", result.sources.len());
                println!("────────────");
                for (i, source) in result.sources.iter().enumerate() {
                    match source.page {
                        Some(page) => {
                            println!("{}. Page {} (score: {:.3})", i + 1, page, source.score)
                        }
                        None => println!("{}. (score: {:.3})", i + 1, source.score),
                    }
                    println!("   {}", source.snippet);
                }
            }
            Ok(())
        }
    }
}

/// Output search hits in the selected format.
pub fn print_search_hits(hits: &[SearchHit], duration_ms: u64, args: &KontosArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => print_json(
            &SearchReport {
                hits,
                total_hits: hits.len(),
                duration_ms,
            },
            args,
        ),
        OutputFormat::Human => {
            if hits.is_empty() {
                println!("No results.");
                return Ok(());
            }

            println!("Search Results:");
            println!("═══════════════");
            for (i, hit) in hits.iter().enumerate() {
                println!();
                match hit.page {
                    Some(page) => println!(
                        "Result {}: {} page {} (score: {:.3})",
                        i + 1,
                        hit.source,
                        page,
                        hit.score
                    ),
                    None => println!("Result {}: {} (score: {:.3})", i + 1, hit.source, hit.score),
                }
                println!("{}", snippet_of(&hit.content, SNIPPET_MAX_CHARS));
            }
            println!();
            println!("Total hits: {}", hits.len());
            println!("Search time: {duration_ms}ms");
            Ok(())
        }
    }
}

/// Output engine statistics in the selected format.
pub fn print_stats(stats: &EngineStats, args: &KontosArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => print_json(stats, args),
        OutputFormat::Human => {
            println!("Index Statistics:");
            println!("════════════════");
            println!("Total chunks: {}", stats.chunk_count);
            println!("Embedding dimension: {}", stats.dimension);
            println!(
                "Lexical channel: {}",
                if stats.lexical_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!("Lexical terms: {}", stats.lexical_terms);
            println!("Generation backend: {}", stats.backend);
            Ok(())
        }
    }
}

/// Serialize a value as JSON to stdout, pretty when requested.
fn print_json<T: Serialize>(value: &T, args: &KontosArgs) -> Result<()> {
    let rendered = if args.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
