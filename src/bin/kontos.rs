//! Kontos CLI binary.

use clap::Parser;
use kontos::cli::args::KontosArgs;
use kontos::cli::commands::execute_command;
use log::LevelFilter;
use std::process;

#[tokio::main]
async fn main() {
    let args = KontosArgs::parse();

    // Map count-style verbosity onto a log filter; RUST_LOG still wins.
    let level = match args.verbosity() {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();
    builder.init();

    if let Err(e) = execute_command(args).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
