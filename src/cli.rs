//! Command line interface for the kontos answer engine.
//!
//! # Module Structure
//!
//! - `args`: Argument parsing with clap
//! - `commands`: Command implementations
//! - `output`: Human and JSON result rendering

pub mod args;
pub mod commands;
pub mod output;

pub use self::args::{Command, KontosArgs, OutputFormat};
pub use self::commands::execute_command;
