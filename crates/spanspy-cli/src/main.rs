//! CLI tool for spanspy.
//!
//! Reads Spanner DDL (or a previously exported schema) and writes the schema,
//! its diagram model, or a Mermaid diagram to stdout or a file.

mod commands;
mod sample;

use clap::{Parser, ValueEnum};
use commands::{Input, Options};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SPANSPY_LOG";

#[derive(Parser, Debug)]
#[command(name = "spanspy")]
#[command(about = "Build a normalized JSON schema from Spanner DDL", long_about = None)]
#[command(version)]
struct Cli {
    /// DDL file to read; omit or pass "-" to read stdin
    #[arg(value_name = "INPUT", conflicts_with = "input")]
    path: Option<PathBuf>,

    /// Same as INPUT
    #[arg(long, short, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Use the built-in sample schema instead of reading input
    #[arg(long, conflicts_with_all = ["path", "input", "from_json"])]
    sample: bool,

    /// Write to this file instead of stdout
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Indent JSON output by two spaces
    #[arg(long)]
    pretty: bool,

    /// What to write
    #[arg(long, short, value_enum, default_value = "schema")]
    format: OutputFormat,

    /// Treat the input as an exported schema JSON document instead of DDL
    #[arg(long)]
    from_json: bool,
}

/// Output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Schema JSON (default)
    Schema,
    /// Diagram model JSON
    #[value(alias = "json")]
    Diagram,
    /// Mermaid erDiagram text
    #[value(alias = "mmd")]
    Mermaid,
}

impl Cli {
    fn options(self) -> Options {
        let input = if self.sample {
            Input::Sample
        } else {
            Input::from_arg(self.input.or(self.path))
        };
        Options {
            input,
            output: self.output,
            pretty: self.pretty,
            format: self.format,
            from_json: self.from_json,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match commands::run(&cli.options()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
