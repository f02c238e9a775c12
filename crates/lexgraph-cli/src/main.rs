//! LexGraph CLI
//!
//! Command-line interface for LexGraph

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lexgraph_core::logging_facility::{init_with, LogOptions, Profile};

mod commands;
mod config;
mod http;

#[derive(Debug, Parser)]
#[command(name = "lexgraph")]
#[command(about = "LexGraph - Statute retrieval, drift detection and linked-data conversion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON log lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    /// Append error-level events to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Retrieve, normalize and check the selected documents
    Run(commands::run::RunArgs),
    /// Render the drift summary of a saved run report
    Render(commands::render::RenderArgs),
}

fn main() {
    let cli = Cli::parse();

    let profile = if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    };
    let logging = init_with(LogOptions {
        profile,
        verbose: cli.verbose,
        error_log: cli.log_file,
    });
    if let Err(e) = logging {
        eprintln!("Error: cannot open log file: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Render(args) => commands::render::execute(args).map(|()| 0),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
