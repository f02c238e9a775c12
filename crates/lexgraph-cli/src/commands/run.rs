//! Run command
//!
//! Usage: lexgraph run --ja --en [--diff] [--convert] [--query-test] [-o <DIR>]

use clap::Args;
use std::path::PathBuf;

use lexgraph_core_types::RunContext;
use lexgraph_engine::{DocumentOutcome, Pipeline, RunReport};
use lexgraph_store::{FsArtifactStore, JsonFingerprintStore};

use crate::config::{FileConfig, Settings};
use crate::http::HttpRetriever;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Process the Japanese statute
    #[arg(long, visible_alias = "source", alias = "japanese")]
    pub ja: bool,

    /// Process the English translation
    #[arg(long, visible_alias = "target", alias = "english")]
    pub en: bool,

    /// Download URL for the Japanese statute
    #[arg(long, value_name = "URL", conflicts_with = "ja_file")]
    pub ja_url: Option<String>,

    /// Download URL for the English translation
    #[arg(long, value_name = "URL", conflicts_with = "en_file")]
    pub en_url: Option<String>,

    /// Read the Japanese statute from a local file (XML or zip)
    #[arg(long, value_name = "PATH")]
    pub ja_file: Option<PathBuf>,

    /// Read the English translation from a local file (XML or zip)
    #[arg(long, value_name = "PATH")]
    pub en_file: Option<PathBuf>,

    /// Encoding label of the Japanese statute, skipping detection
    #[arg(long, value_name = "LABEL")]
    pub ja_encoding: Option<String>,

    /// Encoding label of the English translation, skipping detection
    #[arg(long, value_name = "LABEL")]
    pub en_encoding: Option<String>,

    /// Classify each document against the last accepted fingerprint
    #[arg(long)]
    pub diff: bool,

    /// Convert each document to a linked-data graph
    #[arg(long)]
    pub convert: bool,

    /// Run the structural query battery (implies --convert)
    #[arg(long)]
    pub query_test: bool,

    /// Output directory (default: data)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Fingerprint store file (default: <output-dir>/fingerprints.json)
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Network timeout per download
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Graph serialization: nt or jsonld
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE", env = "LEXGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Exit with status 1 when any document changed
    #[arg(long)]
    pub fail_on_change: bool,
}

/// Execute the run command, returning the process exit code.
pub fn execute(args: RunArgs) -> anyhow::Result<i32> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file)?;

    std::fs::create_dir_all(&settings.output_dir)?;
    let retriever = HttpRetriever::new(settings.timeout)?;
    let mut store = JsonFingerprintStore::open(&settings.store_path);
    let mut sink = FsArtifactStore::new(&settings.output_dir);

    let ctx = RunContext::new().with_origin("cli");
    let report = Pipeline::new(settings.options.clone()).run(
        &ctx,
        &settings.requests,
        &retriever,
        &mut store,
        &mut sink,
    );

    print_report(&report, &sink);
    Ok(report.exit_code(settings.fail_on_change))
}

fn print_report(report: &RunReport, sink: &FsArtifactStore) {
    println!("Run {}:", report.run_id);
    for outcome in &report.documents {
        print_outcome(outcome);
    }
    for warning in &report.store_warnings {
        println!("  warning: {warning}");
    }
    for error in &report.errors {
        println!("  error: [{}] {}", error.code, error.message);
    }
    if report.links_written {
        println!("  translation links written");
    }

    let succeeded = report.documents.iter().filter(|d| d.succeeded()).count();
    println!(
        "Result: {}/{} documents succeeded",
        succeeded,
        report.documents.len()
    );
    println!("Report: {}", sink.report_path("run.json").display());
}

fn print_outcome(outcome: &DocumentOutcome) {
    let status = if outcome.succeeded() { "ok" } else { "FAILED" };
    let mut line = format!("  {} {}", outcome.id, status);
    if let Some(class) = outcome.classification() {
        line.push_str(&format!(" {class}"));
    }
    if let Some(fingerprint) = &outcome.fingerprint {
        line.push_str(&format!(" {fingerprint}"));
    }
    println!("{line}");

    if let Some(stats) = &outcome.graph {
        println!(
            "    graph: {} articles, {} triples",
            stats.articles, stats.triples
        );
    }
    if let Some(queries) = &outcome.queries {
        println!(
            "    queries: {}/{} passed",
            queries.passed(),
            queries.outcomes.len()
        );
        for failed in queries.outcomes.iter().filter(|q| !q.passed) {
            let found = failed
                .found
                .map_or_else(|| "-".to_string(), |n| n.to_string());
            println!(
                "      {} failed: found {}, expected {}",
                failed.name, found, failed.expected
            );
        }
    }
    for error in &outcome.errors {
        println!("    [{}] {}", error.code, error.message);
    }
}
