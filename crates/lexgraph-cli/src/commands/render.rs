//! Render command
//!
//! Usage: lexgraph render <RUN_REPORT> [--output <FILE>]

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use lexgraph_core::diff::render_human_summary;
use lexgraph_engine::RunReport;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Saved run report (reports/run.json)
    pub report: PathBuf,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Render the drift summary of a saved run as Markdown.
pub fn execute(args: RenderArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.report)
        .with_context(|| format!("cannot read run report {}", args.report.display()))?;
    let report: RunReport = serde_json::from_str(&text)
        .with_context(|| format!("invalid run report {}", args.report.display()))?;

    let markdown = render_human_summary(&report.diff_results());

    if let Some(output_path) = args.output {
        std::fs::write(&output_path, markdown)?;
        println!("✓ Rendered to {}", output_path.display());
    } else {
        print!("{}", markdown);
    }

    Ok(())
}
