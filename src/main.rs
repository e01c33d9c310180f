//! `lre` — run the license reasoning engine over an already-resolved
//! dependency record set.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load the layered runtime config ([`config::load_config`]).
//! 3. Build the knowledge graph ([`lre::kb::load`]), optionally YAML-overlaid.
//! 4. Read the dependency records JSON file.
//! 5. Run [`lre::tree::analyze_dependency_tree`].
//! 6. Render the requested report ([`report`]).
//! 7. Exit `0` for [`lre::tree::ComplianceVerdict::Compliant`] or
//!    `RequiresReview`, `1` for `Warnings` or `Blocked`.
//!
//! This binary performs no dependency discovery, no registry fetching, and
//! no PDF generation — it is a thin demo surface over the reasoning kernel
//! in [`lre`].

mod cli;
mod config;
mod report;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, ReportFormat};
use config::load_config;
use lre::models::DependencyRecord;
use lre::tree::ComplianceVerdict;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let project_path = std::env::current_dir()?;
    let config = load_config(&project_path, cli.config.as_deref())?;

    let distribution_scope = cli.distribution_scope.unwrap_or(config.distribution_scope);
    let overlay_path = cli.knowledge_base.as_deref().or(config.knowledge_base_overlay.as_deref());
    let report_format = cli.report.unwrap_or(match config.report_format.as_str() {
        "json" => ReportFormat::Json,
        _ => ReportFormat::Terminal,
    });

    let graph = lre::kb::load(overlay_path).context("loading knowledge base")?;

    let content = std::fs::read_to_string(&cli.dependencies)
        .with_context(|| format!("reading dependency records from {}", cli.dependencies.display()))?;
    let mut records: Vec<DependencyRecord> =
        serde_json::from_str(&content).context("parsing dependency records JSON")?;
    for record in &mut records {
        record.scope.get_or_insert(distribution_scope);
    }

    log::info!(
        "loaded {} dependency records, distribution scope {}",
        records.len(),
        distribution_scope
    );

    let analysis = lre::tree::analyze_dependency_tree(&graph, &records, cli.use_case.as_deref());

    match report_format {
        ReportFormat::Terminal => report::terminal::render(&analysis, cli.verbose, cli.quiet)?,
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
    }

    let exit_code = match analysis.verdict {
        ComplianceVerdict::Compliant | ComplianceVerdict::RequiresReview => 0,
        ComplianceVerdict::Warnings | ComplianceVerdict::Blocked => 1,
    };
    std::process::exit(exit_code);
}
