use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use itertools::Itertools;

use lre::tree::{ComplianceVerdict, DependencyTreeAnalysis, Priority};

/// Render a colored terminal report for one [`DependencyTreeAnalysis`].
pub fn render(analysis: &DependencyTreeAnalysis, verbose: bool, quiet: bool) -> Result<()> {
    let (verdict_str, verdict_color) = verdict_badge(analysis.verdict);

    if quiet {
        println!(
            "{}  deps: {}  licenses: {}  conflicts: {}  risk: {:.2}",
            verdict_str.color(verdict_color).bold(),
            analysis.dependencies.len(),
            analysis.distinct_licenses.len(),
            analysis.conflicts.len(),
            analysis.risk_score,
        );
        return Ok(());
    }

    println!("\n {} v{}", "lre".bold(), env!("CARGO_PKG_VERSION"));

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Verdict             : {}", verdict_str.color(verdict_color)));
    println!(" │  {:<48} │", format!("Dependencies        : {}", analysis.dependencies.len()));
    println!(" │  {:<48} │", format!("Distinct licenses   : {}", analysis.distinct_licenses.len()));
    println!(
        " │  {:<48} │",
        format!("Dominant license    : {}", analysis.dominant_license.as_deref().unwrap_or("—"))
    );
    println!(" │  {:<48} │", format!("Conflicts           : {}", analysis.conflicts.len()));
    println!(" │  {:<48} │", format!("Unique obligations  : {}", analysis.obligations.len()));
    println!(" │  {:<48} │", format!("Risk score          : {:.2}", analysis.risk_score));
    println!(" └────────────────────────────────────────────────────┘\n");

    if !analysis.conflicts.is_empty() {
        println!(" {} Conflicts:\n", "[CONFLICT]".red().bold());
        render_conflicts(analysis);
        println!();
    }

    if !analysis.obligations.is_empty() {
        println!(" {} Obligations:\n", "[OBLIGATION]".cyan().bold());
        render_obligations(analysis);
        println!();
    }

    if !analysis.recommendations.is_empty() {
        println!(" {} Recommendations:\n", "[RECOMMEND]".yellow().bold());
        for rec in &analysis.recommendations {
            println!("   {} {}", priority_badge(rec.priority), rec.title);
        }
        println!();
    }

    let review_needed: Vec<_> = analysis.dependencies.iter().filter(|d| d.requires_review).collect();
    if verbose || !review_needed.is_empty() {
        println!(" {} Dependencies:\n", "[DEPENDENCIES]".bold());
        render_dependencies(analysis, verbose);
        println!();
    }

    Ok(())
}

fn verdict_badge(verdict: ComplianceVerdict) -> (&'static str, Color) {
    match verdict {
        ComplianceVerdict::Compliant => ("compliant", Color::Green),
        ComplianceVerdict::RequiresReview => ("requires review", Color::Cyan),
        ComplianceVerdict::Warnings => ("warnings", Color::Yellow),
        ComplianceVerdict::Blocked => ("blocked", Color::Red),
    }
}

fn priority_badge(priority: Priority) -> ColoredString {
    match priority {
        Priority::Critical => "critical".red().bold(),
        Priority::High => "high".yellow().bold(),
        Priority::Medium => "medium".cyan(),
        Priority::Low => "low".dimmed(),
    }
}

fn render_conflicts(analysis: &DependencyTreeAnalysis) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("License A").add_attribute(Attribute::Bold),
            Cell::new("License B").add_attribute(Attribute::Bold),
            Cell::new("Severity").add_attribute(Attribute::Bold),
            Cell::new("Reason").add_attribute(Attribute::Bold),
        ]);

    for conflict in &analysis.conflicts {
        let (label, color) = match conflict.severity {
            lre::tree::ConflictSeverity::Blocking => ("blocking", Color::Red),
            lre::tree::ConflictSeverity::Warning => ("warning", Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&conflict.license1),
            Cell::new(&conflict.license2),
            Cell::new(label).fg(color).set_alignment(CellAlignment::Center),
            Cell::new(&conflict.result.reason),
        ]);
    }

    println!("{}", table);
}

fn render_obligations(analysis: &DependencyTreeAnalysis) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Obligation").add_attribute(Attribute::Bold),
            Cell::new("Effort").add_attribute(Attribute::Bold),
            Cell::new("Scope").add_attribute(Attribute::Bold),
            Cell::new("Sources").add_attribute(Attribute::Bold),
        ]);

    for obligation in &analysis.obligations {
        let effort_color = match obligation.effort {
            lre::models::Effort::Trivial | lre::models::Effort::Low => Color::Green,
            lre::models::Effort::Medium => Color::Yellow,
            lre::models::Effort::High | lre::models::Effort::VeryHigh => Color::Red,
        };
        table.add_row(vec![
            Cell::new(&obligation.name),
            Cell::new(obligation.effort.to_string()).fg(effort_color),
            Cell::new(obligation.scope.to_string()),
            Cell::new(obligation.source_licenses.iter().join(", ")),
        ]);
    }

    println!("{}", table);
}

fn render_dependencies(analysis: &DependencyTreeAnalysis, verbose: bool) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Classification").add_attribute(Attribute::Bold),
            Cell::new("Review").add_attribute(Attribute::Bold),
        ]);

    for dep in &analysis.dependencies {
        if !verbose && !dep.requires_review {
            continue;
        }
        let classification = match &dep.classification {
            lre::expression::Classification::Category(c) => c.to_string(),
            lre::expression::Classification::DualLicense { options, .. } => {
                format!("dual license ({})", options.iter().map(|c| c.to_string()).join(" / "))
            }
            lre::expression::Classification::Unknown => "unknown".to_string(),
        };
        let review_cell = if dep.requires_review {
            Cell::new("review").fg(Color::Yellow).set_alignment(CellAlignment::Center)
        } else {
            Cell::new("—").set_alignment(CellAlignment::Center)
        };
        table.add_row(vec![
            Cell::new(&dep.dependency_name),
            Cell::new(&dep.license),
            Cell::new(classification),
            review_cell,
        ]);
    }

    println!("{}", table);
}
