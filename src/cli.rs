use std::path::PathBuf;

use clap::Parser;

use lre::models::DistributionScope;

/// `lre` — run the license reasoning engine over an already-resolved
/// dependency record set.
///
/// This binary performs no dependency discovery and no registry fetching:
/// the input is a JSON file of dependency records, the shape an external
/// SBOM/discovery step is expected to have already produced.
#[derive(Parser, Debug)]
#[command(name = "lre", about = "Analyze a resolved dependency set for license compliance", version)]
pub struct Cli {
    /// Path to a JSON file containing an array of dependency records
    pub dependencies: PathBuf,

    /// Distribution scope the combined work ships under
    #[arg(long, value_name = "SCOPE")]
    pub distribution_scope: Option<DistributionScope>,

    /// YAML knowledge-base overlay applied on top of the built-in catalog
    #[arg(long, value_name = "FILE")]
    pub knowledge_base: Option<PathBuf>,

    /// Runtime config file [default: ./lre.toml, fallback ~/.config/lre/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Target use case for use-case-scoped exemptions (forward-compatible; no exemption edges are seeded yet)
    #[arg(long)]
    pub use_case: Option<String>,

    /// Report format
    #[arg(long, value_name = "FORMAT")]
    pub report: Option<ReportFormat>,

    /// Show per-dependency classification detail, not just conflicts/obligations
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the verdict summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
