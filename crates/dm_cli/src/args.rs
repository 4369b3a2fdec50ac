// crates/dm_cli/src/args.rs
//
// Deterministic, offline CLI argument parsing surface.
//
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - --input is the allocation request JSON; --out defaults to stdout
// - --cost-metric is repeatable; when omitted, the default classification
//   list applies (lateDeliveries)
// - --validate-only performs load + validation without allocating

use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;

use dm_core::tokens::MetricName;
use dm_pipeline::EngineConfig;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "dm",
    disable_help_subcommand = true,
    about = "Offline, deterministic CLI for the DM discount allocation engine"
)]
pub struct Args {
    /// Allocation request JSON path.
    #[arg(long)]
    pub input: PathBuf,

    /// Report JSON output path (omit to print to stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Metric name classified as a cost metric (lower raw value is better).
    /// Repeatable; omit to use the default list.
    #[arg(long = "cost-metric", value_parser = parse_metric)]
    pub cost_metric: Vec<MetricName>,

    /// Minimum discount assigned to any agent before remainder correction.
    #[arg(long, default_value_t = 1)]
    pub min_discount: u32,

    /// Validate the request only (shape/domain checks), do not allocate.
    #[arg(long)]
    pub validate_only: bool,

    /// Suppress non-essential stderr logs.
    #[arg(long)]
    pub quiet: bool,
}

impl Args {
    /// Engine knobs derived from the flags. An explicit --cost-metric list
    /// replaces the default classification entirely.
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.min_discount = self.min_discount;
        if !self.cost_metric.is_empty() {
            config.cost_metrics = self.cost_metric.iter().cloned().collect::<BTreeSet<_>>();
        }
        config
    }
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Metric-name parser for --cost-metric (token charset enforced up front).
pub fn parse_metric(s: &str) -> Result<MetricName, String> {
    s.parse::<MetricName>()
        .map_err(|e| format!("invalid metric name {s:?}: {e}"))
}

/// Parse argv and apply filesystem/offline checks. Bad flag syntax exits
/// via clap; these checks cover what clap cannot see.
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();

    for path in std::iter::once(&args.input).chain(args.out.as_ref()) {
        let shown = path.display().to_string();
        if dm_io::looks_like_url_strict(&shown) {
            return Err(CliError::NonLocalPath(shown));
        }
    }
    if !args.input.is_file() {
        return Err(CliError::NotFound(args.input.display().to_string()));
    }

    Ok(args)
}
