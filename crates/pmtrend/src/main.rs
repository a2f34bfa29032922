use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use pmtrend_core::aggregate::GroupBy;
use pmtrend_core::compare::Statistic;
use pmtrend_core::config::{PeriodSource, PipelineConfig};
use pmtrend_core::overlap::RankBy;
use pmtrend_core::pipeline;
use pmtrend_core::MergedDataset;
use pmtrend_parser::{HeaderSource, SiteKey};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser, Debug)]
#[command(author, version, about = "Merge and summarize yearly PM2.5 monitor extracts", long_about = None)]
struct Cli {
    /// Pipeline configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Period file as LABEL=PATH; may be repeated and is appended after configured periods
    #[arg(long = "period", global = true, value_name = "LABEL=PATH")]
    periods: Vec<PeriodSource>,
    /// Read EPA AQS RD files (header in the leading `# RD|...` comment)
    #[arg(long, global = true)]
    aqs: bool,
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grouped summary statistics of the sample value
    Summary(SummaryArgs),
    /// Missing and negative rates per period, with ingest counts
    Quality,
    /// Rank sites observed in both periods within one state
    Sites(SitesArgs),
    /// Per-period statistics for one monitor
    Site(SiteArgs),
    /// Paired before/after comparison between two periods
    Compare(CompareArgs),
    /// Named values for narrative reports
    Report(ReportArgs),
    /// Write Parquet frames and the report values to a directory
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// Grouping dimensions, comma separated (period, state, site, month)
    #[arg(long, value_delimiter = ',', default_value = "period")]
    pub by: Vec<GroupBy>,
}

#[derive(Args, Debug)]
pub(crate) struct SitesArgs {
    /// State code to search
    #[arg(long)]
    pub state: u32,
    /// Earlier period label; defaults to the first loaded period
    #[arg(long)]
    pub first: Option<String>,
    /// Later period label; defaults to the last loaded period
    #[arg(long)]
    pub second: Option<String>,
    #[arg(long, default_value = "weakest")]
    pub rank: RankBy,
    /// Show at most this many candidates
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct SiteArgs {
    /// Monitor key, e.g. 36-063-2008
    #[arg(long)]
    pub site: SiteKey,
    /// Print every dated observation instead of per-period statistics
    #[arg(long)]
    pub series: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    #[arg(long, default_value = "state")]
    pub by: GroupBy,
    #[arg(long)]
    pub first: Option<String>,
    #[arg(long)]
    pub second: Option<String>,
    #[arg(long, default_value = "mean")]
    pub stat: Statistic,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Include overlap values for this state
    #[arg(long)]
    pub state: Option<u32>,
    /// Include per-period values for this monitor
    #[arg(long)]
    pub site: Option<SiteKey>,
    #[arg(long)]
    pub first: Option<String>,
    #[arg(long)]
    pub second: Option<String>,
    #[arg(long, default_value = "weakest")]
    pub rank: RankBy,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Output directory, created if absent
    #[arg(long)]
    pub out: PathBuf,
    /// Grouping for the exported summary frame
    #[arg(long, value_delimiter = ',', default_value = "period,state")]
    pub by: Vec<GroupBy>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let dataset = load(&config)?;
    let json = cli.json;

    match cli.command {
        Command::Summary(args) => commands::summary(&dataset, &args, json),
        Command::Quality => commands::quality(&dataset, &config, json),
        Command::Sites(args) => commands::sites(&dataset, &args, json),
        Command::Site(args) => commands::site(&dataset, &args, json),
        Command::Compare(args) => commands::compare(&dataset, &args, json),
        Command::Report(args) => commands::report(&dataset, &args, json),
        Command::Export(args) => commands::export(&dataset, &args),
    }
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if cli.aqs {
        config.reader.header = HeaderSource::LeadingComment;
    }
    config.periods.extend(cli.periods.iter().cloned());

    if config.periods.is_empty() {
        bail!("no period files given; pass --config or at least one --period LABEL=PATH");
    }
    Ok(config)
}

fn load(config: &PipelineConfig) -> Result<MergedDataset> {
    let run = pipeline::run(config).context("failed to load period files")?;
    for failure in &run.failures {
        warn!(period = %failure.period, error = %failure.error, "period not loaded");
    }
    info!(
        periods = run.dataset.periods().len(),
        rows = run.dataset.len(),
        "dataset ready"
    );
    Ok(run.dataset)
}
