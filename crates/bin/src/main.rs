//! Nadir CLI binary.
//!
//! Shock scenarios, weight sensitivity and rolling beta for an index and one
//! of its constituents.

mod source;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nadir::{AnalysisConfig, ShockAnalysis, ShockAnalysisReport, latest_beta_readings};
use nadir_output::{ExportFormat, Exporter, Render};
use nadir_scenario::SensitivityMetric;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nadir")]
#[command(about = "Nadir: index drawdown under a single-constituent shock", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file; flags override its fields
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Read prices from a CSV (date,<index>,<constituent>) instead of fetching
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Index ticker; also names the CSV column and the scenario labels
    #[arg(long)]
    index: Option<String>,

    /// Constituent ticker; also names the CSV column
    #[arg(long)]
    constituent: Option<String>,

    /// First date of price history (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date of price history (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Constant constituent weight, e.g. 0.07
    #[arg(long)]
    weight: Option<f64>,

    /// Shock date (YYYY-MM-DD)
    #[arg(long)]
    shock_date: Option<NaiveDate>,

    /// Comma-separated one-day shocks, e.g. -0.3,-0.2,0
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    shocks: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate shocks to the constituent and report index drawdowns
    Shock {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write summary, return and growth tables into this directory
        #[arg(long)]
        export: Option<PathBuf>,

        /// File format for --export (csv, json, pretty-json)
        #[arg(long, default_value = "csv")]
        export_format: ExportFormat,
    },

    /// Re-run the shocks under several assumed weights
    Sensitivity {
        #[command(flatten)]
        input: InputArgs,

        /// Comma-separated constant weights
        #[arg(long, value_delimiter = ',')]
        weights: Option<Vec<f64>>,

        /// Metric shown in the grid
        #[arg(long, default_value = "max_drawdown_pct")]
        metric: SensitivityMetric,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Rolling beta of the index on the constituent
    Beta {
        #[command(flatten)]
        input: InputArgs,

        /// Rolling window in trading days; repeat or comma-separate for several
        #[arg(long, value_delimiter = ',')]
        window: Option<Vec<usize>>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let base = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };

    match cli.command {
        Commands::Shock {
            input,
            format,
            export,
            export_format,
        } => {
            let config = apply_overrides(base, &input);
            let analysis = ShockAnalysis::new(config)?;
            let prices = source::load_prices(analysis.config(), input.prices.as_deref()).await?;
            let report = analysis.run(&prices)?;

            print_shock_report(&report, format)?;
            if let Some(dir) = export {
                export_report(&report, &dir, export_format)?;
            }
        }
        Commands::Sensitivity {
            input,
            weights,
            metric,
            format,
        } => {
            let mut config = apply_overrides(base, &input);
            if let Some(weights) = weights {
                config = config.with_sensitivity_weights(weights);
            }
            let analysis = ShockAnalysis::new(config)?;
            let prices = source::load_prices(analysis.config(), input.prices.as_deref()).await?;
            let table = analysis.sensitivity(&prices)?;
            let grid = table.pivot(metric)?;

            match format {
                OutputFormat::Text => println!("{}", grid.to_ascii_table()),
                OutputFormat::Markdown => println!("{}", grid.to_markdown()),
                OutputFormat::Json => {
                    println!("{}", grid.export_to_string(ExportFormat::PrettyJson)?);
                }
            }
        }
        Commands::Beta {
            input,
            window,
            format,
        } => {
            let mut config = apply_overrides(base, &input);
            if let Some(windows) = window {
                config = config.with_beta_windows(windows);
            }
            let analysis = ShockAnalysis::new(config)?;
            let prices = source::load_prices(analysis.config(), input.prices.as_deref()).await?;
            let betas = analysis.betas(&prices)?;
            let readings = latest_beta_readings(&betas);

            if readings.len() < betas.len() {
                tracing::warn!(
                    requested = betas.len(),
                    defined = readings.len(),
                    "some windows are longer than the available history"
                );
            }

            match format {
                OutputFormat::Text => println!("{}", readings.to_ascii_table()),
                OutputFormat::Markdown => println!("{}", readings.to_markdown()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&readings)?),
            }
        }
    }

    Ok(())
}

fn apply_overrides(mut config: AnalysisConfig, input: &InputArgs) -> AnalysisConfig {
    if let Some(index) = &input.index {
        let name = display_name(index);
        config.index_symbol = index.clone();
        config.label_prefix = format!("{}_shock_", name);
        config.index_name = name;
    }
    if let Some(constituent) = &input.constituent {
        config.constituent_symbol = constituent.clone();
        config.constituent_name = display_name(constituent);
    }
    if let Some(start) = input.start {
        config.start_date = start;
    }
    if input.end.is_some() {
        config.end_date = input.end;
    }
    if let Some(weight) = input.weight {
        config = config.with_weight(weight);
    }
    if let Some(shock_date) = input.shock_date {
        config = config.with_shock_date(shock_date);
    }
    if let Some(shocks) = &input.shocks {
        config = config.with_shock_returns(shocks.clone());
    }
    config
}

/// Column and label name for a ticker: `^NDX` -> `NDX`.
fn display_name(symbol: &str) -> String {
    symbol.trim_start_matches('^').to_string()
}

fn print_shock_report(
    report: &ShockAnalysisReport,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let betas = report.latest_betas();

    match format {
        OutputFormat::Text => {
            println!("{}", report.summary.to_ascii_table());
            println!("{}", report.index_drawdown.to_ascii_table());
            if !betas.is_empty() {
                println!("{}", betas.to_ascii_table());
            }
        }
        OutputFormat::Markdown => {
            println!("# Shock Analysis\n");
            println!("{}", report.summary.to_markdown());
            println!("{}", report.index_drawdown.to_markdown());
            if !betas.is_empty() {
                println!("{}", betas.to_markdown());
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "summary": report.summary.rows(),
                "index_drawdown": report.index_drawdown,
                "betas": betas,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn export_report(
    report: &ShockAnalysisReport,
    dir: &Path,
    format: ExportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let path = |stem: &str| dir.join(format!("{}.{}", stem, format.extension()));

    report.summary.export_to_file(&path("summary"), format)?;
    report.returns.export_to_file(&path("returns"), format)?;
    report.scenarios.export_to_file(&path("scenario_returns"), format)?;
    report.growth.export_to_file(&path("scenario_growth"), format)?;
    report
        .index_drawdown
        .metrics
        .export_to_file(&path("index_drawdown"), format)?;

    tracing::info!(dir = %dir.display(), "exported shock analysis");
    println!("Exported results to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shock_flags() {
        let cli = Cli::try_parse_from([
            "nadir",
            "shock",
            "--shock-date",
            "2024-08-05",
            "--shocks",
            "-0.3,-0.1,0",
            "--weight",
            "0.065",
            "--format",
            "markdown",
        ])
        .unwrap();

        let Commands::Shock { input, format, .. } = cli.command else {
            panic!("expected shock subcommand");
        };
        assert_eq!(format, OutputFormat::Markdown);

        let config = apply_overrides(AnalysisConfig::default(), &input);
        assert_eq!(config.shock_returns, vec![-0.3, -0.1, 0.0]);
        assert_eq!(config.shock_date, NaiveDate::from_ymd_opt(2024, 8, 5).unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ticker_flags_rename_columns_and_labels() {
        let cli = Cli::try_parse_from([
            "nadir",
            "shock",
            "--index",
            "^NDX",
            "--constituent",
            "AAPL",
            "--prices",
            "prices.csv",
        ])
        .unwrap();
        let Commands::Shock { input, .. } = cli.command else {
            panic!("expected shock subcommand");
        };

        let config = apply_overrides(AnalysisConfig::default(), &input);
        assert_eq!(config.index_symbol, "^NDX");
        assert_eq!(config.index_name, "NDX");
        assert_eq!(config.label_prefix, "NDX_shock_");
        assert_eq!(config.constituent_symbol, "AAPL");
        assert_eq!(config.constituent_name, "AAPL");
    }

    #[test]
    fn test_parse_beta_windows() {
        let cli = Cli::try_parse_from(["nadir", "beta", "--window", "20,60", "--verbose"]).unwrap();
        assert!(cli.verbose);
        let Commands::Beta { window, .. } = cli.command else {
            panic!("expected beta subcommand");
        };
        assert_eq!(window, Some(vec![20, 60]));
    }

    #[test]
    fn test_unknown_metric_rejected() {
        let parsed =
            Cli::try_parse_from(["nadir", "sensitivity", "--metric", "sharpe_ratio"]);
        assert!(parsed.is_err());
    }
}
