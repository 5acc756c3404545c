use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lowtide::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lowtide")]
#[command(about = "Equity metrics and portfolio reports from end-of-day prices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //metrics for a single security
    Equity {
        //ticker symbol (eg aapl, spy)
        #[arg(long)]
        symbol: String,

        //directory of <TICKER>.csv files instead of the remote provider
        #[arg(long)]
        data_dir: Option<PathBuf>,

        //provider api key (falls back to TIINGO_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        //request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        //price paid per share, for relative shareholder return
        #[arg(long)]
        cost_basis: Option<f64>,

        //years of history used for volatility
        #[arg(long)]
        vol_years: Option<u32>,

        //also look up the close on this date (mm-dd-yyyy)
        #[arg(long)]
        price_on: Option<String>,
    },

    //portfolio report from a json configuration
    Report {
        //path to report configuration
        #[arg(long)]
        config: PathBuf,

        //output path for the json report (overrides the config)
        #[arg(long)]
        output_json: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Equity {
            symbol,
            data_dir,
            api_key,
            timeout,
            cost_basis,
            vol_years,
            price_on,
        } => {
            let config = ReportConfiguration {
                data_dir,
                api_key,
                request_timeout_secs: timeout,
                volatility_years: vol_years,
                holdings: vec![],
                output_json: None,
            };
            let source = config.build_source()?;
            run_equity(&symbol, source.as_ref(), cost_basis, vol_years, price_on)?;
        }
        Commands::Report {
            config,
            output_json,
        } => {
            run_report(&config, output_json)?;
        }
    }

    Ok(())
}

fn run_equity(
    symbol: &str,
    source: &dyn MarketDataSource,
    cost_basis: Option<f64>,
    vol_years: Option<u32>,
    price_on: Option<String>,
) -> Result<()> {
    let metrics = PriceSeriesMetrics::fetch(symbol, source)
        .with_context(|| format!("Failed to load price history for {}", symbol))?;

    println!(
        "{}: {} trading days, {} to {}\n",
        metrics.symbol(),
        metrics.series().len(),
        metrics.series().oldest().map(|r| r.date).unwrap_or(metrics.latest_date()),
        metrics.latest_date()
    );

    let summary = metrics.summary(cost_basis, vol_years)?;
    summary.pretty_print_table();

    if let Some(date) = price_on {
        match metrics.price_on(&date) {
            Some(price) => println!("\nClose on {}: ${:.2}", date, price),
            None => println!("\nClose on {}: n/a", date),
        }
    }

    Ok(())
}

fn run_report(config_path: &Path, output_json: Option<PathBuf>) -> Result<()> {
    let config = ReportConfiguration::from_json_file(config_path)?;
    let source = config.build_source()?;

    println!("Portfolio report ({} holdings)\n", config.holdings.len());

    let report = PortfolioReport::build(&config.holdings, source.as_ref(), config.volatility_years)?;
    report.pretty_print_table();

    if let Some(path) = output_json.or(config.output_json) {
        save_report_json(&report, &path)?;
        println!("\nReport saved to {:?}", path);
    }

    Ok(())
}

fn save_report_json(report: &PortfolioReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write report to {:?}", path))?;
    Ok(())
}
