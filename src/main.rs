//! CLI entry point for the EV sales insights tool.
//!
//! Loads the per-state sales dataset once, then answers one dashboard query
//! per invocation: sales map, growth map, gas price dashboard, state trend or
//! correlation analysis.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ev_sales_insights::config::{DashboardConfig, StateExclusion};
use ev_sales_insights::fetch::{BasicClient, DatasetSource, load_bytes};
use ev_sales_insights::output::{print_pretty, write_csv, write_json};
use ev_sales_insights::records::{Metric, RecordStore};
use ev_sales_insights::resolver;
use ev_sales_insights::views::{self, Table};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ev_sales_insights")]
#[command(about = "Analyze EV sales and gasoline prices by US state", long_about = None)]
struct Cli {
    /// Path or URL of the dataset CSV
    #[arg(short, long, global = true, default_value = "final_dataset.csv")]
    data: String,

    /// Optional JSON dashboard config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write the result rows to this CSV file instead of printing JSON
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the distinct years present in the dataset
    Years,
    /// List the known states with their codes and region ids
    States,
    /// EV/PHEV/HEV sales and gas price per state for one year
    SalesMap {
        /// Year to show (defaults to the latest year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Keep the states that the config excludes from the contiguous map
        #[arg(long, default_value_t = false)]
        all_states: bool,
    },
    /// Percent growth of one metric between two snapshot years
    Growth {
        /// Start snapshot year (overrides config)
        #[arg(long)]
        start: Option<i32>,

        /// End snapshot year (overrides config)
        #[arg(long)]
        end: Option<i32>,

        /// Metric to compare: gasoline-price, ev, phev or hev (overrides config)
        #[arg(short, long)]
        metric: Option<Metric>,
    },
    /// Latest-year gas price and EV sales, one row per region id
    Dashboard,
    /// Gas price and EV sales of one state across all years
    Trend {
        /// State name, e.g. "California"
        #[arg(short, long)]
        state: String,
    },
    /// Correlation between two fields and the top states for one year
    Analyze {
        /// Year to analyze (defaults to the latest year)
        #[arg(short, long)]
        year: Option<i32>,

        #[arg(long, default_value = "gasoline-price")]
        field_a: Metric,

        #[arg(long, default_value = "ev")]
        field_b: Metric,

        /// Metric used to rank states
        #[arg(long, default_value = "ev")]
        rank_by: Metric,

        /// Number of top states to list (overrides config)
        #[arg(short, long)]
        top: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/ev_sales_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ev_sales_insights.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    run(Cli::parse()).await
}

/// Answers one CLI query. Only commands that read the dataset load the config.
async fn run(cli: Cli) -> Result<()> {
    let output = cli.output.as_deref();

    // The state vocabulary is static, so listing it needs neither the dataset
    // nor the config.
    if matches!(cli.command, Commands::States) {
        let states: Vec<_> = resolver::all()
            .map(|s| StateRow {
                state: s.name,
                state_code: s.code,
                region_id: s.region_id,
            })
            .collect();
        return emit_rows(&states, output);
    }

    let mut config = DashboardConfig::load_or_default(cli.config.as_deref())?;

    let store = match load_store(&cli.data).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Error loading data");
            return Err(e);
        }
    };

    match cli.command {
        Commands::States => {}
        Commands::Years => {
            let years: Vec<_> = store
                .years()
                .into_iter()
                .map(|year| YearRow { year })
                .collect();
            emit_rows(&years, output)?;
        }
        Commands::SalesMap { year, all_states } => {
            let Some(year) = year.or_else(|| store.latest_year()) else {
                warn!("Dataset has no years, nothing to map");
                return Ok(());
            };
            if !store.years().contains(&year) {
                warn!(year, available = ?store.years(), "Year not present in dataset");
            }
            let exclusion = if all_states {
                StateExclusion::none()
            } else {
                config.excluded_states.clone()
            };
            info!(
                excluded = ?exclusion.iter().collect::<Vec<_>>(),
                "States left off the sales map"
            );
            emit(&views::sales_map(&store, year, &exclusion), output)?;
        }
        Commands::Growth { start, end, metric } => {
            if let Some(start) = start {
                config.growth_start_year = start;
            }
            if let Some(end) = end {
                config.growth_end_year = end;
            }
            if let Some(metric) = metric {
                config.growth_metric = metric;
            }
            emit(&views::growth_map(&store, &config), output)?;
        }
        Commands::Dashboard => {
            emit(&views::gas_price_dashboard(&store), output)?;
        }
        Commands::Trend { state } => {
            emit(&views::trend(&store, &state), output)?;
        }
        Commands::Analyze {
            year,
            field_a,
            field_b,
            rank_by,
            top,
        } => {
            let k = top.unwrap_or(config.top_k);
            let report = views::data_analysis(&store, year, field_a, field_b, rank_by, k);
            print_pretty(&report);

            match output {
                Some(path) => write_csv(path, &report.top_states)?,
                None => write_json(std::io::stdout().lock(), &report)?,
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct YearRow {
    year: i32,
}

#[derive(Serialize)]
struct StateRow {
    state: &'static str,
    state_code: &'static str,
    region_id: u32,
}

/// Loads the dataset from a local file path or over HTTP and builds the store.
#[tracing::instrument]
async fn load_store(location: &str) -> Result<RecordStore> {
    let source = DatasetSource::parse(location);
    let client = BasicClient::new()?;

    let bytes = load_bytes(&client, &source).await?;
    let store = RecordStore::from_csv_bytes(&bytes)
        .with_context(|| format!("Failed to parse dataset {source}"))?;

    info!(
        rows = store.len(),
        years = ?store.years(),
        remote = source.is_remote(),
        "Data loaded successfully"
    );
    Ok(store)
}

/// Prints a view as JSON, or writes its rows as CSV when `output` is set.
fn emit<T: Serialize>(table: &Table<T>, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => write_csv(path, &table.rows),
        None => write_json(std::io::stdout().lock(), table),
    }
}

fn emit_rows<T: Serialize>(rows: &[T], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => write_csv(path, rows),
        None => write_json(std::io::stdout().lock(), &rows),
    }
}
