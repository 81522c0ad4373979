//! # tourcast
//!
//! Command-line driver for weekly visitor forecasts.

mod format;

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use visitor_facade::{
    parse_week, BacktestConfig, ForecastConfig, ForecastOutcome, ForecasterBuilder, RawTable,
    SeriesLoader, StrategyKind, DEFAULT_LOOK_BACK,
};

#[derive(Parser)]
#[command(name = "tourcast")]
#[command(about = "Weekly visitor forecasts from search-interest history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast visitors for one location
    Forecast {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Re-forecast the weeks before the start date and compare with actuals
    Backtest {
        #[command(flatten)]
        run: RunArgs,

        /// Noise seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Weeks before the start date to re-forecast
        #[arg(long, default_value_t = DEFAULT_LOOK_BACK)]
        look_back: usize,
    },

    /// List the locations present in an input file
    Locations {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Date column name
        #[arg(long, default_value = "Week")]
        date_column: String,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Input CSV file (one date column, one column per location)
    #[arg(short, long)]
    input: PathBuf,

    /// Location column to forecast
    #[arg(short, long)]
    location: String,

    /// First forecast week (dd-mm-YYYY); defaults to the week after the last observation
    #[arg(long)]
    start: Option<String>,

    /// Number of weeks to forecast
    #[arg(short, long)]
    steps: Option<usize>,

    /// Train on only the last N observations
    #[arg(short, long)]
    window: Option<usize>,

    /// Strategy to include (repeatable)
    #[arg(long = "strategy")]
    strategies: Vec<StrategyKind>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the outcome as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    /// Configuration file layered with command-line overrides.
    fn config(&self) -> Result<ForecastConfig> {
        let mut config = match &self.config {
            Some(path) => ForecastConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {:?}", path))?,
            None => ForecastConfig::default(),
        };
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        if let Some(window) = self.window {
            config.window = Some(window);
        }
        if !self.strategies.is_empty() {
            config.strategies = self.strategies.clone();
        }
        Ok(config)
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "visitor_core=info,tourcast=info".into()),
        )
        .init();
}

/// Build the forecaster, load the series and run one forecast.
fn run(args: &RunArgs, config: ForecastConfig) -> Result<ForecastOutcome> {
    let forecaster = ForecasterBuilder::from_config(config)
        .build()
        .context("Invalid configuration")?;

    let table = RawTable::from_path(&args.input)
        .with_context(|| format!("Failed to read {:?}", args.input))?;
    let series = forecaster
        .loader()
        .load(&table, &args.location)
        .with_context(|| format!("Failed to load location '{}'", args.location))?;

    let start: NaiveDate = match &args.start {
        Some(text) => parse_week(text)?,
        None => match series.last_week() {
            Some(last) => last + chrono::Duration::weeks(1),
            None => bail!("Series for '{}' is empty", args.location),
        },
    };

    info!(
        location = %args.location,
        observations = series.len(),
        start = %start,
        "running forecast"
    );

    forecaster
        .forecast(&series, start)
        .with_context(|| format!("Forecast failed for '{}'", args.location))
}

/// Print the outcome and optionally write it to a JSON file.
fn write_outcome(args: &RunArgs, outcome: &ForecastOutcome) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        println!("{}", format::render_outcome(outcome));
    }

    if let Some(path) = &args.output {
        let mut file =
            File::create(path).with_context(|| format!("Failed to create output {:?}", path))?;
        serde_json::to_writer_pretty(&mut file, outcome)
            .with_context(|| format!("Failed to write JSON to {:?}", path))?;
        println!("Outcome written to {:?}", path);
    }

    Ok(())
}

fn run_forecast(args: RunArgs) -> Result<()> {
    let config = args.config()?;
    let outcome = run(&args, config)?;
    write_outcome(&args, &outcome)
}

fn run_backtest(args: RunArgs, seed: Option<u64>, look_back: usize) -> Result<()> {
    let mut config = args.config()?;
    config.backtest = BacktestConfig {
        enabled: true,
        seed,
        look_back,
    };

    let outcome = run(&args, config)?;
    write_outcome(&args, &outcome)?;

    if !args.json {
        match outcome.summary() {
            Some(summary) => println!("\n{}", format::render_summary(&summary)),
            None => println!("\nNo actuals overlap the forecast weeks"),
        }
    }

    Ok(())
}

fn run_locations(input: PathBuf, date_column: String) -> Result<()> {
    let table =
        RawTable::from_path(&input).with_context(|| format!("Failed to read {:?}", input))?;
    let locations = SeriesLoader::new()
        .with_date_column(date_column)
        .locations(&table);

    if locations.is_empty() {
        bail!("No location columns found in {:?}", input);
    }
    for location in locations {
        println!("{}", location);
    }
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Forecast { run } => run_forecast(run),
        Commands::Backtest {
            run,
            seed,
            look_back,
        } => run_backtest(run, seed, look_back),
        Commands::Locations { input, date_column } => run_locations(input, date_column),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
