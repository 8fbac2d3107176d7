//! Solar surplus storage simulator entry point: CLI wiring and report output.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use solar_surplus_sim::analysis::{AnalysisReport, Selection, run_analysis};
use solar_surplus_sim::config::StorageConfig;
use solar_surplus_sim::io::export::{
    export_battery_csv, export_battery_periods_csv, export_boiler_csv, export_boiler_periods_csv,
};
use solar_surplus_sim::io::import::read_series_file;
use solar_surplus_sim::logging::init_tracing;
use solar_surplus_sim::series::{DataSummary, HourlyAverage, InputSeries, SeasonalAverage};
use solar_surplus_sim::sim::aggregate::{BatteryTotals, BoilerTotals, Period, PeriodSummary};
use solar_surplus_sim::sim::battery::BatterySummary;
use solar_surplus_sim::sim::boiler::BoilerSummary;
use solar_surplus_sim::synthetic::{DemoProfile, generate};

#[derive(Parser)]
#[command(name = "solar-surplus-sim")]
#[command(
    about = "Estimate savings from storing solar surplus in a battery or hot-water boiler",
    long_about = None
)]
struct Cli {
    /// CSV with Date/Time, Energy Produced (Wh), Energy Consumed (Wh)
    #[arg(short, long, conflicts_with = "demo_days")]
    input: Option<PathBuf>,

    /// Generate this many days of synthetic data instead of reading a CSV
    #[arg(long, default_value_t = 7)]
    demo_days: u32,

    /// First day of synthetic data
    #[arg(long, default_value = "2024-06-01")]
    demo_start: NaiveDate,

    /// Seed for synthetic data
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// TOML configuration file
    #[arg(short, long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in configuration: default, small_home, large_home
    #[arg(long)]
    preset: Option<String>,

    /// Strategies to evaluate: battery, boiler, both
    #[arg(long, default_value = "both")]
    storage: Selection,

    /// Aggregation period: daily, weekly, monthly
    #[arg(long, default_value = "daily")]
    period: Period,

    /// Directory for per-interval and aggregated CSV tables
    #[arg(long)]
    results_out: Option<PathBuf>,

    /// Path for a JSON file with summaries and aggregated tables
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

/// Machine-readable summary written by `--summary-json`.
#[derive(Serialize)]
struct JsonSummary<'a> {
    period: Period,
    intervals: usize,
    data: &'a DataSummary,
    hourly_averages: &'a [HourlyAverage],
    seasonal_averages: &'a [SeasonalAverage],
    battery: Option<&'a BatterySummary>,
    battery_periods: Option<&'a [PeriodSummary<BatteryTotals>]>,
    boiler: Option<&'a BoilerSummary>,
    boiler_periods: Option<&'a [PeriodSummary<BoilerTotals>]>,
}

impl<'a> From<&'a AnalysisReport> for JsonSummary<'a> {
    fn from(report: &'a AnalysisReport) -> Self {
        Self {
            period: report.period,
            intervals: report.intervals,
            data: &report.data,
            hourly_averages: &report.hourly,
            seasonal_averages: &report.seasonal,
            battery: report.battery.as_ref().map(|b| &b.outcome.summary),
            battery_periods: report.battery.as_ref().map(|b| b.periods.as_slice()),
            boiler: report.boiler.as_ref().map(|b| &b.outcome.summary),
            boiler_periods: report.boiler.as_ref().map(|b| b.periods.as_slice()),
        }
    }
}

fn load_config(cli: &Cli) -> Result<StorageConfig> {
    // --config takes priority, then --preset, then the default household
    let config = if let Some(path) = &cli.config {
        StorageConfig::from_toml_file(path)?
    } else if let Some(name) = &cli.preset {
        StorageConfig::from_preset(name)?
    } else {
        StorageConfig::default()
    };

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("invalid configuration ({} errors)", errors.len());
    }
    Ok(config)
}

fn load_series(cli: &Cli) -> Result<InputSeries> {
    match &cli.input {
        Some(path) => read_series_file(path)
            .with_context(|| format!("failed to load input from {}", path.display())),
        None => {
            let start = cli
                .demo_start
                .and_hms_opt(0, 0, 0)
                .context("invalid demo start date")?;
            info!(days = cli.demo_days, seed = cli.seed, "generating synthetic series");
            Ok(generate(start, cli.demo_days, &DemoProfile::default(), cli.seed))
        }
    }
}

fn write_tables(report: &AnalysisReport, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    if let Some(battery) = &report.battery {
        let rows = dir.join("battery.csv");
        export_battery_csv(&battery.outcome.rows, &rows)
            .with_context(|| format!("failed to write {}", rows.display()))?;
        let periods = dir.join(format!("battery_{}.csv", report.period));
        export_battery_periods_csv(&battery.periods, &periods)
            .with_context(|| format!("failed to write {}", periods.display()))?;
    }
    if let Some(boiler) = &report.boiler {
        let rows = dir.join("boiler.csv");
        export_boiler_csv(&boiler.outcome.rows, &rows)
            .with_context(|| format!("failed to write {}", rows.display()))?;
        let periods = dir.join(format!("boiler_{}.csv", report.period));
        export_boiler_periods_csv(&boiler.periods, &periods)
            .with_context(|| format!("failed to write {}", periods.display()))?;
    }
    eprintln!("Tables written to {}", dir.display());
    Ok(())
}

fn write_summary_json(report: &AnalysisReport, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &JsonSummary::from(report))
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("Summary written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let series = load_series(&cli)?;

    let report = run_analysis(&config, &series, cli.period, cli.storage);
    println!("{report}");

    if let Some(dir) = &cli.results_out {
        write_tables(&report, dir)?;
    }
    if let Some(path) = &cli.summary_json {
        write_summary_json(&report, path)?;
    }
    Ok(())
}
