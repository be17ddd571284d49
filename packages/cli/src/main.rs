#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for funnel plot analysis.
//!
//! Reads a CSV of areas, computes continuity-corrected binomial control
//! limits, classifies each area, and exports the results alongside the
//! limit curves and a chart description.

mod config;
mod pipeline;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "funnel_plot", about = "Funnel plot control limits and outlier detection")]
struct Cli {
    /// CSV with `area_id` and/or `area_name`, `events` and `population` columns
    #[arg(long)]
    input: PathBuf,
    /// Where to write the classified areas (CSV)
    #[arg(long)]
    output: PathBuf,
    /// Where to write the limit curves (CSV)
    #[arg(long)]
    curve: Option<PathBuf>,
    /// Where to write the chart description (JSON)
    #[arg(long)]
    chart: Option<PathBuf>,
    /// TOML file with sweep and chart settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// First sample size of the limit curve sweep
    #[arg(long)]
    sweep_start: Option<u64>,
    /// Exclusive upper bound of the limit curve sweep
    #[arg(long)]
    sweep_end: Option<u64>,
    /// Number of steps the observed population range is divided into
    #[arg(long)]
    resolution: Option<u64>,
    /// Chart title
    #[arg(long)]
    title: Option<String>,
    /// Input field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => config::load(path)?,
        None => config::Settings::default(),
    };
    settings.apply_overrides(config::Overrides {
        sweep_start: cli.sweep_start,
        sweep_end: cli.sweep_end,
        resolution: cli.resolution,
        title: cli.title,
    });

    let delimiter = u8::try_from(cli.delimiter).map_err(|_| {
        format!(
            "delimiter must be a single-byte character, got {:?}",
            cli.delimiter
        )
    })?;

    let paths = pipeline::Paths {
        input: &cli.input,
        output: &cli.output,
        curve: cli.curve.as_deref(),
        chart: cli.chart.as_deref(),
    };

    pipeline::run(&paths, &settings, delimiter)
}
