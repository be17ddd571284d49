//! Ingest, analyze, export.
//!
//! Every computation finishes before the first file is written, so a
//! failing dataset never leaves partial output behind.

use std::path::Path;
use std::time::Instant;

use funnel_plot_export::{chart, results};
use funnel_plot_limits_models::Comparison;
use strum::IntoEnumIterator as _;

use crate::config::Settings;

/// Input and output locations for one run.
pub struct Paths<'a> {
    /// Area CSV to read.
    pub input: &'a Path,
    /// Results CSV to write.
    pub output: &'a Path,
    /// Optional limit curve CSV.
    pub curve: Option<&'a Path>,
    /// Optional chart description JSON.
    pub chart: Option<&'a Path>,
}

/// Runs the whole analysis.
///
/// # Errors
///
/// Returns an error if the input is invalid, the limits are degenerate, or
/// an output cannot be written.
pub fn run(
    paths: &Paths<'_>,
    settings: &Settings,
    delimiter: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let areas = funnel_plot_ingest::read_areas_from_path(paths.input, delimiter)?;
    let analysis = funnel_plot_limits::analyze(&areas, &settings.sweep)?;
    log::info!("Analysis finished in {:.2?}", start.elapsed());

    for comparison in Comparison::iter().filter(|c| c.is_outlier()) {
        let count = analysis
            .classified
            .iter()
            .filter(|c| c.comparison == comparison)
            .count();
        if count > 0 {
            log::info!("{comparison}: {count} areas");
        }
    }

    results::write_results_to_path(paths.output, &analysis.classified)?;
    if let Some(path) = paths.curve {
        results::write_curve_to_path(path, &analysis.curve)?;
    }
    if let Some(path) = paths.chart {
        let funnel = chart::build(&settings.title, &areas, &analysis.curve);
        chart::write_to_path(path, &funnel)?;
    }

    log::info!("Done in {:.2?}", start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use funnel_plot_limits::LimitsError;
    use funnel_plot_limits_models::SweepConfig;

    use super::*;

    fn settings() -> Settings {
        Settings {
            sweep: SweepConfig {
                start: 100,
                end: 10_000,
                resolution: 50,
            },
            ..Settings::default()
        }
    }

    #[test]
    fn degenerate_baseline_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("areas.csv");
        let output = dir.path().join("results.csv");
        let curve = dir.path().join("curve.csv");
        std::fs::write(
            &input,
            "area_id,events,population\na,0,100000\nb,0,200000\n",
        )
        .unwrap();

        let paths = Paths {
            input: &input,
            output: &output,
            curve: Some(&curve),
            chart: None,
        };
        let err = run(&paths, &settings(), b',').unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LimitsError>(),
            Some(LimitsError::DegenerateBaseline)
        ));
        assert!(!output.exists());
        assert!(!curve.exists());
    }

    #[test]
    fn writes_one_row_per_area_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("areas.csv");
        let output = dir.path().join("out").join("results.csv");
        let chart_path = dir.path().join("chart.json");
        std::fs::write(
            &input,
            "area_id,events,population\nc,185,100000\na,150,100000\nb,220,100000\n",
        )
        .unwrap();

        let paths = Paths {
            input: &input,
            output: &output,
            curve: None,
            chart: Some(&chart_path),
        };
        run(&paths, &settings(), b',').unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let ids: Vec<&str> = written
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);
        assert!(chart_path.exists());
    }
}
