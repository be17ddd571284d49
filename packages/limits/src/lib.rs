#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Funnel plot control limits (Spiegelhalter 2005, appendix A.1.1).
//!
//! Areas with small populations produce noisy rates, so comparing raw rates
//! flags small areas as outliers far too often. Funnel plots instead place
//! each area against control limits derived from a Binomial(n, θ) model at
//! the area's own population `n`, where θ is the pooled event proportion.
//!
//! The pipeline, in order:
//!
//! 1. [`baseline::estimate`] pools θ and counts areas with at least one event.
//! 2. [`thresholds::derive`] turns that count into Bonferroni-corrected tails.
//! 3. [`continuity::limits_at`] inverts the binomial CDF with a continuity
//!    correction so limits vary smoothly with `n`.
//! 4. [`curve::generate`] sweeps synthetic sample sizes for the chart.
//! 5. [`classify::classify`] places every area against its own limits.
//!
//! [`analyze`] runs all five and only returns once every step succeeded.

pub mod baseline;
pub mod classify;
pub mod continuity;
pub mod curve;
pub mod thresholds;

use funnel_plot_area_models::AreaRecord;
use funnel_plot_limits_models::{
    ClassifiedRecord, LimitCurvePoint, ProbabilityThresholds, SweepConfig,
};
use thiserror::Error;

pub use baseline::Baseline;

/// Errors that can occur while computing control limits.
#[derive(Debug, Error)]
pub enum LimitsError {
    /// The dataset's total population is zero, so θ is undefined.
    #[error("Total population is zero; cannot compute a baseline proportion")]
    EmptyPopulation,

    /// Summing a column across all areas overflowed.
    #[error("Total {column} across all areas does not fit in a 64-bit integer")]
    TotalOverflow {
        /// Column being summed.
        column: &'static str,
    },

    /// No area has any events, so the Bonferroni correction divides by zero.
    #[error("No area has any events; Bonferroni-corrected limits are undefined")]
    DegenerateBaseline,

    /// The sample-size sweep cannot make progress.
    #[error("Degenerate sample-size sweep: {message}")]
    DegenerateSweep {
        /// Which sweep parameter is unusable.
        message: String,
    },

    /// A binomial distribution was requested with zero trials.
    #[error("Sample size must be greater than zero")]
    InvalidSampleSize,

    /// The binomial distribution rejected its parameters.
    #[error("Invalid binomial distribution (n = {n}, theta = {theta}): {message}")]
    Distribution {
        /// Number of trials.
        n: u64,
        /// Success probability.
        theta: f64,
        /// Error reported by the distribution.
        message: String,
    },
}

/// Everything computed for one dataset.
#[derive(Debug, Clone)]
pub struct FunnelAnalysis {
    /// Pooled proportion and observation count.
    pub baseline: Baseline,
    /// Tail probabilities the limits were computed at.
    pub thresholds: ProbabilityThresholds,
    /// Synthetic limit curves, ascending by sample size.
    pub curve: Vec<LimitCurvePoint>,
    /// One classified record per input area, in input order.
    pub classified: Vec<ClassifiedRecord>,
}

/// Runs the full funnel plot computation over `areas`.
///
/// # Errors
///
/// Returns an error if the baseline, the thresholds, the sweep or any
/// binomial distribution is degenerate. Nothing is returned partially.
pub fn analyze(areas: &[AreaRecord], sweep: &SweepConfig) -> Result<FunnelAnalysis, LimitsError> {
    let baseline = baseline::estimate(areas)?;
    log::info!(
        "Baseline proportion {:.6} ({} of {} areas with events)",
        baseline.theta,
        baseline.observed_areas,
        areas.len()
    );

    let thresholds = thresholds::derive(baseline.observed_areas)?;
    log::debug!("Tail probabilities: {:?}", thresholds.as_array());

    let curve = curve::generate(areas, &thresholds, baseline.theta, sweep)?;
    let classified = classify::classify(areas, &thresholds, baseline.theta)?;

    Ok(FunnelAnalysis {
        baseline,
        thresholds,
        curve,
        classified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_plot_limits_models::Comparison;

    fn area(id: &str, events: u64, population: u64) -> AreaRecord {
        AreaRecord::new(Some(id.to_owned()), None, events, population).unwrap()
    }

    #[test]
    fn three_equal_areas() {
        let areas = vec![
            area("1", 50, 100_000),
            area("2", 5, 100_000),
            area("3", 500, 100_000),
        ];
        let sweep = SweepConfig {
            start: 100,
            end: 200_000,
            resolution: 500,
        };

        let analysis = analyze(&areas, &sweep).unwrap();

        assert!((analysis.baseline.theta - 555.0 / 300_000.0).abs() < 1e-15);
        assert_eq!(analysis.baseline.observed_areas, 3);
        assert!((analysis.thresholds.lower_bonferroni - 0.025 / 3.0).abs() < 1e-15);

        let comparisons: Vec<Comparison> =
            analysis.classified.iter().map(|c| c.comparison).collect();
        assert!(comparisons[1] <= Comparison::Low);
        assert!(comparisons[2] >= Comparison::High);
        assert!(!analysis.curve.is_empty());
    }

    #[test]
    fn no_events_fails_before_producing_output() {
        let areas = vec![area("1", 0, 1_000), area("2", 0, 2_000)];
        assert!(matches!(
            analyze(&areas, &SweepConfig::default()),
            Err(LimitsError::DegenerateBaseline)
        ));
    }

    #[test]
    fn empty_dataset_fails() {
        assert!(matches!(
            analyze(&[], &SweepConfig::default()),
            Err(LimitsError::EmptyPopulation)
        ));
    }
}
