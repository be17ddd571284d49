//! Synthetic limit curves for drawing the funnel.
//!
//! The curves are not tied to any real area. Sample sizes are swept from
//! [`SweepConfig::start`] up to [`SweepConfig::end`] with a step that keeps
//! the resolution proportional to the spread of the observed populations.

use funnel_plot_area_models::{AreaRecord, RATE_MULTIPLIER, population_range};
use funnel_plot_limits_models::{LimitCurvePoint, ProbabilityThresholds, SweepConfig};

use crate::{LimitsError, continuity};

/// Computes the synthetic sample sizes of the sweep.
///
/// The step is `(max_population - min_population) / resolution`, rounded
/// half to even. When the observed populations are too close together for
/// a non-zero step, the full sweep range is divided by `resolution`
/// instead.
///
/// # Errors
///
/// Returns [`LimitsError::DegenerateSweep`] if the sweep configuration
/// cannot produce any sample sizes, and [`LimitsError::EmptyPopulation`]
/// for an empty dataset.
pub fn sample_sizes(areas: &[AreaRecord], sweep: &SweepConfig) -> Result<Vec<u64>, LimitsError> {
    if sweep.start == 0 {
        return Err(degenerate("start must be greater than zero"));
    }
    if sweep.start >= sweep.end {
        return Err(degenerate(format!(
            "start ({}) must be below end ({})",
            sweep.start, sweep.end
        )));
    }
    if sweep.resolution == 0 {
        return Err(degenerate("resolution must be greater than zero"));
    }

    let (min, max) = population_range(areas).ok_or(LimitsError::EmptyPopulation)?;

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let mut step = ((max - min) as f64 / sweep.resolution as f64).round_ties_even() as u64;

    if step == 0 {
        step = ((sweep.end - sweep.start) / sweep.resolution).max(1);
        log::warn!(
            "Population range {min}..={max} is too narrow for {} steps; sweeping with step {step}",
            sweep.resolution
        );
    }

    #[allow(clippy::cast_possible_truncation)]
    let sizes: Vec<u64> = (sweep.start..sweep.end).step_by(step as usize).collect();
    log::debug!("Sweeping {} sample sizes with step {step}", sizes.len());

    Ok(sizes)
}

/// Generates the four limit curves and the baseline, ascending by sample
/// size.
///
/// # Errors
///
/// Returns an error if the sweep is degenerate or `theta` is not a valid
/// probability.
pub fn generate(
    areas: &[AreaRecord],
    thresholds: &ProbabilityThresholds,
    theta: f64,
    sweep: &SweepConfig,
) -> Result<Vec<LimitCurvePoint>, LimitsError> {
    let average = theta * RATE_MULTIPLIER;

    let curve = sample_sizes(areas, sweep)?
        .into_iter()
        .map(|n| {
            Ok(LimitCurvePoint {
                n,
                limits: continuity::limits_at(n, thresholds, theta)?,
                average,
            })
        })
        .collect::<Result<Vec<_>, LimitsError>>()?;

    log::info!("Generated {} limit curve points", curve.len());

    Ok(curve)
}

fn degenerate(message: impl Into<String>) -> LimitsError {
    LimitsError::DegenerateSweep {
        message: message.into(),
    }
}
