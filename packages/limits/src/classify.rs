//! Outlier classification of each area against limits at its own
//! population.

use funnel_plot_area_models::AreaRecord;
use funnel_plot_limits_models::{ClassifiedRecord, Comparison, ProbabilityThresholds};

use crate::{LimitsError, continuity};

/// Classifies every area, preserving input order.
///
/// # Errors
///
/// Returns an error if `theta` is not a valid probability.
pub fn classify(
    areas: &[AreaRecord],
    thresholds: &ProbabilityThresholds,
    theta: f64,
) -> Result<Vec<ClassifiedRecord>, LimitsError> {
    let classified = areas
        .iter()
        .map(|area| classify_area(area, thresholds, theta))
        .collect::<Result<Vec<_>, _>>()?;

    let outliers = classified
        .iter()
        .filter(|c| c.comparison.is_outlier())
        .count();
    log::info!("Classified {} areas, {outliers} outside the 95% limits", classified.len());

    Ok(classified)
}

/// Classifies a single area.
///
/// # Errors
///
/// Returns an error if `theta` is not a valid probability.
pub fn classify_area(
    area: &AreaRecord,
    thresholds: &ProbabilityThresholds,
    theta: f64,
) -> Result<ClassifiedRecord, LimitsError> {
    let limits = continuity::limits_at(area.population, thresholds, theta)?;
    let comparison = Comparison::classify(area.rate, &limits);

    if comparison.is_outlier() {
        log::debug!(
            "{}: rate {:.2} classified as {comparison:?}",
            area.label(),
            area.rate
        );
    }

    Ok(ClassifiedRecord {
        area: area.clone(),
        limits,
        comparison,
    })
}
