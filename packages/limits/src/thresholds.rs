//! Bonferroni-corrected tail probabilities.
//!
//! Testing every area at 0.025/0.975 inflates the family-wise false
//! positive rate with the number of areas. The outer limits divide the
//! lower tail by the number of areas actually compared, i.e. those with at
//! least one event.

use funnel_plot_limits_models::{LOWER_TAIL, ProbabilityThresholds, UPPER_TAIL};

use crate::LimitsError;

/// Derives the four tail probabilities for `observed_areas` comparisons.
///
/// # Errors
///
/// Returns [`LimitsError::DegenerateBaseline`] if `observed_areas` is zero.
pub fn derive(observed_areas: usize) -> Result<ProbabilityThresholds, LimitsError> {
    if observed_areas == 0 {
        return Err(LimitsError::DegenerateBaseline);
    }

    #[allow(clippy::cast_precision_loss)]
    let lower_bonferroni = LOWER_TAIL / observed_areas as f64;

    Ok(ProbabilityThresholds {
        lower_bonferroni,
        lower: LOWER_TAIL,
        upper: UPPER_TAIL,
        upper_bonferroni: 1.0 - lower_bonferroni,
    })
}
