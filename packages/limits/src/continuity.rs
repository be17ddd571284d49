//! Continuity-corrected inverse binomial limits.
//!
//! The binomial quantile `q` is a step function of the target probability
//! `p`. Interpolating linearly inside the probability mass at `q` turns the
//! staircase into a continuous limit:
//!
//! ```text
//! count = q - (F(q) - p) / (F(q) - F(q - 1))
//! limit = count / n
//! ```

use funnel_plot_area_models::RATE_MULTIPLIER;
use funnel_plot_limits_models::{LimitSet, ProbabilityThresholds};
use statrs::distribution::{Binomial, DiscreteCDF as _};

use crate::LimitsError;

/// Returns the continuity-corrected limit at probability `p` as a
/// proportion in `[0, 1]`.
///
/// # Errors
///
/// Returns an error if `n` is zero or `theta` is not a valid probability.
pub fn corrected_proportion(p: f64, n: u64, theta: f64) -> Result<f64, LimitsError> {
    let dist = binomial(n, theta)?;
    #[allow(clippy::cast_precision_loss)]
    let proportion = corrected_count(&dist, n, p) / n as f64;
    Ok(proportion)
}

/// Computes all four control limits at sample size `n`, as rates per
/// 100,000.
///
/// # Errors
///
/// Returns an error if `n` is zero or `theta` is not a valid probability.
pub fn limits_at(
    n: u64,
    thresholds: &ProbabilityThresholds,
    theta: f64,
) -> Result<LimitSet, LimitsError> {
    let dist = binomial(n, theta)?;
    #[allow(clippy::cast_precision_loss)]
    let scale = RATE_MULTIPLIER / n as f64;
    let rate = |p: f64| corrected_count(&dist, n, p) * scale;

    Ok(LimitSet {
        lower_bonferroni: rate(thresholds.lower_bonferroni),
        lower: rate(thresholds.lower),
        upper: rate(thresholds.upper),
        upper_bonferroni: rate(thresholds.upper_bonferroni),
    })
}

fn binomial(n: u64, theta: f64) -> Result<Binomial, LimitsError> {
    if n == 0 {
        return Err(LimitsError::InvalidSampleSize);
    }
    Binomial::new(theta, n).map_err(|e| LimitsError::Distribution {
        n,
        theta,
        message: e.to_string(),
    })
}

/// Continuity-corrected event count at probability `p`, clamped to `[0, n]`.
#[allow(clippy::cast_precision_loss)]
fn corrected_count(dist: &Binomial, n: u64, p: f64) -> f64 {
    let q = binomial_quantile(dist, p);
    let cdf_q = dist.cdf(q);
    let cdf_below = if q == 0 { 0.0 } else { dist.cdf(q - 1) };

    interpolate(q as f64, cdf_q, cdf_below, p).clamp(0.0, n as f64)
}

/// Smallest `k` with `F(k) >= p`.
///
/// `inverse_cdf` bisects upward from zero and cannot return zero itself,
/// so that case is answered before inverting.
fn binomial_quantile(dist: &Binomial, p: f64) -> u64 {
    if p <= dist.cdf(0) {
        return 0;
    }
    dist.inverse_cdf(p)
}

/// Interpolates within the mass at `q`. Falls back to `q` itself when that
/// mass has underflowed to zero.
fn interpolate(q: f64, cdf_q: f64, cdf_below: f64, p: f64) -> f64 {
    let mass = cdf_q - cdf_below;
    if mass <= 0.0 {
        log::debug!("Zero probability mass at quantile {q} (p = {p}); using uncorrected quantile");
        return q;
    }
    q - (cdf_q - p) / mass
}
