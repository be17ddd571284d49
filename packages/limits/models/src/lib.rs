#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Control limit types for funnel plots.
//!
//! Holds the tail probabilities used for the 95% limits (with and without
//! Bonferroni correction), the limit values themselves, the synthetic
//! curve points drawn on the chart, and the per-area outlier comparison.

use funnel_plot_area_models::AreaRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter};

/// Lower tail probability of the uncorrected 95% limits.
pub const LOWER_TAIL: f64 = 0.025;

/// Upper tail probability of the uncorrected 95% limits.
pub const UPPER_TAIL: f64 = 0.975;

/// Tail probabilities for the four control limits, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityThresholds {
    /// Bonferroni-corrected lower tail (`0.025 / observed_areas`).
    pub lower_bonferroni: f64,
    /// Uncorrected lower tail (`0.025`).
    pub lower: f64,
    /// Uncorrected upper tail (`0.975`).
    pub upper: f64,
    /// Bonferroni-corrected upper tail (`1 - lower_bonferroni`).
    pub upper_bonferroni: f64,
}

impl ProbabilityThresholds {
    /// Returns the four probabilities in ascending order.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 4] {
        [
            self.lower_bonferroni,
            self.lower,
            self.upper,
            self.upper_bonferroni,
        ]
    }
}

/// The four control limits at one sample size, as rates per 100,000.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitSet {
    /// Lower 95% limit with Bonferroni correction.
    pub lower_bonferroni: f64,
    /// Lower 95% limit.
    pub lower: f64,
    /// Upper 95% limit.
    pub upper: f64,
    /// Upper 95% limit with Bonferroni correction.
    pub upper_bonferroni: f64,
}

/// One point of the synthetic limit curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitCurvePoint {
    /// Sample size the limits were computed at.
    pub n: u64,
    /// Control limits at `n`.
    pub limits: LimitSet,
    /// Baseline rate per 100,000 (constant across the curve).
    pub average: f64,
}

/// Where an area's observed rate falls relative to its control limits.
///
/// Variants are ordered from lowest to highest rate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
)]
pub enum Comparison {
    /// Below the Bonferroni-corrected lower limit.
    #[serde(rename = "Very low (below 0.025 Bonferroni)")]
    #[strum(serialize = "Very low (below 0.025 Bonferroni)")]
    VeryLow,
    /// Below the lower 95% limit only.
    #[serde(rename = "Low (below 0.025)")]
    #[strum(serialize = "Low (below 0.025)")]
    Low,
    /// Inside the 95% limits. Rendered as an empty label.
    #[serde(rename = "")]
    #[strum(serialize = "")]
    WithinLimits,
    /// Above the upper 95% limit only.
    #[serde(rename = "High (above 0.975)")]
    #[strum(serialize = "High (above 0.975)")]
    High,
    /// Above the Bonferroni-corrected upper limit.
    #[serde(rename = "Very high (above 0.975 Bonferroni)")]
    #[strum(serialize = "Very high (above 0.975 Bonferroni)")]
    VeryHigh,
}

impl Comparison {
    /// Places `rate` against `limits`.
    ///
    /// Checks run from the highest band down, so when limits at a tiny
    /// sample size cross each other the higher band still wins.
    #[must_use]
    pub fn classify(rate: f64, limits: &LimitSet) -> Self {
        if rate > limits.upper_bonferroni {
            Self::VeryHigh
        } else if rate > limits.upper {
            Self::High
        } else if rate >= limits.lower {
            Self::WithinLimits
        } else if rate >= limits.lower_bonferroni {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    /// Whether the area falls outside the 95% limits.
    #[must_use]
    pub const fn is_outlier(self) -> bool {
        !matches!(self, Self::WithinLimits)
    }
}

/// An area together with the limits at its own population and its
/// resulting [`Comparison`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRecord {
    /// The input area.
    pub area: AreaRecord,
    /// Control limits at `area.population`.
    pub limits: LimitSet,
    /// Outlier classification of `area.rate`.
    pub comparison: Comparison,
}

/// Parameters of the synthetic sample-size sweep used for the limit curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// First sample size of the sweep.
    #[serde(default = "default_start")]
    pub start: u64,
    /// Exclusive upper bound of the sweep.
    #[serde(default = "default_end")]
    pub end: u64,
    /// Number of steps the observed population range is divided into.
    #[serde(default = "default_resolution")]
    pub resolution: u64,
}

const fn default_start() -> u64 {
    100
}

const fn default_end() -> u64 {
    16_000_000
}

const fn default_resolution() -> u64 {
    500
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            resolution: default_resolution(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator as _;

    const LIMITS: LimitSet = LimitSet {
        lower_bonferroni: 10.0,
        lower: 20.0,
        upper: 40.0,
        upper_bonferroni: 50.0,
    };

    #[test]
    fn classifies_each_band() {
        assert_eq!(Comparison::classify(5.0, &LIMITS), Comparison::VeryLow);
        assert_eq!(Comparison::classify(15.0, &LIMITS), Comparison::Low);
        assert_eq!(Comparison::classify(30.0, &LIMITS), Comparison::WithinLimits);
        assert_eq!(Comparison::classify(45.0, &LIMITS), Comparison::High);
        assert_eq!(Comparison::classify(55.0, &LIMITS), Comparison::VeryHigh);
    }

    #[test]
    fn boundaries_are_closed_towards_the_centre() {
        assert_eq!(Comparison::classify(10.0, &LIMITS), Comparison::Low);
        assert_eq!(Comparison::classify(20.0, &LIMITS), Comparison::WithinLimits);
        assert_eq!(Comparison::classify(40.0, &LIMITS), Comparison::WithinLimits);
        assert_eq!(Comparison::classify(50.0, &LIMITS), Comparison::High);
    }

    #[test]
    fn crossed_limits_favour_the_higher_band() {
        let crossed = LimitSet {
            lower_bonferroni: 0.0,
            lower: 30.0,
            upper: 10.0,
            upper_bonferroni: 60.0,
        };
        assert_eq!(Comparison::classify(20.0, &crossed), Comparison::High);
    }

    #[test]
    fn labels() {
        let labels: Vec<String> = Comparison::iter().map(|c| c.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "Very low (below 0.025 Bonferroni)",
                "Low (below 0.025)",
                "",
                "High (above 0.975)",
                "Very high (above 0.975 Bonferroni)",
            ]
        );
    }

    #[test]
    fn only_within_limits_is_not_an_outlier() {
        for comparison in Comparison::iter() {
            assert_eq!(
                comparison.is_outlier(),
                comparison != Comparison::WithinLimits
            );
        }
    }

    #[test]
    fn sweep_config_defaults_fill_missing_fields() {
        let config: SweepConfig =
            serde_json::from_str(r#"{"end": 2000000}"#).unwrap();
        assert_eq!(
            config,
            SweepConfig {
                start: 100,
                end: 2_000_000,
                resolution: 500,
            }
        );
    }

    #[test]
    fn comparison_serializes_to_label() {
        assert_eq!(
            serde_json::to_string(&Comparison::WithinLimits).unwrap(),
            r#""""#
        );
        assert_eq!(
            serde_json::to_string(&Comparison::High).unwrap(),
            r#""High (above 0.975)""#
        );
    }
}
