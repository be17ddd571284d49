//! Renderer-independent description of a funnel plot.
//!
//! Drawing is left to whatever consumes the JSON: the description carries
//! the area scatter, the four limit lines and the baseline, their styling,
//! and suggested axis bounds.

use std::path::Path;

use funnel_plot_area_models::AreaRecord;
use funnel_plot_limits_models::{LimitCurvePoint, LimitSet};
use serde::{Deserialize, Serialize};

use crate::{ExportError, write_file};

/// Headroom added above the highest observed rate.
const Y_HEADROOM: f64 = 100.0;

/// Stroke pattern of a line series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    /// Continuous line.
    Solid,
    /// Dashed line.
    Dashed,
}

/// One observed area on the scatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    /// Area label.
    pub label: String,
    /// Population (x).
    pub population: u64,
    /// Rate per 100,000 (y).
    pub rate: f64,
}

/// A named line drawn through `(n, rate)` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    /// Series identifier (matches the export column names).
    pub name: String,
    /// Stroke pattern.
    pub style: LineStyle,
    /// Stroke width.
    pub width: f64,
    /// `[n, rate]` pairs, ascending by `n`.
    pub points: Vec<(u64, f64)>,
}

/// A legend entry referring to a series by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Name of the series the entry describes.
    pub series: String,
    /// Text shown in the legend.
    pub label: String,
}

/// Complete funnel plot description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelChart {
    /// Chart title.
    pub title: String,
    /// X axis label.
    pub x_label: String,
    /// Y axis label.
    pub y_label: String,
    /// Suggested `[min, max]` for the x axis.
    pub x_range: (f64, f64),
    /// Suggested `[min, max]` for the y axis.
    pub y_range: (f64, f64),
    /// Observed areas.
    pub areas: Vec<ScatterPoint>,
    /// Limit lines and baseline.
    pub lines: Vec<LineSeries>,
    /// Legend entries.
    pub legend: Vec<LegendEntry>,
}

/// Builds the chart description from the dataset and the limit curves.
#[must_use]
pub fn build(title: &str, areas: &[AreaRecord], curve: &[LimitCurvePoint]) -> FunnelChart {
    let max_rate = areas.iter().map(|a| a.rate).fold(0.0, f64::max);
    let max_population = areas.iter().map(|a| a.population).max().unwrap_or(0);

    let series = |name: &str, style, width, value: fn(&LimitSet) -> f64| LineSeries {
        name: name.to_owned(),
        style,
        width,
        points: curve.iter().map(|p| (p.n, value(&p.limits))).collect(),
    };

    let lines = vec![
        series("L2sd_bon", LineStyle::Solid, 1.2, |l| l.lower_bonferroni),
        series("L2sd", LineStyle::Dashed, 1.0, |l| l.lower),
        series("U2sd", LineStyle::Dashed, 1.0, |l| l.upper),
        series("U2sd_bon", LineStyle::Solid, 1.2, |l| l.upper_bonferroni),
        LineSeries {
            name: "average".to_owned(),
            style: LineStyle::Solid,
            width: 0.5,
            points: curve.iter().map(|p| (p.n, p.average)).collect(),
        },
    ];

    #[allow(clippy::cast_precision_loss)]
    let x_max = max_population as f64;

    FunnelChart {
        title: title.to_owned(),
        x_label: "Population".to_owned(),
        y_label: "Rate per 100,000 population".to_owned(),
        x_range: (0.0, x_max),
        y_range: (0.0, max_rate + Y_HEADROOM),
        areas: areas
            .iter()
            .map(|a| ScatterPoint {
                label: a.label().to_owned(),
                population: a.population,
                rate: a.rate,
            })
            .collect(),
        lines,
        legend: vec![
            LegendEntry {
                series: "L2sd".to_owned(),
                label: "95% control limits".to_owned(),
            },
            LegendEntry {
                series: "U2sd_bon".to_owned(),
                label: "95% control limits (Bonferroni correction)".to_owned(),
            },
        ],
    }
}

/// Writes the chart description as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_to_path(path: &Path, chart: &FunnelChart) -> Result<(), ExportError> {
    let json = serde_json::to_vec_pretty(chart)?;
    write_file(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Vec<LimitCurvePoint> {
        [100, 200]
            .into_iter()
            .map(|n| LimitCurvePoint {
                n,
                limits: LimitSet {
                    lower_bonferroni: 1.0,
                    lower: 2.0,
                    upper: 3.0,
                    upper_bonferroni: 4.0,
                },
                average: 2.5,
            })
            .collect()
    }

    #[test]
    fn describes_scatter_lines_and_legend() {
        let areas = vec![
            AreaRecord::new(None, Some("North".to_owned()), 30, 10_000).unwrap(),
            AreaRecord::new(Some("02".to_owned()), None, 5, 50_000).unwrap(),
        ];
        let chart = build("Hospitalizations", &areas, &curve());

        assert_eq!(chart.areas.len(), 2);
        assert_eq!(chart.areas[0].label, "North");
        assert_eq!(chart.x_range, (0.0, 50_000.0));
        assert!((chart.y_range.1 - 400.0).abs() < 1e-9);

        let names: Vec<&str> = chart.lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["L2sd_bon", "L2sd", "U2sd", "U2sd_bon", "average"]);
        assert_eq!(chart.lines[1].style, LineStyle::Dashed);
        assert_eq!(chart.lines[3].points, vec![(100, 4.0), (200, 4.0)]);
        assert_eq!(chart.lines[4].points[0], (100, 2.5));

        assert!(
            chart
                .legend
                .iter()
                .all(|e| names.contains(&e.series.as_str()))
        );
    }

    #[test]
    fn serializes_camel_case() {
        let chart = build("t", &[], &curve());
        let json = serde_json::to_value(&chart).unwrap();
        assert!(json.get("xLabel").is_some());
        assert_eq!(json["lines"][0]["style"], "solid");
    }
}
