//! CSV export of classified areas and limit curves.

use std::io::Write;
use std::path::Path;

use funnel_plot_limits_models::{ClassifiedRecord, Comparison, LimitCurvePoint};
use serde::Serialize;

use crate::{ExportError, write_file};

#[derive(Serialize)]
struct ResultRow<'a> {
    area_id: Option<&'a str>,
    area_name: Option<&'a str>,
    events: u64,
    population: u64,
    rate: f64,
    #[serde(rename = "L2sd_bon")]
    lower_bonferroni: f64,
    #[serde(rename = "L2sd")]
    lower: f64,
    #[serde(rename = "U2sd")]
    upper: f64,
    #[serde(rename = "U2sd_bon")]
    upper_bonferroni: f64,
    comparison: Comparison,
}

impl<'a> From<&'a ClassifiedRecord> for ResultRow<'a> {
    fn from(record: &'a ClassifiedRecord) -> Self {
        Self {
            area_id: record.area.id.as_deref(),
            area_name: record.area.name.as_deref(),
            events: record.area.events,
            population: record.area.population,
            rate: record.area.rate,
            lower_bonferroni: record.limits.lower_bonferroni,
            lower: record.limits.lower,
            upper: record.limits.upper,
            upper_bonferroni: record.limits.upper_bonferroni,
            comparison: record.comparison,
        }
    }
}

#[derive(Serialize)]
struct CurveRow {
    #[serde(rename = "N")]
    n: u64,
    #[serde(rename = "L2sd_bon")]
    lower_bonferroni: f64,
    #[serde(rename = "L2sd")]
    lower: f64,
    #[serde(rename = "U2sd")]
    upper: f64,
    #[serde(rename = "U2sd_bon")]
    upper_bonferroni: f64,
    average: f64,
}

impl From<&LimitCurvePoint> for CurveRow {
    fn from(point: &LimitCurvePoint) -> Self {
        Self {
            n: point.n,
            lower_bonferroni: point.limits.lower_bonferroni,
            lower: point.limits.lower,
            upper: point.limits.upper,
            upper_bonferroni: point.limits.upper_bonferroni,
            average: point.average,
        }
    }
}

/// Writes one row per classified area, in the order given.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_results<W: Write>(writer: W, classified: &[ClassifiedRecord]) -> Result<(), ExportError> {
    write_rows(writer, classified.iter().map(ResultRow::from))
}

/// Writes the limit curves, one row per sample size.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_curve<W: Write>(writer: W, curve: &[LimitCurvePoint]) -> Result<(), ExportError> {
    write_rows(writer, curve.iter().map(CurveRow::from))
}

/// Serializes the results in memory, then writes them to `path`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_results_to_path(path: &Path, classified: &[ClassifiedRecord]) -> Result<(), ExportError> {
    let mut buf = Vec::new();
    write_results(&mut buf, classified)?;
    write_file(path, &buf)
}

/// Serializes the limit curves in memory, then writes them to `path`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_curve_to_path(path: &Path, curve: &[LimitCurvePoint]) -> Result<(), ExportError> {
    let mut buf = Vec::new();
    write_curve(&mut buf, curve)?;
    write_file(path, &buf)
}

fn write_rows<W: Write, T: Serialize>(
    writer: W,
    rows: impl Iterator<Item = T>,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
