#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reads area datasets from CSV.
//!
//! The input needs an `events` and a `population` column plus at least one
//! of `area_id` and `area_name`. Header names must match exactly (after
//! trimming); any other columns are ignored. Every row is validated up
//! front so that computation never starts on a partially valid dataset.

use std::io::Read;
use std::path::Path;

use funnel_plot_area_models::{AreaRecord, InvalidAreaError};
use serde::Deserialize;
use thiserror::Error;

/// Column holding the area identifier.
pub const AREA_ID_COLUMN: &str = "area_id";
/// Column holding the area name.
pub const AREA_NAME_COLUMN: &str = "area_name";
/// Column holding the event count.
pub const EVENTS_COLUMN: &str = "events";
/// Column holding the population at risk.
pub const POPULATION_COLUMN: &str = "population";

/// Largest magnitude at which every whole `f64` is exact (2^53).
const MAX_EXACT_FLOAT_COUNT: f64 = 9_007_199_254_740_992.0;

/// Errors that can occur while reading a dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The input file could not be opened.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV itself is malformed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header.
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: &'static str,
    },

    /// Neither identifier column is present in the header.
    #[error("Missing identifier column: expected 'area_id' and/or 'area_name'")]
    MissingIdentifierColumn,

    /// A required value is empty.
    #[error("Row {row}: missing value for '{column}'")]
    MissingValue {
        /// 1-based data row.
        row: usize,
        /// Column with the empty value.
        column: &'static str,
    },

    /// A count column does not hold an integer.
    #[error("Row {row}: '{column}' value '{value}' is not an integer")]
    InvalidNumber {
        /// 1-based data row.
        row: usize,
        /// Column with the bad value.
        column: &'static str,
        /// The value as read.
        value: String,
    },

    /// Events were negative.
    #[error("Row {row} ({area}): events must not be negative, got {events}")]
    NegativeEvents {
        /// 1-based data row.
        row: usize,
        /// Area label.
        area: String,
        /// The offending value.
        events: i64,
    },

    /// Population was zero or negative.
    #[error("Row {row} ({area}): population must be greater than zero, got {population}")]
    NonPositivePopulation {
        /// 1-based data row.
        row: usize,
        /// Area label.
        area: String,
        /// The offending value.
        population: i64,
    },

    /// The row could not be turned into an [`AreaRecord`].
    #[error("Row {row}: {source}")]
    InvalidArea {
        /// 1-based data row.
        row: usize,
        /// Underlying validation error.
        #[source]
        source: InvalidAreaError,
    },

    /// Summing a column across all rows overflowed.
    #[error("Total '{column}' across all rows does not fit in a 64-bit integer")]
    TotalOverflow {
        /// Column being summed.
        column: &'static str,
    },

    /// The input has a header but no data rows.
    #[error("Input contains no data rows")]
    EmptyDataset,
}

/// One CSV row before validation.
#[derive(Debug, Deserialize)]
struct RawAreaRow {
    area_id: Option<String>,
    area_name: Option<String>,
    events: Option<String>,
    population: Option<String>,
}

/// Reads and validates a dataset from a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any row is invalid.
pub fn read_areas_from_path(path: &Path, delimiter: u8) -> Result<Vec<AreaRecord>, IngestError> {
    log::info!("Reading areas from {}", path.display());
    let file = std::fs::File::open(path)?;
    read_areas(file, delimiter)
}

/// Reads and validates a dataset from any CSV source, preserving row order.
///
/// # Errors
///
/// Returns an error if the header lacks a required column, any row is
/// invalid, or there are no data rows.
pub fn read_areas<R: Read>(reader: R, delimiter: u8) -> Result<Vec<AreaRecord>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    check_headers(reader.headers()?)?;

    let mut areas = Vec::new();
    for (index, result) in reader.deserialize::<RawAreaRow>().enumerate() {
        let row = index + 1;
        areas.push(validate_row(row, result?)?);
    }

    if areas.is_empty() {
        return Err(IngestError::EmptyDataset);
    }

    let total_events = checked_total(&areas, EVENTS_COLUMN, |a| a.events)?;
    let total_population = checked_total(&areas, POPULATION_COLUMN, |a| a.population)?;
    log::info!(
        "Read {} areas ({total_events} events, population {total_population})",
        areas.len()
    );

    Ok(areas)
}

fn checked_total(
    areas: &[AreaRecord],
    column: &'static str,
    value: impl Fn(&AreaRecord) -> u64,
) -> Result<u64, IngestError> {
    areas
        .iter()
        .try_fold(0_u64, |total, area| total.checked_add(value(area)))
        .ok_or(IngestError::TotalOverflow { column })
}

fn check_headers(headers: &csv::StringRecord) -> Result<(), IngestError> {
    let has = |column: &str| headers.iter().any(|h| h == column);

    for column in [EVENTS_COLUMN, POPULATION_COLUMN] {
        if !has(column) {
            return Err(IngestError::MissingColumn { column });
        }
    }
    if !has(AREA_ID_COLUMN) && !has(AREA_NAME_COLUMN) {
        return Err(IngestError::MissingIdentifierColumn);
    }

    Ok(())
}

fn validate_row(row: usize, raw: RawAreaRow) -> Result<AreaRecord, IngestError> {
    let id = raw.area_id.filter(|s| !s.is_empty());
    let name = raw.area_name.filter(|s| !s.is_empty());
    let label = name
        .as_deref()
        .or(id.as_deref())
        .map_or_else(|| format!("row {row}"), ToOwned::to_owned);

    let events = parse_count(row, EVENTS_COLUMN, raw.events)?;
    let population = parse_count(row, POPULATION_COLUMN, raw.population)?;

    let events = u64::try_from(events).map_err(|_| IngestError::NegativeEvents {
        row,
        area: label.clone(),
        events,
    })?;
    let population = u64::try_from(population)
        .ok()
        .filter(|&p| p > 0)
        .ok_or_else(|| IngestError::NonPositivePopulation {
            row,
            area: label.clone(),
            population,
        })?;

    if events > population {
        log::warn!("{label}: {events} events exceed population {population}");
    }

    AreaRecord::new(id, name, events, population)
        .map_err(|source| IngestError::InvalidArea { row, source })
}

fn parse_count(
    row: usize,
    column: &'static str,
    value: Option<String>,
) -> Result<i64, IngestError> {
    let value = value
        .filter(|s| !s.is_empty())
        .ok_or(IngestError::MissingValue { row, column })?;

    if let Ok(count) = value.parse::<i64>() {
        return Ok(count);
    }

    // Spreadsheet exports often write whole counts as `50.0`.
    match value.parse::<f64>() {
        #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
        Ok(count)
            if count.fract() == 0.0 && count.abs() < MAX_EXACT_FLOAT_COUNT =>
        {
            Ok(count as i64)
        }
        _ => Err(IngestError::InvalidNumber { row, column, value }),
    }
}
