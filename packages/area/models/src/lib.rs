#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Area record types shared across the funnel plot toolchain.
//!
//! An [`AreaRecord`] is one row of the input dataset: an area (county,
//! district, hospital catchment) with its event count and population. The
//! observed rate is derived once at construction and never recomputed.

use serde::{Deserialize, Serialize};

/// Rates are reported per this many people.
pub const RATE_MULTIPLIER: f64 = 100_000.0;

/// A single area with its observed event count and population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    /// Area identifier (e.g., a county code).
    pub id: Option<String>,
    /// Human-readable area name.
    pub name: Option<String>,
    /// Number of events observed in the area.
    pub events: u64,
    /// Population at risk. Always greater than zero.
    pub population: u64,
    /// Observed rate per [`RATE_MULTIPLIER`] population.
    pub rate: f64,
}

impl AreaRecord {
    /// Creates a record and derives its rate.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `id` nor `name` is present, or if
    /// `population` is zero.
    pub fn new(
        id: Option<String>,
        name: Option<String>,
        events: u64,
        population: u64,
    ) -> Result<Self, InvalidAreaError> {
        if id.is_none() && name.is_none() {
            return Err(InvalidAreaError::MissingIdentifier);
        }
        if population == 0 {
            return Err(InvalidAreaError::ZeroPopulation);
        }

        #[allow(clippy::cast_precision_loss)]
        let rate = events as f64 / population as f64 * RATE_MULTIPLIER;

        Ok(Self {
            id,
            name,
            events,
            population,
            rate,
        })
    }

    /// Returns a label for log and error messages, preferring the name.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unnamed>")
    }
}

/// Error returned when an [`AreaRecord`] cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidAreaError {
    /// Neither an area id nor an area name was supplied.
    MissingIdentifier,
    /// Population was zero, leaving the rate undefined.
    ZeroPopulation,
}

impl std::fmt::Display for InvalidAreaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentifier => write!(f, "area has neither an id nor a name"),
            Self::ZeroPopulation => write!(f, "population must be greater than zero"),
        }
    }
}

impl std::error::Error for InvalidAreaError {}

/// Returns the smallest and largest population in the dataset, or `None`
/// if it is empty.
#[must_use]
pub fn population_range(areas: &[AreaRecord]) -> Option<(u64, u64)> {
    let min = areas.iter().map(|a| a.population).min()?;
    let max = areas.iter().map(|a| a.population).max()?;
    Some((min, max))
}
