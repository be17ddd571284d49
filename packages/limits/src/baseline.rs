//! Pooled baseline proportion across all areas.

use funnel_plot_area_models::AreaRecord;

use crate::LimitsError;

/// Pooled event proportion and the number of areas it is compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    /// `Σ events / Σ population` over every area.
    pub theta: f64,
    /// Number of areas with at least one event.
    pub observed_areas: usize,
}

/// Pools events and population across the dataset.
///
/// # Errors
///
/// Returns [`LimitsError::EmptyPopulation`] if the total population is
/// zero (including an empty dataset), and [`LimitsError::TotalOverflow`] if
/// either total does not fit in a `u64`.
pub fn estimate(areas: &[AreaRecord]) -> Result<Baseline, LimitsError> {
    let total_events = checked_total(areas, "events", |a| a.events)?;
    let total_population = checked_total(areas, "population", |a| a.population)?;

    if total_population == 0 {
        return Err(LimitsError::EmptyPopulation);
    }

    log::debug!("Pooled {total_events} events over a population of {total_population}");

    #[allow(clippy::cast_precision_loss)]
    let theta = total_events as f64 / total_population as f64;
    let observed_areas = areas.iter().filter(|a| a.events != 0).count();

    Ok(Baseline {
        theta,
        observed_areas,
    })
}

fn checked_total(
    areas: &[AreaRecord],
    column: &'static str,
    value: impl Fn(&AreaRecord) -> u64,
) -> Result<u64, LimitsError> {
    areas
        .iter()
        .try_fold(0_u64, |total, area| total.checked_add(value(area)))
        .ok_or(LimitsError::TotalOverflow { column })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(events: u64, population: u64) -> AreaRecord {
        AreaRecord::new(Some("x".to_owned()), None, events, population).unwrap()
    }

    #[test]
    fn pools_events_over_population() {
        let areas = vec![area(50, 100_000), area(5, 100_000), area(500, 100_000)];
        let baseline = estimate(&areas).unwrap();
        assert!((baseline.theta - 0.00185).abs() < 1e-12);
        assert_eq!(baseline.observed_areas, 3);
    }

    #[test]
    fn pooling_is_not_an_average_of_rates() {
        let areas = vec![area(1, 10), area(0, 990)];
        let baseline = estimate(&areas).unwrap();
        assert!((baseline.theta - 0.001).abs() < 1e-15);
    }

    #[test]
    fn zero_event_areas_are_not_counted() {
        let areas = vec![area(0, 100), area(3, 100), area(0, 100)];
        assert_eq!(estimate(&areas).unwrap().observed_areas, 1);
    }

    #[test]
    fn overflowing_population_is_an_error() {
        let areas = vec![area(1, u64::MAX), area(1, 2)];
        assert!(matches!(
            estimate(&areas),
            Err(LimitsError::TotalOverflow {
                column: "population"
            })
        ));
    }

    #[test]
    fn empty_dataset_has_no_population() {
        assert!(matches!(estimate(&[]), Err(LimitsError::EmptyPopulation)));
    }
}
