//! Same-day historical averages and their blend with model output

use chrono::{Datelike, NaiveDate};
use visitor_spi::ObservationSeries;

use crate::linalg::mean;

/// Combines model output with what prior years looked like on the same date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoricalBlender;

impl HistoricalBlender {
    pub fn new() -> Self {
        Self
    }

    /// Mean value on the same day and month in years before `date`'s year
    ///
    /// `None` when no prior year has an observation on that day.
    pub fn average(&self, series: &ObservationSeries, date: NaiveDate) -> Option<f64> {
        let matches: Vec<f64> = series
            .iter()
            .filter(|o| {
                o.week.year() < date.year()
                    && o.week.month() == date.month()
                    && o.week.day() == date.day()
            })
            .map(|o| o.value)
            .collect();

        if matches.is_empty() {
            None
        } else {
            Some(mean(&matches))
        }
    }

    /// Equal-weight blend of the model value and the historical average
    pub fn blend(&self, model: f64, historical: Option<f64>) -> f64 {
        match historical {
            Some(hist) => (model + hist) / 2.0,
            None => model,
        }
    }

    /// Mean of every value observed in calendar `month`, across all years
    pub fn monthly_mean(&self, series: &ObservationSeries, month: u32) -> Option<f64> {
        let values: Vec<f64> = series
            .iter()
            .filter(|o| o.week.month() == month)
            .map(|o| o.value)
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(mean(&values))
        }
    }
}
