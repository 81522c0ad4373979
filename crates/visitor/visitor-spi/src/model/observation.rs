//! Observation series model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::week::week_format;
use crate::error::{Result, VisitorError};

/// Minimum history needed to fit a seasonal model
pub const MIN_OBSERVATIONS: usize = 12;

/// One weekly interest reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Week-start date
    #[serde(with = "week_format")]
    pub week: NaiveDate,
    /// Non-negative interest value
    pub value: f64,
}

impl Observation {
    pub fn new(week: NaiveDate, value: f64) -> Self {
        Self { week, value }
    }
}

/// Ordered weekly series for one location
///
/// Weeks are strictly increasing and values are finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationSeries {
    location: String,
    observations: Vec<Observation>,
}

impl ObservationSeries {
    /// Create a series, validating ordering and values
    pub fn new(location: impl Into<String>, observations: Vec<Observation>) -> Result<Self> {
        for pair in observations.windows(2) {
            if pair[1].week <= pair[0].week {
                return Err(VisitorError::InvalidData(format!(
                    "weeks must be strictly increasing: {} follows {}",
                    pair[1].week, pair[0].week
                )));
            }
        }
        if let Some(bad) = observations
            .iter()
            .find(|o| !o.value.is_finite() || o.value < 0.0)
        {
            return Err(VisitorError::InvalidData(format!(
                "value {} on {} is not a non-negative number",
                bad.value, bad.week
            )));
        }

        Ok(Self {
            location: location.into(),
            observations,
        })
    }

    /// Location this series belongs to
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Values in chronological order
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// Weeks in chronological order
    pub fn weeks(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.week).collect()
    }

    pub fn first_week(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.week)
    }

    pub fn last_week(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.week)
    }

    /// Value observed exactly on `week`, if any
    pub fn value_on(&self, week: NaiveDate) -> Option<f64> {
        self.observations
            .binary_search_by(|o| o.week.cmp(&week))
            .ok()
            .map(|idx| self.observations[idx].value)
    }

    /// The last `window` observations (the whole series if shorter)
    pub fn trailing(&self, window: usize) -> Self {
        let start = self.observations.len().saturating_sub(window);
        Self {
            location: self.location.clone(),
            observations: self.observations[start..].to_vec(),
        }
    }

    /// Min-max rescale values onto 0..100
    ///
    /// A constant series is returned unchanged.
    pub fn normalized(&self) -> Self {
        let min = self
            .observations
            .iter()
            .map(|o| o.value)
            .fold(f64::INFINITY, f64::min);
        let max = self
            .observations
            .iter()
            .map(|o| o.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        if !range.is_finite() || range == 0.0 {
            return self.clone();
        }

        Self {
            location: self.location.clone(),
            observations: self
                .observations
                .iter()
                .map(|o| Observation::new(o.week, (o.value - min) / range * 100.0))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn weekly(values: &[f64]) -> Vec<Observation> {
        let start = week(6, 1, 2020);
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(start + chrono::Duration::weeks(i as i64), v))
            .collect()
    }

    #[test]
    fn test_series_accessors() {
        let series = ObservationSeries::new("Goa", weekly(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(series.location(), "Goa");
        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first_week(), Some(week(6, 1, 2020)));
        assert_eq!(series.last_week(), Some(week(20, 1, 2020)));
    }

    #[test]
    fn test_rejects_unordered_weeks() {
        let mut obs = weekly(&[1.0, 2.0]);
        obs.swap(0, 1);
        assert!(matches!(
            ObservationSeries::new("Goa", obs),
            Err(VisitorError::InvalidData(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_weeks() {
        let mut obs = weekly(&[1.0, 2.0]);
        obs[1].week = obs[0].week;
        assert!(ObservationSeries::new("Goa", obs).is_err());
    }

    #[test]
    fn test_rejects_negative_values() {
        let obs = weekly(&[1.0, -2.0]);
        assert!(ObservationSeries::new("Goa", obs).is_err());
    }

    #[test]
    fn test_value_on() {
        let series = ObservationSeries::new("Goa", weekly(&[5.0, 6.0, 7.0])).unwrap();
        assert_eq!(series.value_on(week(13, 1, 2020)), Some(6.0));
        assert_eq!(series.value_on(week(14, 1, 2020)), None);
    }

    #[test]
    fn test_trailing_window() {
        let series = ObservationSeries::new("Goa", weekly(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(series.trailing(2).values(), vec![3.0, 4.0]);
        assert_eq!(series.trailing(10).len(), 4);
    }

    #[test]
    fn test_normalized_range() {
        let series = ObservationSeries::new("Goa", weekly(&[10.0, 20.0, 30.0])).unwrap();
        assert_eq!(series.normalized().values(), vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn test_normalized_constant_series_unchanged() {
        let series = ObservationSeries::new("Goa", weekly(&[4.0, 4.0, 4.0])).unwrap();
        assert_eq!(series.normalized(), series);
    }

    #[test]
    fn test_observation_serializes_week_label() {
        let obs = Observation::new(week(7, 1, 2025), 42.0);
        let json = serde_json::to_string(&obs).unwrap();
        assert_eq!(json, r#"{"week":"07-01-2025","value":42.0}"#);
    }
}
