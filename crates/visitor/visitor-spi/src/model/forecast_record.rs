//! Forecast output models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::week::week_format;

/// Confidence bounds on a visitor estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorBounds {
    /// Lower bound of the interval
    pub lower: u64,
    /// Upper bound of the interval
    pub upper: u64,
}

impl VisitorBounds {
    /// Fixed band of [0.8x, 1.2x] around a point estimate
    pub fn around(predicted: u64) -> Self {
        let value = predicted as f64;
        Self {
            lower: (value * 0.8).round().max(0.0) as u64,
            upper: (value * 1.2).round() as u64,
        }
    }

    /// Whether `value` lies inside the bounds
    pub fn contains(&self, value: u64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> u64 {
        self.upper - self.lower
    }
}

/// One labeled weekly visitor forecast
///
/// Created once per forecast step and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Target week
    #[serde(with = "week_format")]
    pub week: NaiveDate,
    /// Estimated absolute visitor count
    pub predicted_visitors: u64,
    /// Confidence bounds around `predicted_visitors`
    pub confidence_interval: VisitorBounds,
    /// Mean interest on the same day and month in prior years
    pub historical_avg: Option<f64>,
}

impl ForecastRecord {
    /// Record with the standard [0.8x, 1.2x] interval
    pub fn new(week: NaiveDate, predicted_visitors: u64, historical_avg: Option<f64>) -> Self {
        Self {
            week,
            predicted_visitors,
            confidence_interval: VisitorBounds::around(predicted_visitors),
            historical_avg,
        }
    }

    /// `dd-mm-YYYY` label of the target week
    pub fn week_label(&self) -> String {
        super::week::format_week(self.week)
    }
}

/// Actual-vs-predicted pair for back-testing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRow {
    #[serde(with = "week_format")]
    pub week: NaiveDate,
    /// Known visitors on that week, when the history covers it
    pub actual_visitors: Option<u64>,
    pub predicted_visitors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    #[test]
    fn test_bounds_around() {
        let bounds = VisitorBounds::around(1000);
        assert_eq!(bounds.lower, 800);
        assert_eq!(bounds.upper, 1200);
        assert!(bounds.contains(1000));
        assert_eq!(bounds.width(), 400);
    }

    #[test]
    fn test_bounds_around_zero() {
        let bounds = VisitorBounds::around(0);
        assert_eq!(bounds, VisitorBounds { lower: 0, upper: 0 });
    }

    #[test]
    fn test_bounds_rounding_keeps_order() {
        for predicted in [1, 2, 3, 7, 11, 99, 12345] {
            let bounds = VisitorBounds::around(predicted);
            assert!(bounds.contains(predicted), "predicted {}", predicted);
        }
    }

    #[test]
    fn test_record_new() {
        let record = ForecastRecord::new(week(), 5000, Some(41.5));
        assert_eq!(record.confidence_interval.lower, 4000);
        assert_eq!(record.confidence_interval.upper, 6000);
        assert_eq!(record.week_label(), "06-01-2025");
    }

    #[test]
    fn test_record_json_shape() {
        let record = ForecastRecord::new(week(), 100, None);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["week"], "06-01-2025");
        assert_eq!(json["predicted_visitors"], 100);
        assert_eq!(json["confidence_interval"]["lower"], 80);
        assert_eq!(json["confidence_interval"]["upper"], 120);
        assert!(json["historical_avg"].is_null());
    }

    #[test]
    fn test_record_json_roundtrip() {
        let record = ForecastRecord::new(week(), 2500, Some(33.0));
        let json = serde_json::to_string(&record).unwrap();
        let back: ForecastRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
