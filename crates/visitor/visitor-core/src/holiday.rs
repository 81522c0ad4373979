//! Fixed holiday calendar with a multiplicative visitor boost

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Boost applied to visitor counts on a holiday
pub const DEFAULT_HOLIDAY_FACTOR: f64 = 1.2;

/// Set of dates receiving a visitor boost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
    factor: f64,
}

impl HolidayCalendar {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>, factor: f64) -> Self {
        Self {
            dates: dates.into_iter().collect(),
            factor,
        }
    }

    /// Calendar without holidays
    pub fn empty() -> Self {
        Self::new(std::iter::empty(), DEFAULT_HOLIDAY_FACTOR)
    }

    /// National and festival holidays for 2025
    pub fn india_2025() -> Self {
        const DAYS: [(u32, u32); 16] = [
            (1, 1),
            (26, 1),
            (26, 2),
            (20, 3),
            (31, 3),
            (10, 4),
            (12, 5),
            (7, 6),
            (6, 7),
            (15, 8),
            (16, 8),
            (2, 10),
            (20, 10),
            (28, 10),
            (5, 11),
            (25, 12),
        ];
        Self::new(
            DAYS.iter()
                .filter_map(|&(day, month)| NaiveDate::from_ymd_opt(2025, month, day)),
            DEFAULT_HOLIDAY_FACTOR,
        )
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Boosted visitor count for `date`; unchanged on regular days
    pub fn apply(&self, visitors: u64, date: NaiveDate) -> u64 {
        if self.is_holiday(date) {
            (visitors as f64 * self.factor).round().max(0.0) as u64
        } else {
            visitors
        }
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::india_2025()
    }
}
