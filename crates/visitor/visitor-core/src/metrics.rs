//! Back-test accuracy over forecast rows with known actuals

use serde::{Deserialize, Serialize};
use visitor_spi::BacktestRow;

/// Accuracy of the rows that have a known actual value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Rows with an actual value
    pub compared: usize,
    /// Mean absolute error in visitors
    pub mae: f64,
    /// Root mean squared error in visitors
    pub rmse: f64,
    /// Mean absolute percentage error as a fraction; `None` when every
    /// actual is zero
    pub mape: Option<f64>,
}

impl BacktestSummary {
    /// Summarize `rows`; `None` when no row carries an actual value
    pub fn from_rows(rows: &[BacktestRow]) -> Option<Self> {
        let mut compared = 0_usize;
        let mut abs_error = 0.0;
        let mut sq_error = 0.0;
        let mut pct_error = 0.0;
        let mut pct_rows = 0_usize;

        for row in rows {
            let Some(actual) = row.actual_visitors else {
                continue;
            };
            let error = row.predicted_visitors as f64 - actual as f64;
            compared += 1;
            abs_error += error.abs();
            sq_error += error * error;
            if actual > 0 {
                pct_error += (error / actual as f64).abs();
                pct_rows += 1;
            }
        }

        if compared == 0 {
            return None;
        }

        let n = compared as f64;
        Some(Self {
            compared,
            mae: abs_error / n,
            rmse: (sq_error / n).sqrt(),
            mape: (pct_rows > 0).then(|| pct_error / pct_rows as f64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(actual: Option<u64>, predicted: u64) -> BacktestRow {
        BacktestRow {
            week: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            actual_visitors: actual,
            predicted_visitors: predicted,
        }
    }

    #[test]
    fn test_summary_metrics() {
        let rows = vec![
            row(Some(100), 110),
            row(Some(200), 180),
            row(Some(300), 300),
        ];
        let summary = BacktestSummary::from_rows(&rows).unwrap();
        assert_eq!(summary.compared, 3);
        assert!((summary.mae - 10.0).abs() < 1e-9);
        assert!((summary.rmse - (500.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((summary.mape.unwrap() - (0.1 + 0.1) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_skips_rows_without_actual() {
        let rows = vec![row(Some(1000), 900), row(None, 5000)];
        let summary = BacktestSummary::from_rows(&rows).unwrap();
        assert_eq!(summary.compared, 1);
        assert!((summary.mae - 100.0).abs() < 1e-9);
        assert!((summary.mape.unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_zero_actuals_have_no_mape() {
        let rows = vec![row(Some(0), 10), row(Some(0), 30)];
        let summary = BacktestSummary::from_rows(&rows).unwrap();
        assert_eq!(summary.compared, 2);
        assert!((summary.mae - 20.0).abs() < 1e-9);
        assert_eq!(summary.mape, None);
    }

    #[test]
    fn test_summary_without_actuals() {
        assert!(BacktestSummary::from_rows(&[row(None, 10)]).is_none());
        assert!(BacktestSummary::from_rows(&[]).is_none());
    }
}
