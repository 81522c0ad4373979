//! Human-readable rendering of forecast output.

use visitor_facade::{BacktestSummary, ForecastOutcome, ForecastRecord};

/// Visitor count in thousands (K) or lakhs (L).
pub fn format_count(count: u64) -> String {
    if count < 1_000 {
        count.to_string()
    } else if count < 100_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        format!("{:.2}L", count as f64 / 100_000.0)
    }
}

fn record_line(record: &ForecastRecord) -> String {
    let historical = record
        .historical_avg
        .map(|h| format!("{:.1}", h))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "  {}  {:>9}  [{} - {}]  hist {}",
        record.week_label(),
        format_count(record.predicted_visitors),
        format_count(record.confidence_interval.lower),
        format_count(record.confidence_interval.upper),
        historical
    )
}

/// Multi-line table of an outcome.
pub fn render_outcome(outcome: &ForecastOutcome) -> String {
    let mut lines = vec![format!(
        "Location: {} (strategies: {})",
        outcome.location,
        outcome.strategies.join(", ")
    )];

    if let Some(calibration) = outcome.calibration {
        lines.push(format!(
            "Calibration: {:.3} + {:.3}x (R² {:.3})",
            calibration.intercept, calibration.slope, calibration.r_squared
        ));
    }

    if let Some(interest) = outcome.month_interest {
        lines.push(format!("Month interest: {:.1}", interest));
    }

    if !outcome.look_back.is_empty() {
        lines.push("Look-back:".to_string());
        lines.extend(outcome.look_back.iter().map(record_line));
    }

    lines.push(format!("Forecast {} weeks:", outcome.records.len()));
    lines.extend(outcome.records.iter().map(record_line));
    lines.join("\n")
}

/// One-line accuracy summary.
pub fn render_summary(summary: &BacktestSummary) -> String {
    let mape = summary
        .mape
        .map(|m| format!("{:.2}%", m * 100.0))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "Back-test over {} weeks: MAE {}  RMSE {}  MAPE {}",
        summary.compared,
        format_count(summary.mae.round() as u64),
        format_count(summary.rmse.round() as u64),
        mape
    )
}
