//! Per-request forecast orchestration
//!
//! Fits every configured strategy on the training window, averages their
//! forecasts, and turns each step into a labeled visitor estimate:
//!
//! 1. seasonal adjustment
//! 2. calibration against the training history
//! 3. blend with the same-day average of prior years
//! 4. scaling from interest points to visitors
//! 5. holiday boost and mega-event suppression
//! 6. optional back-test adjustment toward known actuals
//! 7. fixed confidence band

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use visitor_spi::{
    BacktestRow, CalibrationParameters, ForecastRecord, NoiseSource, ObservationSeries, Result,
    TrendModel, VisitorError, MIN_OBSERVATIONS,
};

use crate::backtest::{BacktestAdjuster, NoNoise};
use crate::blend::HistoricalBlender;
use crate::calibration::LinearCalibration;
use crate::holiday::HolidayCalendar;
use crate::metrics::BacktestSummary;
use crate::profile::{MegaEventRule, ScalingTable, SeasonalProfile};
use crate::strategy::StrategyKind;

/// Behavior switches for a [`ForecastAssembler`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOptions {
    /// Strategies whose forecasts are averaged
    pub strategies: Vec<StrategyKind>,
    pub seasonal: SeasonalProfile,
    /// Fit a calibration line on the training history
    pub calibrate: bool,
    /// Blend with the same-day average of prior years
    pub blend_history: bool,
    /// Weeks before `start` to re-forecast for back-testing
    pub look_back: usize,
    /// Min-max rescale the series onto 0..100 before fitting
    pub normalize: bool,
    /// Pull predictions toward known actuals
    pub backtest_adjustment: bool,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            strategies: StrategyKind::defaults(),
            seasonal: SeasonalProfile::default(),
            calibrate: true,
            blend_history: true,
            look_back: 0,
            normalize: false,
            backtest_adjustment: false,
        }
    }
}

/// One forecast call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub location: String,
    /// First forecast week
    pub start: NaiveDate,
    /// Number of forecast weeks
    pub steps: usize,
    /// Train on only the last `window` observations
    pub window: Option<usize>,
}

impl ForecastRequest {
    pub fn new(location: impl Into<String>, start: NaiveDate, steps: usize) -> Self {
        Self {
            location: location.into(),
            start,
            steps,
            window: None,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(VisitorError::invalid_parameter(
                "steps",
                "must be at least 1",
            ));
        }
        if let Some(window) = self.window {
            if window < MIN_OBSERVATIONS {
                return Err(VisitorError::invalid_parameter(
                    "window",
                    format!("must be at least {}", MIN_OBSERVATIONS),
                ));
            }
        }
        Ok(())
    }
}

/// Everything produced for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutcome {
    pub location: String,
    /// Exactly `steps` records, one per forecast week
    pub records: Vec<ForecastRecord>,
    /// Records for the look-back weeks preceding `start`
    pub look_back: Vec<ForecastRecord>,
    /// Actual vs predicted for every step, look-back included
    pub backtest: Vec<BacktestRow>,
    /// Strategies that fitted successfully
    pub strategies: Vec<String>,
    pub calibration: Option<CalibrationParameters>,
    /// Mean interest over every observed week in the start date's month
    pub month_interest: Option<f64>,
}

impl ForecastOutcome {
    /// Accuracy over the steps with a known actual
    pub fn summary(&self) -> Option<BacktestSummary> {
        BacktestSummary::from_rows(&self.backtest)
    }
}

/// Orchestrates models, calibration and adjustments per forecast step
///
/// Immutable once built; each call fits its own models.
#[derive(Debug, Clone)]
pub struct ForecastAssembler {
    options: ForecastOptions,
    scaling: ScalingTable,
    holidays: HolidayCalendar,
    mega_events: Vec<MegaEventRule>,
    adjuster: BacktestAdjuster,
    blender: HistoricalBlender,
}

impl Default for ForecastAssembler {
    fn default() -> Self {
        Self::new(ForecastOptions::default())
    }
}

/// Fitted strategies for one training window
struct Ensemble {
    models: Vec<Box<dyn TrendModel>>,
}

impl Ensemble {
    fn names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name().to_string()).collect()
    }

    /// Per-step mean of every model's forecast
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let mut total = vec![0.0; horizon];
        for model in &self.models {
            for (sum, value) in total.iter_mut().zip(model.forecast(horizon)?) {
                *sum += value;
            }
        }
        let count = self.models.len() as f64;
        Ok(total.into_iter().map(|v| v / count).collect())
    }

    /// Mean fitted values over the tail all models cover
    fn fitted(&self) -> Result<Vec<f64>> {
        let all = self
            .models
            .iter()
            .map(|m| m.fitted_values())
            .collect::<Result<Vec<_>>>()?;
        let len = all.iter().map(Vec::len).min().unwrap_or(0);
        let count = all.len() as f64;

        Ok((0..len)
            .map(|i| {
                all.iter()
                    .map(|values| values[values.len() - len + i])
                    .sum::<f64>()
                    / count
            })
            .collect())
    }
}

/// Fit every candidate, keeping the ones that succeed
fn fit_ensemble(candidates: Vec<Box<dyn TrendModel>>, values: &[f64]) -> Result<Ensemble> {
    let attempted: Vec<String> = candidates.iter().map(|m| m.name().to_string()).collect();
    let mut models = Vec::with_capacity(candidates.len());

    for mut model in candidates {
        match model.fit(values) {
            Ok(()) => {
                info!(strategy = model.name(), points = values.len(), "strategy fitted");
                models.push(model);
            }
            Err(err) => {
                warn!(strategy = model.name(), error = %err, "strategy skipped");
            }
        }
    }

    if models.is_empty() {
        return Err(VisitorError::ForecastUnavailable { attempted });
    }
    Ok(Ensemble { models })
}

/// Interest points (0-100 scale) to visitors
fn to_visitors(value: f64, scaling: u64) -> u64 {
    (value.max(0.0) * scaling as f64 / 100.0).round() as u64
}

impl ForecastAssembler {
    pub fn new(options: ForecastOptions) -> Self {
        Self {
            options,
            scaling: ScalingTable::default(),
            holidays: HolidayCalendar::default(),
            mega_events: vec![MegaEventRule::maha_kumbh()],
            adjuster: BacktestAdjuster::default(),
            blender: HistoricalBlender::new(),
        }
    }

    pub fn with_scaling(mut self, scaling: ScalingTable) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_holidays(mut self, holidays: HolidayCalendar) -> Self {
        self.holidays = holidays;
        self
    }

    pub fn with_mega_events(mut self, rules: Vec<MegaEventRule>) -> Self {
        self.mega_events = rules;
        self
    }

    pub fn with_adjuster(mut self, adjuster: BacktestAdjuster) -> Self {
        self.adjuster = adjuster;
        self
    }

    pub fn options(&self) -> &ForecastOptions {
        &self.options
    }

    pub fn scaling(&self) -> &ScalingTable {
        &self.scaling
    }

    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    /// Forecast without back-test noise
    pub fn forecast(
        &self,
        series: &ObservationSeries,
        request: &ForecastRequest,
    ) -> Result<ForecastOutcome> {
        self.forecast_with_noise(series, request, &mut NoNoise)
    }

    /// Forecast drawing back-test perturbations from `noise`
    pub fn forecast_with_noise(
        &self,
        series: &ObservationSeries,
        request: &ForecastRequest,
        noise: &mut dyn NoiseSource,
    ) -> Result<ForecastOutcome> {
        if series.len() < MIN_OBSERVATIONS {
            return Err(VisitorError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: series.len(),
            });
        }
        request.validate()?;

        info!(
            location = %request.location,
            start = %request.start,
            steps = request.steps,
            window = ?request.window,
            "forecast requested"
        );

        let scaled = if self.options.normalize {
            series.normalized()
        } else {
            series.clone()
        };
        let training = match request.window {
            Some(window) => scaled.trailing(window),
            None => scaled.clone(),
        };
        let values = training.values();

        let ensemble = self.fit_strategies(&values)?;
        let calibration = if self.options.calibrate {
            self.fit_calibration(&ensemble, &values)
        } else {
            None
        };

        let look_back = self.options.look_back;
        let raw = ensemble.forecast(look_back + request.steps)?;

        let mut outcome = ForecastOutcome {
            location: request.location.clone(),
            records: Vec::with_capacity(request.steps),
            look_back: Vec::with_capacity(look_back),
            backtest: Vec::with_capacity(raw.len()),
            strategies: ensemble.names(),
            calibration,
            month_interest: self.blender.monthly_mean(&scaled, request.start.month()),
        };

        for (i, &value) in raw.iter().enumerate() {
            let date = request.start + Duration::weeks(i as i64 - look_back as i64);
            let (record, row) =
                self.assemble_step(&request.location, &scaled, date, value, calibration, noise);

            if i < look_back {
                outcome.look_back.push(record);
            } else {
                outcome.records.push(record);
            }
            outcome.backtest.push(row);
        }

        info!(
            location = %request.location,
            records = outcome.records.len(),
            look_back = outcome.look_back.len(),
            strategies = ?outcome.strategies,
            "forecast assembled"
        );
        Ok(outcome)
    }

    fn fit_strategies(&self, values: &[f64]) -> Result<Ensemble> {
        let candidates = self.options.strategies.iter().map(StrategyKind::build).collect();
        fit_ensemble(candidates, values)
    }

    fn fit_calibration(
        &self,
        ensemble: &Ensemble,
        values: &[f64],
    ) -> Option<CalibrationParameters> {
        let fitted = match ensemble.fitted() {
            Ok(fitted) => fitted,
            Err(err) => {
                warn!(error = %err, "calibration skipped");
                return None;
            }
        };
        let actual = &values[values.len() - fitted.len().min(values.len())..];

        let mut calibration = LinearCalibration::new();
        match calibration.fit(&fitted, actual) {
            Ok(params) => {
                debug!(
                    intercept = params.intercept,
                    slope = params.slope,
                    r_squared = params.r_squared,
                    "calibration fitted"
                );
                Some(params)
            }
            Err(err) => {
                warn!(error = %err, "calibration skipped");
                None
            }
        }
    }

    fn assemble_step(
        &self,
        location: &str,
        history: &ObservationSeries,
        date: NaiveDate,
        raw: f64,
        calibration: Option<CalibrationParameters>,
        noise: &mut dyn NoiseSource,
    ) -> (ForecastRecord, BacktestRow) {
        let month = date.month();
        let scaling = self.scaling.factor(location, month);

        let adjusted = self.options.seasonal.adjust(raw, month);
        let calibrated = calibration.map_or(adjusted, |c| c.project(adjusted));
        let historical = self.blender.average(history, date);
        let blended = if self.options.blend_history {
            self.blender.blend(calibrated, historical)
        } else {
            calibrated
        };

        let mut visitors = self.holidays.apply(to_visitors(blended, scaling), date);
        let actual = history.value_on(date).map(|v| to_visitors(v, scaling));

        let suppressed = self
            .mega_events
            .iter()
            .any(|rule| rule.suppresses(location, date.year()));
        if suppressed {
            visitors = 0;
        } else if self.options.backtest_adjustment {
            if let Some(actual) = actual {
                visitors = self.adjuster.adjust(visitors, actual, noise);
            }
        }

        debug!(
            week = %date,
            raw,
            adjusted,
            calibrated,
            historical = ?historical,
            scaling,
            visitors,
            suppressed,
            "forecast step"
        );

        (
            ForecastRecord::new(date, visitors, historical),
            BacktestRow {
                week: date,
                actual_visitors: actual,
                predicted_visitors: visitors,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::FixedNoise;
    use crate::profile::{SeasonalFactors, SeasonalMode};
    use visitor_spi::Observation;

    fn date(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn weekly(location: &str, start: NaiveDate, values: &[f64]) -> ObservationSeries {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(start + Duration::weeks(i as i64), v))
            .collect();
        ObservationSeries::new(location, observations).unwrap()
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 50.0 + 20.0 * (i as f64 * 0.7).sin() + (i % 4) as f64 * 2.5)
            .collect()
    }

    fn plain_options() -> ForecastOptions {
        ForecastOptions {
            strategies: vec![StrategyKind::HoltWinters],
            seasonal: SeasonalProfile::new(SeasonalFactors::STANDARD, SeasonalMode::Multiply),
            calibrate: false,
            blend_history: false,
            ..ForecastOptions::default()
        }
    }

    #[test]
    fn test_to_visitors() {
        assert_eq!(to_visitors(50.0, 1000), 500);
        assert_eq!(to_visitors(-3.0, 1000), 0);
        assert_eq!(to_visitors(0.15, 1000), 2);
    }

    #[test]
    fn test_rejects_short_series() {
        let series = weekly("Goa", date(1, 1, 2024), &wave(11));
        let request = ForecastRequest::new("Goa", date(6, 1, 2025), 4);
        let err = ForecastAssembler::default()
            .forecast(&series, &request)
            .unwrap_err();
        assert_eq!(
            err,
            VisitorError::InsufficientData {
                required: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_rejects_bad_request() {
        let series = weekly("Goa", date(1, 1, 2024), &wave(30));
        let assembler = ForecastAssembler::default();

        let zero_steps = ForecastRequest::new("Goa", date(6, 1, 2025), 0);
        assert!(matches!(
            assembler.forecast(&series, &zero_steps).unwrap_err(),
            VisitorError::InvalidParameter { ref name, .. } if name == "steps"
        ));

        let small_window = ForecastRequest::new("Goa", date(6, 1, 2025), 2).with_window(8);
        assert!(matches!(
            assembler.forecast(&series, &small_window).unwrap_err(),
            VisitorError::InvalidParameter { ref name, .. } if name == "window"
        ));
    }

    /// Model whose fit always fails
    struct Unfittable;

    impl TrendModel for Unfittable {
        fn fit(&mut self, _data: &[f64]) -> Result<()> {
            Err(VisitorError::model_fit("unfittable", "never fits"))
        }

        fn forecast(&self, _steps: usize) -> Result<Vec<f64>> {
            Err(VisitorError::NotFitted)
        }

        fn fitted_values(&self) -> Result<Vec<f64>> {
            Err(VisitorError::NotFitted)
        }

        fn is_fitted(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "unfittable"
        }
    }

    #[test]
    fn test_all_strategies_fail() {
        let candidates: Vec<Box<dyn TrendModel>> = vec![Box::new(Unfittable)];
        match fit_ensemble(candidates, &wave(20)) {
            Err(err) => assert_eq!(
                err,
                VisitorError::ForecastUnavailable {
                    attempted: vec!["unfittable".to_string()]
                }
            ),
            Ok(_) => panic!("expected every strategy to fail"),
        }
    }

    #[test]
    fn test_failing_strategy_is_skipped() {
        let candidates: Vec<Box<dyn TrendModel>> =
            vec![Box::new(Unfittable), StrategyKind::HoltWinters.build()];
        let ensemble = fit_ensemble(candidates, &wave(20)).unwrap();
        assert_eq!(ensemble.names(), vec!["holt_winters".to_string()]);
        assert_eq!(ensemble.forecast(3).unwrap().len(), 3);
    }

    #[test]
    fn test_twelve_week_window_keeps_both_strategies() {
        let series = weekly("Goa", date(1, 1, 2024), &wave(40));
        let options = ForecastOptions {
            strategies: vec![StrategyKind::HoltWinters, StrategyKind::SeasonalArima],
            normalize: true,
            ..ForecastOptions::default()
        };
        let request = ForecastRequest::new("Goa", date(7, 10, 2024), 3).with_window(12);
        let outcome = ForecastAssembler::new(options)
            .forecast(&series, &request)
            .unwrap();
        assert_eq!(
            outcome.strategies,
            vec!["holt_winters".to_string(), "seasonal_arima".to_string()]
        );
        assert_eq!(outcome.records.len(), 3);
    }

    #[test]
    fn test_flat_history_with_arima() {
        let series = weekly("Goa", date(1, 1, 2024), &[40.0; 52]);
        let options = ForecastOptions {
            strategies: vec![StrategyKind::Arima, StrategyKind::SeasonalArima],
            ..plain_options()
        };
        let request = ForecastRequest::new("Goa", date(6, 1, 2025), 4);
        let outcome = ForecastAssembler::new(options)
            .with_holidays(HolidayCalendar::empty())
            .forecast(&series, &request)
            .unwrap();
        assert_eq!(outcome.strategies.len(), 2);
        assert_eq!(outcome.records.len(), 4);
        assert!(outcome.records.iter().all(|r| r.predicted_visitors > 0));
    }

    #[test]
    fn test_step_dates_and_look_back() {
        let series = weekly("Goa", date(1, 1, 2024), &wave(40));
        let options = ForecastOptions {
            look_back: 2,
            ..plain_options()
        };
        let request = ForecastRequest::new("Goa", date(6, 1, 2025), 3);
        let outcome = ForecastAssembler::new(options)
            .with_holidays(HolidayCalendar::empty())
            .forecast(&series, &request)
            .unwrap();

        let forecast_weeks: Vec<String> = outcome.records.iter().map(|r| r.week_label()).collect();
        assert_eq!(forecast_weeks, vec!["06-01-2025", "13-01-2025", "20-01-2025"]);
        let look_back_weeks: Vec<String> =
            outcome.look_back.iter().map(|r| r.week_label()).collect();
        assert_eq!(look_back_weeks, vec!["23-12-2024", "30-12-2024"]);
        assert_eq!(outcome.backtest.len(), 5);
    }

    #[test]
    fn test_backtest_adjustment_uses_actuals() {
        // Weekly from 01-01-2024: 30-09-2024 is index 39
        let series = weekly("Goa", date(1, 1, 2024), &wave(40));
        let options = ForecastOptions {
            look_back: 2,
            backtest_adjustment: true,
            ..plain_options()
        };
        let request = ForecastRequest::new("Goa", date(7, 10, 2024), 2);
        let outcome = ForecastAssembler::new(options)
            .forecast_with_noise(&series, &request, &mut FixedNoise(0.05))
            .unwrap();

        let row = &outcome.backtest[1];
        assert_eq!(row.week, date(30, 9, 2024));
        let actual = row.actual_visitors.unwrap();
        assert!(row.predicted_visitors as f64 >= actual as f64 * 0.9 - 1.0);
        assert!(row.predicted_visitors as f64 <= actual as f64 * 1.1);
        // Future weeks have no actual and are left alone
        assert!(outcome.backtest[2].actual_visitors.is_none());
    }

    #[test]
    fn test_confidence_interval_band() {
        let series = weekly("Taj Mahal", date(1, 1, 2024), &wave(52));
        let request = ForecastRequest::new("Taj Mahal", date(6, 1, 2025), 6);
        let outcome = ForecastAssembler::default()
            .forecast(&series, &request)
            .unwrap();
        for record in &outcome.records {
            let v = record.predicted_visitors as f64;
            assert_eq!(record.confidence_interval.lower, (v * 0.8).round() as u64);
            assert_eq!(record.confidence_interval.upper, (v * 1.2).round() as u64);
            assert!(record.confidence_interval.contains(record.predicted_visitors));
        }
    }

    #[test]
    fn test_outcome_serializes() {
        let series = weekly("Goa", date(1, 1, 2024), &wave(20));
        let request = ForecastRequest::new("Goa", date(6, 1, 2025), 1);
        let outcome = ForecastAssembler::new(plain_options())
            .forecast(&series, &request)
            .unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["records"][0]["week"], "06-01-2025");
        assert_eq!(json["location"], "Goa");
    }

    #[test]
    fn test_month_interest_from_history() {
        // Weekly from 01-01-2024: January 2024 holds indices 0..=4
        let values = wave(20);
        let series = weekly("Goa", date(1, 1, 2024), &values);
        let request = ForecastRequest::new("Goa", date(6, 1, 2025), 1);
        let outcome = ForecastAssembler::new(plain_options())
            .forecast(&series, &request)
            .unwrap();
        let expected = values[..5].iter().sum::<f64>() / 5.0;
        assert!((outcome.month_interest.unwrap() - expected).abs() < 1e-9);

        // No history in August
        let request = ForecastRequest::new("Goa", date(4, 8, 2025), 1);
        let outcome = ForecastAssembler::new(plain_options())
            .forecast(&series, &request)
            .unwrap();
        assert_eq!(outcome.month_interest, None);
    }
}
