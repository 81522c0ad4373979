//! Integration tests for visitor-facade
//!
//! Exercises the building blocks through the facade re-exports.

use chrono::NaiveDate;
use visitor_facade::{
    BacktestAdjuster, FixedNoise, HistoricalBlender, HolidayCalendar, HoltWinters,
    LinearCalibration, MegaEventRule, Observation, ObservationSeries, ScalingTable, Season,
    SeasonalFactors, SeasonalMode, SeasonalProfile, StrategyKind, TrendModel, VisitorBounds,
};

fn date(day: u32, month: u32, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn test_month_to_season() {
    let profile = SeasonalProfile::default();
    assert_eq!(profile.resolve(1), (Season::WinterPeak, 1.2));
    assert_eq!(profile.resolve(7), (Season::SummerPeak, 0.9));
    assert_eq!(profile.resolve(9), (Season::Monsoon, 0.8));
    assert_eq!(profile.resolve(4), (Season::Spring, 1.1));
    assert_eq!(profile.resolve(5), (Season::PreSummer, 1.05));
    assert_eq!(profile.resolve(10), (Season::Autumn, 1.0));
    assert_eq!(profile.resolve(2), (Season::Regular, 1.0));
}

#[test]
fn test_seasonal_modes() {
    let divide = SeasonalProfile::new(SeasonalFactors::STANDARD, SeasonalMode::Divide);
    let multiply = SeasonalProfile::new(SeasonalFactors::AMPLIFIED, SeasonalMode::Multiply);
    assert!((divide.adjust(60.0, 12) - 50.0).abs() < 1e-9);
    assert!((multiply.adjust(60.0, 12) - 75.0).abs() < 1e-9);
}

#[test]
fn test_scaling_lookup() {
    let table = ScalingTable::builtin();
    assert_eq!(table.factor("Taj Mahal", 6), 145_000);
    assert_eq!(table.factor("Maha Kumbh", 1), 3_000_000);
    assert_eq!(table.factor("Nowhere In Particular", 3), 500);
    // Monthly table wins over the flat factor
    assert_eq!(table.factor("Hampi", 1), 65_000);
    assert_eq!(table.factor("hampi", 12), 98_000);
}

#[test]
fn test_holiday_boost() {
    let calendar = HolidayCalendar::default();
    assert_eq!(calendar.apply(10_000, date(2, 10, 2025)), 12_000);
    assert_eq!(calendar.apply(10_000, date(3, 10, 2025)), 10_000);
}

#[test]
fn test_mega_event_rule() {
    let rule = MegaEventRule::maha_kumbh();
    assert!(!rule.suppresses("Maha Kumbh", 2025));
    assert!(rule.suppresses("Maha Kumbh", 2026));
    assert!(!rule.suppresses("Goa", 2026));
}

#[test]
fn test_bounds_property() {
    for v in [0_u64, 1, 7, 999, 145_000, 3_000_000] {
        let bounds = VisitorBounds::around(v);
        assert_eq!(bounds.lower, (v as f64 * 0.8).round() as u64);
        assert_eq!(bounds.upper, (v as f64 * 1.2).round() as u64);
        assert!(bounds.contains(v));
    }
}

#[test]
fn test_calibration_then_blend() {
    let mut calibration = LinearCalibration::new();
    calibration
        .fit(&[10.0, 20.0, 30.0], &[15.0, 25.0, 35.0])
        .unwrap();
    let calibrated = calibration.apply(40.0).unwrap();
    assert!((calibrated - 45.0).abs() < 1e-9);

    let blender = HistoricalBlender::new();
    assert!((blender.blend(calibrated, Some(35.0)) - 40.0).abs() < 1e-9);
}

#[test]
fn test_historical_average_from_series() {
    let series = ObservationSeries::new(
        "Goa",
        vec![
            Observation::new(date(10, 3, 2023), 20.0),
            Observation::new(date(10, 3, 2024), 40.0),
            Observation::new(date(17, 3, 2024), 50.0),
        ],
    )
    .unwrap();
    let blender = HistoricalBlender::new();
    assert_eq!(blender.average(&series, date(10, 3, 2025)), Some(30.0));
    assert_eq!(blender.average(&series, date(11, 3, 2025)), None);
}

#[test]
fn test_every_strategy_fits_noisy_history() {
    let data: Vec<f64> = (0..60)
        .map(|i| {
            let t = i as f64;
            45.0 + 15.0 * (t * 0.4).sin() + ((i * 37 + 11) % 17) as f64 * 0.6
        })
        .collect();

    for kind in [StrategyKind::HoltWinters, StrategyKind::DampedHoltWinters, StrategyKind::Arima] {
        let mut model = kind.build();
        model.fit(&data).unwrap();
        let forecast = model.forecast(5).unwrap();
        assert_eq!(forecast.len(), 5, "{}", kind);
        assert!(forecast.iter().all(|v| v.is_finite()), "{}", kind);
        assert!(!model.fitted_values().unwrap().is_empty());
    }
}

#[test]
fn test_trend_model_object_safety() {
    let mut models: Vec<Box<dyn TrendModel>> =
        vec![Box::new(HoltWinters::new()), StrategyKind::Arima.build()];
    let data: Vec<f64> = (0..16).map(|i| 10.0 + (i % 4) as f64 + i as f64 * 0.5).collect();
    for model in models.iter_mut() {
        model.fit(&data).unwrap();
        assert!(model.is_fitted());
    }
}

#[test]
fn test_backtest_adjuster_band() {
    let adjuster = BacktestAdjuster::default();
    assert_eq!(adjuster.adjust(2_000, 1_000, &mut FixedNoise(-0.05)), 1_100);
    assert_eq!(adjuster.adjust(1_000, 1_000, &mut FixedNoise(-0.25)), 900);
}
