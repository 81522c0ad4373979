//! Visitor Forecasting Consumer API
//!
//! Consumer configuration and builder APIs for visitor forecasting.
//!
//! This crate provides:
//! - [`ForecastConfig`]: serde configuration, loadable from JSON
//! - [`ForecasterBuilder`]: turns configuration into a ready [`Forecaster`]
//! - Re-exports from SPI and core for convenience

pub mod builder;
pub mod config;

pub use builder::{Forecaster, ForecasterBuilder};
pub use config::{BacktestConfig, FactorTable, ForecastConfig, DEFAULT_LOOK_BACK, DEFAULT_STEPS};

// Re-export from core
pub use visitor_core::{
    arima, assembler, backtest, blend, calibration, holiday, loader, metrics, profile, smoothing,
    strategy, Arima, BacktestAdjuster, BacktestSummary, FixedNoise, ForecastAssembler,
    ForecastOptions, ForecastOutcome, ForecastRequest, HistoricalBlender, HolidayCalendar,
    HoltWinters, LinearCalibration, MegaEventRule, NoNoise, RawTable, ScalingTable, Season,
    SeasonalFactors, SeasonalMode, SeasonalProfile, SeriesLoader, StrategyKind, UniformNoise,
};

// Re-export from SPI
pub use visitor_spi::{
    format_week, parse_week, BacktestRow, CalibrationParameters, ErrorKind, ForecastRecord,
    NoiseSource, Observation, ObservationSeries, Result, TrendModel, VisitorBounds, VisitorError,
    MIN_OBSERVATIONS,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{BacktestConfig, FactorTable, ForecastConfig, Forecaster, ForecasterBuilder};
    pub use visitor_core::{
        ForecastAssembler, ForecastOptions, ForecastOutcome, ForecastRequest, HolidayCalendar,
        ScalingTable, SeasonalMode, SeriesLoader, StrategyKind,
    };
    pub use visitor_spi::{
        parse_week, ForecastRecord, NoiseSource, ObservationSeries, Result, TrendModel,
        VisitorError,
    };
}
