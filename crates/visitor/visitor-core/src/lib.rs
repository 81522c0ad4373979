//! Visitor Forecasting Core
//!
//! Implementations behind the visitor forecasting contracts: series loading,
//! seasonal and scaling tables, the holiday calendar, Holt-Winters and ARIMA
//! strategies, calibration, historical blending and the per-request
//! [`ForecastAssembler`].

pub mod arima;
pub mod assembler;
pub mod backtest;
pub mod blend;
pub mod calibration;
pub mod holiday;
mod linalg;
pub mod loader;
pub mod metrics;
pub mod profile;
pub mod smoothing;
pub mod strategy;

// Re-export SPI items for implementations
pub use visitor_spi::{
    BacktestRow, CalibrationParameters, ErrorKind, ForecastRecord, NoiseSource, Observation,
    ObservationSeries, Result, TrendModel, VisitorBounds, VisitorError, MIN_OBSERVATIONS,
};

// Re-export main types
pub use arima::{Arima, SeasonalOrder};
pub use assembler::{ForecastAssembler, ForecastOptions, ForecastOutcome, ForecastRequest};
pub use backtest::{BacktestAdjuster, FixedNoise, NoNoise, UniformNoise};
pub use blend::HistoricalBlender;
pub use calibration::LinearCalibration;
pub use holiday::HolidayCalendar;
pub use loader::{RawTable, SeriesLoader};
pub use metrics::BacktestSummary;
pub use profile::{
    MegaEventRule, ScalingTable, Season, SeasonalFactors, SeasonalMode, SeasonalProfile,
};
pub use smoothing::{HoltWinters, SmoothingParameters};
pub use strategy::StrategyKind;
