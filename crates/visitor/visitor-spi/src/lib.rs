//! Visitor Forecasting Service Provider Interface
//!
//! Defines the contracts, error taxonomy and data model shared by every
//! visitor forecasting implementation:
//!
//! - [`TrendModel`]: fit/forecast capability implemented by each strategy
//! - [`NoiseSource`]: injectable randomness for the back-test adjustment
//! - [`VisitorError`]: standardized error type, grouped by [`ErrorKind`]
//! - [`ObservationSeries`], [`ForecastRecord`]: input and output entities

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{NoiseSource, TrendModel};
pub use error::{ErrorKind, Result, VisitorError};
pub use model::{
    format_week, parse_week, week_format, BacktestRow, CalibrationParameters, ForecastRecord,
    Observation, ObservationSeries, VisitorBounds, MIN_OBSERVATIONS, WEEK_FORMAT,
};
