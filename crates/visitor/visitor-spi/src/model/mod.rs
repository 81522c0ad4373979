//! Model module containing data structures

mod calibration_parameters;
mod forecast_record;
mod observation;
mod week;

pub use calibration_parameters::CalibrationParameters;
pub use forecast_record::{BacktestRow, ForecastRecord, VisitorBounds};
pub use observation::{Observation, ObservationSeries, MIN_OBSERVATIONS};
pub use week::{format_week, parse_week, week_format, WEEK_FORMAT};
