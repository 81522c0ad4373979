//! Contract module containing trait definitions for forecasting strategies

mod noise_source;
mod trend_model;

pub use noise_source::NoiseSource;
pub use trend_model::TrendModel;
