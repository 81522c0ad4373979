//! Closed set of forecasting strategies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use visitor_spi::{TrendModel, VisitorError};

use crate::arima::Arima;
use crate::smoothing::HoltWinters;

/// Forecasting strategy selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Holt-Winters, additive trend and seasonality
    HoltWinters,
    /// Holt-Winters with a damped trend
    DampedHoltWinters,
    /// ARIMA(1, 1, 0)
    Arima,
    /// ARIMA(1, 1, 1)(1, 1, 1, 4)
    SeasonalArima,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        Self::HoltWinters,
        Self::DampedHoltWinters,
        Self::Arima,
        Self::SeasonalArima,
    ];

    /// Fresh, unfitted model for this strategy
    pub fn build(&self) -> Box<dyn TrendModel> {
        match self {
            Self::HoltWinters => Box::new(HoltWinters::new()),
            Self::DampedHoltWinters => Box::new(HoltWinters::damped()),
            Self::Arima => Box::new(Arima::baseline()),
            Self::SeasonalArima => Box::new(Arima::seasonal_default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HoltWinters => "holt_winters",
            Self::DampedHoltWinters => "damped_holt_winters",
            Self::Arima => "arima",
            Self::SeasonalArima => "seasonal_arima",
        }
    }

    /// Default pair: damped smoothing averaged with seasonal ARIMA
    pub fn defaults() -> Vec<StrategyKind> {
        vec![Self::DampedHoltWinters, Self::SeasonalArima]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = VisitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                VisitorError::invalid_parameter(
                    "strategy",
                    format!(
                        "unknown strategy '{}', expected one of: {}",
                        s,
                        Self::ALL.map(|k| k.as_str()).join(", ")
                    ),
                )
            })
    }
}
