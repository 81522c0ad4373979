//! Forecast configuration types.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use visitor_core::{
    ForecastOptions, NoNoise, SeasonalFactors, SeasonalMode, SeasonalProfile, StrategyKind,
    UniformNoise,
};
use visitor_spi::{NoiseSource, Result, VisitorError, MIN_OBSERVATIONS};

/// Weeks re-forecast before the start date when back-testing
pub const DEFAULT_LOOK_BACK: usize = 4;

/// Forecast weeks produced when not specified
pub const DEFAULT_STEPS: usize = 4;

/// Built-in seasonal multiplier tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorTable {
    #[default]
    Standard,
    Amplified,
}

impl FactorTable {
    pub fn factors(&self) -> SeasonalFactors {
        match self {
            Self::Standard => SeasonalFactors::STANDARD,
            Self::Amplified => SeasonalFactors::AMPLIFIED,
        }
    }
}

/// Back-test adjustment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Re-forecast the look-back weeks and pull them toward actuals
    pub enabled: bool,
    /// Noise seed; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Weeks before the start date to re-forecast
    pub look_back: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            seed: None,
            look_back: DEFAULT_LOOK_BACK,
        }
    }
}

impl BacktestConfig {
    /// Enabled with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            enabled: true,
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Noise source matching these settings.
    pub fn noise_source(&self) -> Box<dyn NoiseSource> {
        match (self.enabled, self.seed) {
            (false, _) => Box::new(NoNoise),
            (true, Some(seed)) => Box::new(UniformNoise::seeded(seed)),
            (true, None) => Box::new(UniformNoise::from_entropy()),
        }
    }
}

/// Consumer configuration for a forecast run.
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes:
///
/// ```json
/// { "strategies": ["holt_winters"], "seasonal_mode": "multiply", "window": 12 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Strategies whose forecasts are averaged
    pub strategies: Vec<StrategyKind>,
    pub seasonal_factors: FactorTable,
    pub seasonal_mode: SeasonalMode,
    pub calibrate: bool,
    pub blend_history: bool,
    /// Min-max rescale the series onto 0..100 before fitting
    pub normalize: bool,
    /// Apply the holiday calendar boost
    pub holidays: bool,
    /// Forecast weeks per request
    pub steps: usize,
    /// Train on only the last `window` observations
    pub window: Option<usize>,
    /// Name of the date column in the input table
    pub date_column: String,
    pub backtest: BacktestConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            strategies: StrategyKind::defaults(),
            seasonal_factors: FactorTable::Standard,
            seasonal_mode: SeasonalMode::Divide,
            calibrate: true,
            blend_history: true,
            normalize: false,
            holidays: true,
            steps: DEFAULT_STEPS,
            window: None,
            date_column: visitor_core::loader::DEFAULT_DATE_COLUMN.to_string(),
            backtest: BacktestConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| VisitorError::Config(e.to_string()))
    }

    /// Read and parse a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| VisitorError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| VisitorError::Config(e.to_string()))
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            return Err(VisitorError::invalid_parameter(
                "strategies",
                "at least one strategy is required",
            ));
        }
        if self.steps == 0 {
            return Err(VisitorError::invalid_parameter("steps", "must be at least 1"));
        }
        if let Some(window) = self.window {
            if window < MIN_OBSERVATIONS {
                return Err(VisitorError::invalid_parameter(
                    "window",
                    format!("must be at least {}", MIN_OBSERVATIONS),
                ));
            }
        }
        if self.date_column.trim().is_empty() {
            return Err(VisitorError::invalid_parameter(
                "date_column",
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// Assembler options for this configuration.
    pub fn to_options(&self) -> ForecastOptions {
        ForecastOptions {
            strategies: self.strategies.clone(),
            seasonal: SeasonalProfile::new(self.seasonal_factors.factors(), self.seasonal_mode),
            calibrate: self.calibrate,
            blend_history: self.blend_history,
            look_back: if self.backtest.enabled {
                self.backtest.look_back
            } else {
                0
            },
            normalize: self.normalize,
            backtest_adjustment: self.backtest.enabled,
        }
    }
}
