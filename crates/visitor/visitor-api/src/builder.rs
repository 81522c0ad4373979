//! Forecaster builder.

use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;
use visitor_core::{
    ForecastAssembler, ForecastOutcome, ForecastRequest, HolidayCalendar, RawTable, ScalingTable,
    SeasonalMode, SeriesLoader, StrategyKind,
};
use visitor_spi::{ObservationSeries, Result};

use crate::config::{BacktestConfig, FactorTable, ForecastConfig};

/// Ready-to-run forecaster: loader, assembler and the configuration they came from.
#[derive(Debug, Clone)]
pub struct Forecaster {
    config: ForecastConfig,
    loader: SeriesLoader,
    assembler: ForecastAssembler,
}

impl Forecaster {
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn assembler(&self) -> &ForecastAssembler {
        &self.assembler
    }

    pub fn loader(&self) -> &SeriesLoader {
        &self.loader
    }

    /// Request for `location` from `start` using the configured steps and window.
    pub fn request(&self, location: &str, start: NaiveDate) -> ForecastRequest {
        let request = ForecastRequest::new(location, start, self.config.steps);
        match self.config.window {
            Some(window) => request.with_window(window),
            None => request,
        }
    }

    /// Forecast an already loaded series.
    pub fn forecast(&self, series: &ObservationSeries, start: NaiveDate) -> Result<ForecastOutcome> {
        let request = self.request(series.location(), start);
        let mut noise = self.config.backtest.noise_source();
        self.assembler
            .forecast_with_noise(series, &request, &mut *noise)
    }

    /// Load `location` from a raw table and forecast it.
    pub fn forecast_table(
        &self,
        table: &RawTable,
        location: &str,
        start: NaiveDate,
    ) -> Result<ForecastOutcome> {
        let series = self.loader.load(table, location)?;
        self.forecast(&series, start)
    }

    /// Load `location` from a CSV file and forecast it.
    pub fn forecast_csv(&self, path: &Path, location: &str, start: NaiveDate) -> Result<ForecastOutcome> {
        let series = self.loader.load_path(path, location)?;
        self.forecast(&series, start)
    }
}

/// Builder for [`Forecaster`].
#[derive(Debug, Clone, Default)]
pub struct ForecasterBuilder {
    config: ForecastConfig,
    scaling: Option<ScalingTable>,
    holiday_calendar: Option<HolidayCalendar>,
}

impl ForecasterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ForecastConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // ========== Strategy Methods ==========

    /// Replace the strategy list.
    pub fn strategies(mut self, strategies: Vec<StrategyKind>) -> Self {
        self.config.strategies = strategies;
        self
    }

    /// Append one strategy.
    pub fn add_strategy(mut self, strategy: StrategyKind) -> Self {
        if !self.config.strategies.contains(&strategy) {
            self.config.strategies.push(strategy);
        }
        self
    }

    // ========== Adjustment Methods ==========

    pub fn seasonal_factors(mut self, table: FactorTable) -> Self {
        self.config.seasonal_factors = table;
        self
    }

    pub fn seasonal_mode(mut self, mode: SeasonalMode) -> Self {
        self.config.seasonal_mode = mode;
        self
    }

    pub fn calibrate(mut self, enabled: bool) -> Self {
        self.config.calibrate = enabled;
        self
    }

    pub fn blend_history(mut self, enabled: bool) -> Self {
        self.config.blend_history = enabled;
        self
    }

    pub fn normalize(mut self, enabled: bool) -> Self {
        self.config.normalize = enabled;
        self
    }

    /// Toggle the holiday boost.
    pub fn holidays(mut self, enabled: bool) -> Self {
        self.config.holidays = enabled;
        self
    }

    // ========== Request Methods ==========

    pub fn steps(mut self, steps: usize) -> Self {
        self.config.steps = steps;
        self
    }

    pub fn window(mut self, window: usize) -> Self {
        self.config.window = Some(window);
        self
    }

    pub fn date_column(mut self, name: &str) -> Self {
        self.config.date_column = name.to_string();
        self
    }

    pub fn backtest(mut self, backtest: BacktestConfig) -> Self {
        self.config.backtest = backtest;
        self
    }

    // ========== Table Overrides ==========

    /// Use a custom scaling table instead of the built-in one.
    pub fn scaling(mut self, table: ScalingTable) -> Self {
        self.scaling = Some(table);
        self
    }

    /// Use a custom holiday calendar instead of the built-in one.
    pub fn holiday_calendar(mut self, calendar: HolidayCalendar) -> Self {
        self.holiday_calendar = Some(calendar);
        self
    }

    /// Validate the configuration and build the forecaster.
    pub fn build(self) -> Result<Forecaster> {
        self.config.validate()?;

        let holidays = if self.config.holidays {
            self.holiday_calendar.unwrap_or_default()
        } else {
            HolidayCalendar::empty()
        };
        let assembler = ForecastAssembler::new(self.config.to_options())
            .with_scaling(self.scaling.unwrap_or_default())
            .with_holidays(holidays);
        let loader = SeriesLoader::new().with_date_column(self.config.date_column.clone());

        debug!(
            strategies = ?self.config.strategies,
            steps = self.config.steps,
            window = ?self.config.window,
            backtest = self.config.backtest.enabled,
            "forecaster built"
        );

        Ok(Forecaster {
            config: self.config,
            loader,
            assembler,
        })
    }
}
