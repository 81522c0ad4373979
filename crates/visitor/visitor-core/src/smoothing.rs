//! Holt-Winters exponential smoothing with optional trend damping
//!
//! Additive trend and additive seasonality over a fixed quarterly-of-month
//! period of 4 weekly observations. Smoothing parameters are either fixed up
//! front or chosen by grid search on in-sample one-step squared error.
//!
//! ## Recursions
//!
//! ```text
//! ŷ_t   = l + φ·b + s[t mod m]
//! l'    = α (y_t − s[t mod m]) + (1 − α)(l + φ·b)
//! b'    = β (l' − l) + (1 − β) φ·b
//! s'    = γ (y_t − l') + (1 − γ) s[t mod m]
//! ```
//!
//! The undamped variant is the special case φ = 1.

use serde::{Deserialize, Serialize};
use visitor_spi::{Result, TrendModel, VisitorError, MIN_OBSERVATIONS};

/// Seasonal period in observations
pub const SEASON_PERIOD: usize = 4;

const ALPHA_GRID: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
const BETA_GRID: [f64; 4] = [0.05, 0.1, 0.2, 0.3];
const GAMMA_GRID: [f64; 4] = [0.1, 0.2, 0.3, 0.5];
const PHI_GRID: [f64; 5] = [0.8, 0.85, 0.9, 0.95, 0.98];

/// Smoothing weights of one Holt-Winters fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParameters {
    /// Level smoothing (0 < alpha < 1)
    pub alpha: f64,
    /// Trend smoothing (0 < beta < 1)
    pub beta: f64,
    /// Seasonal smoothing (0 < gamma < 1)
    pub gamma: f64,
    /// Trend damping (0 < phi <= 1); 1 means undamped
    pub phi: f64,
}

impl SmoothingParameters {
    pub fn new(alpha: f64, beta: f64, gamma: f64, phi: f64) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !(0.0 < value && value < 1.0) {
                return Err(VisitorError::invalid_parameter(
                    name,
                    "must be between 0 and 1 (exclusive)",
                ));
            }
        }
        if !(0.0 < phi && phi <= 1.0) {
            return Err(VisitorError::invalid_parameter(
                "phi",
                "must be in (0, 1]",
            ));
        }
        Ok(Self {
            alpha,
            beta,
            gamma,
            phi,
        })
    }
}

/// Result of running the recursions over a training series
#[derive(Debug, Clone)]
struct SmoothingState {
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
    fitted: Vec<f64>,
    sse: f64,
}

/// Holt-Winters model with additive trend and seasonality
///
/// # Example
///
/// ```rust
/// use visitor_core::smoothing::HoltWinters;
/// use visitor_spi::TrendModel;
///
/// let data: Vec<f64> = (0..24).map(|i| 50.0 + (i % 4) as f64 * 5.0).collect();
/// let mut model = HoltWinters::damped();
/// model.fit(&data).unwrap();
/// assert_eq!(model.forecast(6).unwrap().len(), 6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoltWinters {
    damped: bool,
    /// Fixed weights; `None` selects them by grid search at fit time
    fixed: Option<SmoothingParameters>,
    /// Weights used by the current fit
    parameters: Option<SmoothingParameters>,
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
    fitted: Vec<f64>,
    n: usize,
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::new()
    }
}

impl HoltWinters {
    /// Undamped model (φ = 1) with grid-searched weights
    pub fn new() -> Self {
        Self {
            damped: false,
            fixed: None,
            parameters: None,
            level: 0.0,
            trend: 0.0,
            seasonal: vec![0.0; SEASON_PERIOD],
            fitted: Vec::new(),
            n: 0,
        }
    }

    /// Damped-trend model with grid-searched weights including φ
    pub fn damped() -> Self {
        Self {
            damped: true,
            ..Self::new()
        }
    }

    /// Model using the given weights instead of a grid search
    pub fn with_parameters(parameters: SmoothingParameters) -> Self {
        Self {
            damped: parameters.phi < 1.0,
            fixed: Some(parameters),
            ..Self::new()
        }
    }

    pub fn is_damped(&self) -> bool {
        self.damped
    }

    /// Weights chosen by the last fit
    pub fn parameters(&self) -> Option<SmoothingParameters> {
        self.parameters
    }

    /// Get all components: (level, trend, seasonal)
    pub fn components(&self) -> (f64, f64, &[f64]) {
        (self.level, self.trend, &self.seasonal)
    }

    fn run(data: &[f64], params: &SmoothingParameters) -> SmoothingState {
        let m = SEASON_PERIOD;
        let first = data[..m].iter().sum::<f64>() / m as f64;
        let second = data[m..2 * m].iter().sum::<f64>() / m as f64;

        let mut level = first;
        let mut trend = (second - first) / m as f64;
        let mut seasonal: Vec<f64> = data[..m].iter().map(|y| y - first).collect();

        // The first season is reproduced exactly by the initial state
        let mut fitted: Vec<f64> = seasonal.iter().map(|s| level + s).collect();
        fitted.reserve(data.len() - m);
        let mut sse = 0.0;

        for (t, &value) in data.iter().enumerate().skip(m) {
            let idx = t % m;
            let damped_trend = params.phi * trend;
            let prediction = level + damped_trend + seasonal[idx];
            let error = value - prediction;
            sse += error * error;
            fitted.push(prediction);

            let prev_level = level;
            level = params.alpha * (value - seasonal[idx])
                + (1.0 - params.alpha) * (level + damped_trend);
            trend = params.beta * (level - prev_level) + (1.0 - params.beta) * damped_trend;
            seasonal[idx] = params.gamma * (value - level) + (1.0 - params.gamma) * seasonal[idx];
        }

        SmoothingState {
            level,
            trend,
            seasonal,
            fitted,
            sse,
        }
    }

    fn search(&self, data: &[f64]) -> SmoothingParameters {
        let phis: &[f64] = if self.damped { &PHI_GRID } else { &[1.0] };

        let mut best = SmoothingParameters {
            alpha: 0.5,
            beta: 0.1,
            gamma: 0.1,
            phi: phis[0],
        };
        let mut best_sse = f64::MAX;

        for &alpha in &ALPHA_GRID {
            for &beta in &BETA_GRID {
                for &gamma in &GAMMA_GRID {
                    for &phi in phis {
                        let candidate = SmoothingParameters {
                            alpha,
                            beta,
                            gamma,
                            phi,
                        };
                        let sse = Self::run(data, &candidate).sse;
                        if sse.is_finite() && sse < best_sse {
                            best_sse = sse;
                            best = candidate;
                        }
                    }
                }
            }
        }

        best
    }
}

impl TrendModel for HoltWinters {
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        if data.len() < MIN_OBSERVATIONS {
            return Err(VisitorError::model_fit(
                self.name(),
                format!(
                    "need at least {} observations, got {}",
                    MIN_OBSERVATIONS,
                    data.len()
                ),
            ));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(VisitorError::model_fit(self.name(), "non-finite value in series"));
        }

        let params = match self.fixed {
            Some(params) => params,
            None => self.search(data),
        };
        let state = Self::run(data, &params);

        self.parameters = Some(params);
        self.level = state.level;
        self.trend = state.trend;
        self.seasonal = state.seasonal;
        self.fitted = state.fitted;
        self.n = data.len();
        Ok(())
    }

    fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        let params = self.parameters.ok_or(VisitorError::NotFitted)?;

        let mut forecasts = Vec::with_capacity(steps);
        let mut damping = 0.0;
        let mut power = 1.0;
        for h in 1..=steps {
            power *= params.phi;
            damping += power;
            let idx = (self.n + h - 1) % SEASON_PERIOD;
            forecasts.push(self.level + damping * self.trend + self.seasonal[idx]);
        }

        Ok(forecasts)
    }

    fn fitted_values(&self) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(VisitorError::NotFitted);
        }
        Ok(self.fitted.clone())
    }

    fn is_fitted(&self) -> bool {
        self.parameters.is_some()
    }

    fn name(&self) -> &str {
        if self.damped {
            "damped_holt_winters"
        } else {
            "holt_winters"
        }
    }
}
