//! Seasonal ARIMA estimated by two-stage least squares
//!
//! The series is differenced with the operator polynomial
//! `(1 − B)^d (1 − B^s)^D`, an ARMA model with lags `{1..p} ∪ {s, 2s, .., Ps}`
//! (AR) and `{1..q} ∪ {s, 2s, .., Qs}` (MA) is estimated on the differenced
//! series, and forecasts are integrated back through the same polynomial.
//!
//! ## Estimation (Hannan–Rissanen)
//!
//! 1. Fit a long autoregression by OLS; its residuals stand in for the
//!    unobserved innovations.
//! 2. Regress the differenced series on its AR lags and the lagged proxy
//!    innovations.
//!
//! A constant is estimated only when no differencing is applied. Every
//! coefficient is bounded to `(-0.99, 0.99)`.
//!
//! ## Example
//!
//! ```rust
//! use visitor_core::arima::Arima;
//! use visitor_spi::TrendModel;
//!
//! let data: Vec<f64> = (1..=20).map(|x| x as f64 * 1.5).collect();
//! let mut model = Arima::new(1, 1, 0).unwrap();
//! model.fit(&data).unwrap();
//! assert_eq!(model.forecast(3).unwrap().len(), 3);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use visitor_spi::{Result, TrendModel, VisitorError};

use crate::linalg::{least_squares, ridge_least_squares};

/// Coefficient bound keeping the fitted process away from the unit circle
const COEFFICIENT_BOUND: f64 = 0.99;

/// Minimum order of the long autoregression in the first stage
const MIN_LONG_AR: usize = 4;

/// Relative diagonal loading for systems plain least squares cannot solve
const RIDGE_PENALTY: f64 = 1e-6;

/// Spread below which a regressor column carries no information
const FLAT_TOLERANCE: f64 = 1e-12;

/// Seasonal part of the model order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal AR order (P)
    pub p: usize,
    /// Seasonal differencing (D)
    pub d: usize,
    /// Seasonal MA order (Q)
    pub q: usize,
    /// Season length (s)
    pub period: usize,
}

/// ARIMA(p, d, q)(P, D, Q, s) model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arima {
    p: usize,
    d: usize,
    q: usize,
    seasonal: Option<SeasonalOrder>,
    /// (lag, coefficient) pairs
    ar: Vec<(usize, f64)>,
    /// (lag, coefficient) pairs
    ma: Vec<(usize, f64)>,
    constant: f64,
    /// Coefficients of the differencing polynomial, `c[0] == 1`
    difference_poly: Vec<f64>,
    history: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    fitted: Vec<f64>,
    is_fitted: bool,
}

impl Arima {
    /// Create a non-seasonal ARIMA model
    ///
    /// # Arguments
    ///
    /// * `p` - Order of autoregressive component (0-10)
    /// * `d` - Degree of differencing (0-2)
    /// * `q` - Order of moving average component (0-10)
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p > 10 {
            return Err(VisitorError::invalid_parameter("p", "AR order must be <= 10"));
        }
        if d > 2 {
            return Err(VisitorError::invalid_parameter(
                "d",
                "Differencing order must be <= 2",
            ));
        }
        if q > 10 {
            return Err(VisitorError::invalid_parameter("q", "MA order must be <= 10"));
        }

        Ok(Self {
            p,
            d,
            q,
            ..Self::empty()
        })
    }

    /// Add a seasonal component `(P, D, Q, s)`
    pub fn with_seasonal(mut self, p: usize, d: usize, q: usize, period: usize) -> Result<Self> {
        if period < 2 {
            return Err(VisitorError::invalid_parameter(
                "period",
                "must be at least 2",
            ));
        }
        if p > 2 || q > 2 {
            return Err(VisitorError::invalid_parameter(
                "seasonal order",
                "seasonal AR and MA orders must be <= 2",
            ));
        }
        if d > 1 {
            return Err(VisitorError::invalid_parameter(
                "D",
                "Seasonal differencing order must be <= 1",
            ));
        }
        self.seasonal = Some(SeasonalOrder { p, d, q, period });
        Ok(self)
    }

    /// Baseline ARIMA(1, 1, 0)
    pub fn baseline() -> Self {
        Self {
            p: 1,
            d: 1,
            q: 0,
            ..Self::empty()
        }
    }

    /// Seasonal ARIMA(1, 1, 1)(1, 1, 1, 4)
    pub fn seasonal_default() -> Self {
        Self {
            p: 1,
            d: 1,
            q: 1,
            seasonal: Some(SeasonalOrder {
                p: 1,
                d: 1,
                q: 1,
                period: 4,
            }),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            p: 0,
            d: 0,
            q: 0,
            seasonal: None,
            ar: Vec::new(),
            ma: Vec::new(),
            constant: 0.0,
            difference_poly: vec![1.0],
            history: Vec::new(),
            differenced: Vec::new(),
            residuals: Vec::new(),
            fitted: Vec::new(),
            is_fitted: false,
        }
    }

    /// Non-seasonal order (p, d, q)
    pub fn params(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    pub fn seasonal_order(&self) -> Option<SeasonalOrder> {
        self.seasonal
    }

    /// Estimated AR terms as (lag, coefficient)
    pub fn ar_coefficients(&self) -> &[(usize, f64)] {
        &self.ar
    }

    /// Estimated MA terms as (lag, coefficient)
    pub fn ma_coefficients(&self) -> &[(usize, f64)] {
        &self.ma
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    fn has_constant(&self) -> bool {
        self.d == 0 && self.seasonal.map_or(true, |s| s.d == 0)
    }

    fn ar_lags(&self) -> Vec<usize> {
        let mut lags: Vec<usize> = (1..=self.p).collect();
        if let Some(s) = self.seasonal {
            lags.extend((1..=s.p).map(|k| k * s.period));
        }
        lags.sort_unstable();
        lags.dedup();
        lags
    }

    fn ma_lags(&self) -> Vec<usize> {
        let mut lags: Vec<usize> = (1..=self.q).collect();
        if let Some(s) = self.seasonal {
            lags.extend((1..=s.q).map(|k| k * s.period));
        }
        lags.sort_unstable();
        lags.dedup();
        lags
    }

    fn max_lag(&self) -> usize {
        self.ar_lags()
            .into_iter()
            .chain(self.ma_lags())
            .max()
            .unwrap_or(0)
    }

    /// `(1 − B)^d (1 − B^s)^D` as coefficients of `B^0, B^1, ...`
    fn build_difference_poly(&self) -> Vec<f64> {
        let mut poly = vec![1.0];
        for _ in 0..self.d {
            poly = multiply(&poly, &seasonal_difference(1));
        }
        if let Some(s) = self.seasonal {
            for _ in 0..s.d {
                poly = multiply(&poly, &seasonal_difference(s.period));
            }
        }
        poly
    }

    fn difference(poly: &[f64], data: &[f64]) -> Vec<f64> {
        let k = poly.len() - 1;
        (k..data.len())
            .map(|t| {
                poly.iter()
                    .enumerate()
                    .map(|(j, c)| c * data[t - j])
                    .sum()
            })
            .collect()
    }

    /// Value at position `t` of the original series given its differenced value
    fn integrate(poly: &[f64], differenced: f64, series: &[f64], t: usize) -> f64 {
        differenced
            - poly
                .iter()
                .enumerate()
                .skip(1)
                .map(|(j, c)| c * series[t - j])
                .sum::<f64>()
    }

    /// Prediction of `w[t]` from lagged values and innovations
    fn predict_differenced(&self, w: &[f64], e: &[f64], t: usize) -> f64 {
        let ar: f64 = self.ar.iter().map(|&(lag, c)| c * w[t - lag]).sum();
        let ma: f64 = self.ma.iter().map(|&(lag, c)| c * e[t - lag]).sum();
        self.constant + ar + ma
    }

    fn estimate(&mut self, w: &[f64]) -> Result<()> {
        let ar_lags = self.ar_lags();
        let ma_lags = self.ma_lags();
        let with_constant = self.has_constant();
        let regressors = ar_lags.len() + ma_lags.len() + usize::from(with_constant);

        if regressors == 0 {
            return Ok(());
        }

        let max_ar = ar_lags.last().copied().unwrap_or(0);
        let max_ma = ma_lags.last().copied().unwrap_or(0);
        let min_start = max_ar.max(max_ma);

        // Stage 1: long autoregression for innovation proxies, capped at the
        // order the differenced rows can support
        let (proxies, stage_start) = if ma_lags.is_empty() {
            (vec![0.0; w.len()], max_ar)
        } else {
            let capacity = w.len().saturating_sub(2 + usize::from(with_constant)) / 2;
            let order = (2 * self.max_lag()).max(MIN_LONG_AR).min(capacity);
            let residuals = self.long_ar_residuals(w, order, with_constant)?;
            let full_start = (order + max_ma).max(max_ar);
            let start = if w.len() >= full_start + regressors + 2 {
                full_start
            } else {
                min_start
            };
            (residuals, start)
        };

        // Stage 2: OLS on AR lags and lagged proxies
        let rows = w.len().saturating_sub(stage_start);
        if rows < 2 {
            return Err(VisitorError::model_fit(
                self.name(),
                format!("need at least 2 usable rows after differencing, got {}", rows),
            ));
        }

        let mut design = Vec::with_capacity(rows);
        let mut targets = Vec::with_capacity(rows);
        for t in stage_start..w.len() {
            let mut row = Vec::with_capacity(regressors);
            if with_constant {
                row.push(1.0);
            }
            row.extend(ar_lags.iter().map(|&lag| w[t - lag]));
            row.extend(ma_lags.iter().map(|&lag| proxies[t - lag]));
            design.push(row);
            targets.push(w[t]);
        }

        let coeffs = self.solve_stage(&design, &targets, with_constant)?;

        let mut rest = coeffs.into_iter();
        self.constant = if with_constant {
            rest.next().unwrap_or(0.0)
        } else {
            0.0
        };
        let bounded = |c: f64| c.clamp(-COEFFICIENT_BOUND, COEFFICIENT_BOUND);
        self.ar = ar_lags
            .iter()
            .map(|&lag| (lag, bounded(rest.next().unwrap_or(0.0))))
            .collect();
        self.ma = ma_lags
            .iter()
            .map(|&lag| (lag, bounded(rest.next().unwrap_or(0.0))))
            .collect();
        Ok(())
    }

    /// Least squares over the informative columns of `design`
    ///
    /// Columns without variation (all zero, or constant next to the
    /// intercept) get a zero coefficient. Singular or short systems fall
    /// back to a ridge solve.
    fn solve_stage(
        &self,
        design: &[Vec<f64>],
        targets: &[f64],
        with_constant: bool,
    ) -> Result<Vec<f64>> {
        let width = design.first().map_or(0, Vec::len);
        let active: Vec<usize> = (0..width)
            .filter(|&j| {
                let column: Vec<f64> = design.iter().map(|row| row[j]).collect();
                if with_constant && j == 0 {
                    true
                } else if with_constant {
                    !is_flat(&column)
                } else {
                    column.iter().any(|v| v.abs() > FLAT_TOLERANCE)
                }
            })
            .collect();

        let mut coeffs = vec![0.0; width];
        if active.is_empty() {
            return Ok(coeffs);
        }

        let reduced: Vec<Vec<f64>> = design
            .iter()
            .map(|row| active.iter().map(|&j| row[j]).collect())
            .collect();
        let solution = least_squares(&reduced, targets)
            .or_else(|| ridge_least_squares(&reduced, targets, RIDGE_PENALTY))
            .ok_or_else(|| VisitorError::model_fit(self.name(), "singular design matrix"))?;
        if solution.iter().any(|c| !c.is_finite()) {
            return Err(VisitorError::model_fit(self.name(), "non-finite coefficients"));
        }

        for (&j, c) in active.iter().zip(solution) {
            coeffs[j] = c;
        }
        Ok(coeffs)
    }

    fn long_ar_residuals(&self, w: &[f64], order: usize, with_constant: bool) -> Result<Vec<f64>> {
        // Nothing to explain: innovations are zero
        if order == 0 || is_flat(w) {
            return Ok(vec![0.0; w.len()]);
        }

        let regressors = order + usize::from(with_constant);
        let rows = w.len().saturating_sub(order);
        if rows < regressors + 2 {
            return Err(VisitorError::model_fit(
                self.name(),
                format!(
                    "long autoregression of order {} needs {} rows, got {}",
                    order,
                    regressors + 2,
                    rows
                ),
            ));
        }

        let design: Vec<Vec<f64>> = (order..w.len())
            .map(|t| {
                let mut row = Vec::with_capacity(regressors);
                if with_constant {
                    row.push(1.0);
                }
                row.extend((1..=order).map(|lag| w[t - lag]));
                row
            })
            .collect();
        let coeffs = least_squares(&design, &w[order..])
            .or_else(|| ridge_least_squares(&design, &w[order..], RIDGE_PENALTY))
            .ok_or_else(|| {
                VisitorError::model_fit(self.name(), "singular long autoregression")
            })?;

        let mut residuals = vec![0.0; w.len()];
        for (i, row) in design.iter().enumerate() {
            let prediction: f64 = row.iter().zip(&coeffs).map(|(x, c)| x * c).sum();
            residuals[order + i] = w[order + i] - prediction;
        }
        Ok(residuals)
    }
}

/// Whether every value equals the first within tolerance
fn is_flat(values: &[f64]) -> bool {
    let Some(&first) = values.first() else {
        return true;
    };
    let tolerance = FLAT_TOLERANCE * first.abs().max(1.0);
    values.iter().all(|v| (v - first).abs() <= tolerance)
}

fn seasonal_difference(period: usize) -> Vec<f64> {
    let mut poly = vec![0.0; period + 1];
    poly[0] = 1.0;
    poly[period] = -1.0;
    poly
}

fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

impl TrendModel for Arima {
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        self.is_fitted = false;
        if data.iter().any(|v| !v.is_finite()) {
            return Err(VisitorError::model_fit(self.name(), "non-finite value in series"));
        }

        let poly = self.build_difference_poly();
        let k = poly.len() - 1;
        let max_lag = self.max_lag();
        if data.len() < k + max_lag + 2 {
            return Err(VisitorError::model_fit(
                self.name(),
                format!(
                    "need at least {} observations, got {}",
                    k + max_lag + 2,
                    data.len()
                ),
            ));
        }

        let w = Self::difference(&poly, data);
        self.ar.clear();
        self.ma.clear();
        self.constant = 0.0;
        self.estimate(&w)?;

        // In-sample innovations and one-step predictions on the original scale
        let mut residuals = vec![0.0; w.len()];
        let mut fitted = Vec::with_capacity(w.len().saturating_sub(max_lag));
        for t in max_lag..w.len() {
            let prediction = self.predict_differenced(&w, &residuals, t);
            residuals[t] = w[t] - prediction;
            fitted.push(Self::integrate(&poly, prediction, data, t + k));
        }

        debug!(
            model = self.name(),
            ar = ?self.ar,
            ma = ?self.ma,
            constant = self.constant,
            "estimated arima coefficients"
        );

        self.difference_poly = poly;
        self.history = data.to_vec();
        self.differenced = w;
        self.residuals = residuals;
        self.fitted = fitted;
        self.is_fitted = true;
        Ok(())
    }

    fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(VisitorError::NotFitted);
        }

        let k = self.difference_poly.len() - 1;
        let mut series = self.history.clone();
        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();
        let mut forecasts = Vec::with_capacity(steps);

        for _ in 0..steps {
            let t = w.len();
            let next_w = self.predict_differenced(&w, &e, t);
            w.push(next_w);
            e.push(0.0);

            let position = series.len();
            debug_assert_eq!(position, t + k);
            let value = Self::integrate(&self.difference_poly, next_w, &series, position);
            series.push(value);
            forecasts.push(value);
        }

        Ok(forecasts)
    }

    fn fitted_values(&self) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(VisitorError::NotFitted);
        }
        Ok(self.fitted.clone())
    }

    fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn name(&self) -> &str {
        if self.seasonal.is_some() {
            "seasonal_arima"
        } else {
            "arima"
        }
    }
}
