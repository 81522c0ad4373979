//! Linear bias correction of model output against observed history
//!
//! Fits `actual = intercept + slope * fitted` by ordinary least squares over
//! historical (fitted, actual) pairs and applies the line to new model output.

use serde::{Deserialize, Serialize};
use visitor_spi::{CalibrationParameters, Result, VisitorError};

use crate::linalg::mean;

/// OLS calibration line
///
/// # Example
///
/// ```rust
/// use visitor_core::calibration::LinearCalibration;
///
/// let mut calibration = LinearCalibration::new();
/// calibration.fit(&[1.0, 2.0, 3.0], &[12.0, 14.0, 16.0]).unwrap();
/// assert!((calibration.apply(4.0).unwrap() - 18.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearCalibration {
    parameters: Option<CalibrationParameters>,
}

impl LinearCalibration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the line mapping `fitted` onto `actual`
    ///
    /// Constant `fitted` input has no slope to estimate; the line degrades to
    /// the mean of `actual`.
    pub fn fit(&mut self, fitted: &[f64], actual: &[f64]) -> Result<CalibrationParameters> {
        if fitted.len() != actual.len() {
            return Err(VisitorError::InvalidData(format!(
                "calibration needs paired values: {} fitted vs {} actual",
                fitted.len(),
                actual.len()
            )));
        }
        if fitted.is_empty() {
            return Err(VisitorError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        if fitted.iter().chain(actual).any(|v| !v.is_finite()) {
            return Err(VisitorError::InvalidData(
                "calibration input contains non-finite values".to_string(),
            ));
        }

        let mean_x = mean(fitted);
        let mean_y = mean(actual);
        let sxx: f64 = fitted.iter().map(|x| (x - mean_x).powi(2)).sum();
        let sxy: f64 = fitted
            .iter()
            .zip(actual)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        let slope = if sxx.abs() < 1e-12 { 0.0 } else { sxy / sxx };
        let intercept = mean_y - slope * mean_x;

        let ss_tot: f64 = actual.iter().map(|y| (y - mean_y).powi(2)).sum();
        let ss_res: f64 = fitted
            .iter()
            .zip(actual)
            .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
            .sum();
        let r_squared = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else {
            0.0
        };

        let parameters = CalibrationParameters {
            intercept,
            slope,
            r_squared,
        };
        self.parameters = Some(parameters);
        Ok(parameters)
    }

    /// Calibrated value for a raw model output
    pub fn apply(&self, raw: f64) -> Result<f64> {
        self.parameters
            .map(|p| p.project(raw))
            .ok_or(VisitorError::NotFitted)
    }

    pub fn parameters(&self) -> Option<CalibrationParameters> {
        self.parameters
    }

    pub fn is_fitted(&self) -> bool {
        self.parameters.is_some()
    }
}
