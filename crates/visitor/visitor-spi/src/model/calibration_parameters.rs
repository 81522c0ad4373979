//! Calibration parameters model

use serde::{Deserialize, Serialize};

/// Least-squares line mapping model output onto observed values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParameters {
    pub intercept: f64,
    pub slope: f64,
    /// Coefficient of determination of the fit
    pub r_squared: f64,
}

impl CalibrationParameters {
    /// Project a raw model output onto the calibrated scale
    pub fn project(&self, raw: f64) -> f64 {
        self.intercept + self.slope * raw
    }
}
