//! Trend model trait shared by every forecasting strategy

use crate::error::Result;

/// Fit/forecast capability of one forecasting strategy
///
/// A model is bound to exactly one training snapshot: calling [`fit`](Self::fit)
/// again discards all previously estimated state.
///
/// # Example
///
/// ```rust,ignore
/// use visitor_spi::TrendModel;
///
/// fn horizon<M: TrendModel>(model: &mut M, data: &[f64], steps: usize) -> visitor_spi::Result<Vec<f64>> {
///     model.fit(data)?;
///     model.forecast(steps)
/// }
/// ```
pub trait TrendModel: Send + Sync {
    /// Fit the model to historical values, replacing any previous fit
    fn fit(&mut self, data: &[f64]) -> Result<()>;

    /// Point forecasts for the next `steps` periods
    ///
    /// Returns exactly `steps` values. Values may be negative; callers clamp.
    fn forecast(&self, steps: usize) -> Result<Vec<f64>>;

    /// One-step-ahead in-sample predictions
    ///
    /// The returned values are aligned to the *tail* of the training data:
    /// element `i` predicts training point `n - len + i`.
    fn fitted_values(&self) -> Result<Vec<f64>>;

    /// Check if the model has been fitted
    fn is_fitted(&self) -> bool;

    /// Short identifier used in logs and outcomes
    fn name(&self) -> &str;
}
