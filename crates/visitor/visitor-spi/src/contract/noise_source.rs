//! Injectable randomness for the back-test adjustment

/// Source of multiplicative perturbations
///
/// Implementations return a relative perturbation, e.g. `0.03` for +3%.
/// Tests inject a fixed or seeded source so outputs stay reproducible.
pub trait NoiseSource: Send {
    /// Next relative perturbation
    fn perturbation(&mut self) -> f64;
}
