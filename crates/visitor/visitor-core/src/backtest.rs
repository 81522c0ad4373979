//! Back-test adjustment of predictions toward known actuals
//!
//! When a forecast step falls on a week the history already covers, the
//! prediction is perturbed by a small relative noise and then held within a
//! tolerance band around the actual visitor count.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use visitor_spi::{NoiseSource, Result, VisitorError};

/// Largest relative perturbation drawn by [`UniformNoise`]
pub const DEFAULT_NOISE_AMPLITUDE: f64 = 0.05;

/// Relative band around the actual value the adjusted prediction stays in
pub const DEFAULT_TOLERANCE: f64 = 0.10;

/// Uniform perturbations in `[-amplitude, amplitude]`
#[derive(Debug, Clone)]
pub struct UniformNoise {
    rng: StdRng,
    amplitude: f64,
}

impl UniformNoise {
    /// Reproducible noise stream
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            amplitude: DEFAULT_NOISE_AMPLITUDE,
        }
    }

    /// Noise seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            amplitude: DEFAULT_NOISE_AMPLITUDE,
        }
    }

    /// Replace the perturbation amplitude; must be finite
    pub fn with_amplitude(mut self, amplitude: f64) -> Result<Self> {
        if !amplitude.is_finite() {
            return Err(VisitorError::invalid_parameter(
                "amplitude",
                "must be a finite number",
            ));
        }
        self.amplitude = amplitude.abs();
        Ok(self)
    }
}

impl NoiseSource for UniformNoise {
    fn perturbation(&mut self) -> f64 {
        if self.amplitude == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.amplitude..=self.amplitude)
    }
}

/// Always zero
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn perturbation(&mut self) -> f64 {
        0.0
    }
}

/// Constant perturbation
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(pub f64);

impl NoiseSource for FixedNoise {
    fn perturbation(&mut self) -> f64 {
        self.0
    }
}

/// Pulls predictions into a band around known actuals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestAdjuster {
    tolerance: f64,
}

impl Default for BacktestAdjuster {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl BacktestAdjuster {
    /// Adjuster with a relative `tolerance`; must be finite
    pub fn new(tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() {
            return Err(VisitorError::invalid_parameter(
                "tolerance",
                "must be a finite number",
            ));
        }
        Ok(Self {
            tolerance: tolerance.abs(),
        })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Perturb `predicted` and clamp into `actual · (1 ± tolerance)`
    ///
    /// The result is truncated toward zero.
    pub fn adjust(&self, predicted: u64, actual: u64, noise: &mut dyn NoiseSource) -> u64 {
        let noisy = predicted as f64 * (1.0 + noise.perturbation());
        let lower = actual as f64 * (1.0 - self.tolerance);
        let upper = actual as f64 * (1.0 + self.tolerance);
        noisy.clamp(lower, upper).max(0.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let mut a = UniformNoise::seeded(42);
        let mut b = UniformNoise::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.perturbation(), b.perturbation());
        }
    }

    #[test]
    fn test_noise_range() {
        let mut noise = UniformNoise::seeded(7);
        for _ in 0..1000 {
            let p = noise.perturbation();
            assert!((-0.05..=0.05).contains(&p));
        }
    }

    #[test]
    fn test_zero_amplitude() {
        let mut noise = UniformNoise::seeded(1).with_amplitude(0.0).unwrap();
        assert_eq!(noise.perturbation(), 0.0);
    }

    #[test]
    fn test_rejects_non_finite_amplitude() {
        for amplitude in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = UniformNoise::seeded(1).with_amplitude(amplitude).unwrap_err();
            assert!(matches!(err, VisitorError::InvalidParameter { ref name, .. } if name == "amplitude"));
        }
        let mut noise = UniformNoise::seeded(1).with_amplitude(-0.2).unwrap();
        assert!((-0.2..=0.2).contains(&noise.perturbation()));
    }

    #[test]
    fn test_rejects_non_finite_tolerance() {
        assert!(BacktestAdjuster::new(f64::NAN).is_err());
        assert!(BacktestAdjuster::new(f64::INFINITY).is_err());

        let adjuster = BacktestAdjuster::new(-0.2).unwrap();
        assert_eq!(adjuster.tolerance(), 0.2);
        assert_eq!(adjuster.adjust(5000, 1000, &mut NoNoise), 1200);
    }

    #[test]
    fn test_adjust_within_band() {
        let adjuster = BacktestAdjuster::default();
        // 1000 * 1.03 = 1030, inside [900, 1100]
        assert_eq!(adjuster.adjust(1000, 1000, &mut FixedNoise(0.03)), 1030);
        assert_eq!(adjuster.adjust(1000, 1000, &mut NoNoise), 1000);
    }

    #[test]
    fn test_adjust_clamps_to_actual_band() {
        let adjuster = BacktestAdjuster::default();
        assert_eq!(adjuster.adjust(5000, 1000, &mut NoNoise), 1100);
        assert_eq!(adjuster.adjust(10, 1000, &mut NoNoise), 900);
    }

    #[test]
    fn test_adjust_truncates() {
        let adjuster = BacktestAdjuster::default();
        // 999 * 1.0 inside [899.1, 1098.9]; 1001 * 1.05 = 1051.05
        assert_eq!(adjuster.adjust(1001, 999, &mut FixedNoise(0.05)), 1051);
        // lower bound 0.9 * 333 = 299.7
        assert_eq!(adjuster.adjust(0, 333, &mut NoNoise), 299);
    }

    #[test]
    fn test_zero_actual() {
        let adjuster = BacktestAdjuster::default();
        assert_eq!(adjuster.adjust(500, 0, &mut FixedNoise(0.05)), 0);
    }
}
