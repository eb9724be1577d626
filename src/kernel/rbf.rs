//! Gaussian RBF kernel

use crate::kernel::traits::squared_distance;
use crate::kernel::Kernel;
use serde::{Deserialize, Serialize};

/// K(x, y) = exp(-γ ||x - y||²); larger gamma gives a narrower bump
/// around each support vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// Create RBF kernel with gamma = 1.0 / n_features
    pub fn with_auto_gamma(n_features: usize) -> Self {
        assert!(n_features > 0, "Number of features must be positive");
        Self::new(1.0 / n_features as f64)
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RBFKernel {
    /// Default RBF kernel with gamma = 1.0
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (-self.gamma * squared_distance(x, y)).exp()
    }

    fn name(&self) -> &'static str {
        "rbf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rbf_kernel_creation() {
        assert_eq!(RBFKernel::new(0.5).gamma(), 0.5);
        assert_eq!(RBFKernel::with_auto_gamma(10).gamma(), 0.1);
        assert_eq!(RBFKernel::default().gamma(), 1.0);
    }

    #[test]
    #[should_panic(expected = "Gamma must be positive")]
    fn test_rbf_kernel_invalid_gamma() {
        RBFKernel::new(-0.5);
    }

    #[test]
    fn test_rbf_kernel_identical_points() {
        let kernel = RBFKernel::new(0.7);
        let x = [1.0, -2.0, 3.5];
        assert_relative_eq!(kernel.compute(&x, &x), 1.0);
    }

    #[test]
    fn test_rbf_kernel_value() {
        let kernel = RBFKernel::new(0.5);
        // ||x - y||² = 1 + 4 = 5, exp(-2.5)
        let value = kernel.compute(&[0.0, 0.0], &[1.0, 2.0]);
        assert_relative_eq!(value, (-2.5f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_rbf_kernel_decreases_with_distance() {
        let kernel = RBFKernel::new(1.0);
        let origin = [0.0, 0.0];
        let near = kernel.compute(&origin, &[0.5, 0.0]);
        let far = kernel.compute(&origin, &[2.0, 0.0]);
        assert!(near > far);
        assert!(far > 0.0);
    }
}
