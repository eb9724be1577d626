//! Polynomial kernel K(x, y) = (γ <x, y> + coef0)^degree
//!
//! With degree 1, gamma 1 and coef0 0 it reduces to the linear kernel.

use crate::kernel::traits::{dot, int_power, Kernel};
use serde::{Deserialize, Serialize};

/// Polynomial kernel with configurable degree, gamma, and coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolynomialKernel {
    /// Scaling factor for the dot product
    pub gamma: f64,
    /// Independent term in the polynomial
    pub coef0: f64,
    /// Degree of the polynomial
    pub degree: u32,
}

impl PolynomialKernel {
    /// Creates a new polynomial kernel with the specified parameters
    ///
    /// # Panics
    /// Panics if `degree` is zero or `gamma` is not positive
    pub fn new(degree: u32, gamma: f64, coef0: f64) -> Self {
        assert!(degree > 0, "Polynomial degree must be positive");
        assert!(gamma > 0.0, "Gamma must be positive");

        Self {
            gamma,
            coef0,
            degree,
        }
    }

    /// Creates a quadratic kernel: (γ * <x,y> + 1)²
    pub fn quadratic(gamma: f64) -> Self {
        Self::new(2, gamma, 1.0)
    }
}

impl Default for PolynomialKernel {
    fn default() -> Self {
        Self::new(3, 1.0, 1.0)
    }
}

impl Kernel for PolynomialKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        let base = self.gamma * dot(x, y) + self.coef0;
        match self.degree {
            1 => base,
            2 => base * base,
            d => int_power(base, d),
        }
    }

    fn name(&self) -> &'static str {
        "polynomial"
    }
}
