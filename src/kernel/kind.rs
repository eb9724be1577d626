//! Runtime-selectable kernel

use crate::core::{Result, SVMError};
use crate::kernel::traits::{dot, int_power, squared_distance};
use crate::kernel::{Kernel, LinearKernel, PolynomialKernel, RBFKernel};
use serde::{Deserialize, Serialize};

/// Kernel chosen at runtime, e.g. from CLI flags or a saved model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KernelType {
    Linear,
    Rbf { gamma: f64 },
    Polynomial { degree: u32, gamma: f64, coef0: f64 },
}

impl KernelType {
    /// Build an RBF kernel, rejecting non-positive gamma instead of panicking
    pub fn rbf(gamma: f64) -> Result<Self> {
        check_gamma(gamma)?;
        Ok(KernelType::Rbf { gamma })
    }

    /// Build a polynomial kernel, rejecting invalid parameters instead of panicking
    pub fn polynomial(degree: u32, gamma: f64, coef0: f64) -> Result<Self> {
        if degree == 0 {
            return Err(SVMError::InvalidParameter(
                "Polynomial degree must be positive".to_string(),
            ));
        }
        check_gamma(gamma)?;
        Ok(KernelType::Polynomial {
            degree,
            gamma,
            coef0,
        })
    }
}

fn check_gamma(gamma: f64) -> Result<()> {
    if gamma.is_nan() || gamma <= 0.0 {
        return Err(SVMError::InvalidParameter(format!(
            "Gamma must be positive, got: {gamma}"
        )));
    }
    Ok(())
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::Linear
    }
}

impl From<LinearKernel> for KernelType {
    fn from(_: LinearKernel) -> Self {
        KernelType::Linear
    }
}

impl From<RBFKernel> for KernelType {
    fn from(kernel: RBFKernel) -> Self {
        KernelType::Rbf {
            gamma: kernel.gamma(),
        }
    }
}

impl From<PolynomialKernel> for KernelType {
    fn from(kernel: PolynomialKernel) -> Self {
        KernelType::Polynomial {
            degree: kernel.degree,
            gamma: kernel.gamma,
            coef0: kernel.coef0,
        }
    }
}

impl Kernel for KernelType {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        // parameters may come from a model file, so no constructor asserts here
        match *self {
            KernelType::Linear => dot(x, y),
            KernelType::Rbf { gamma } => (-gamma * squared_distance(x, y)).exp(),
            KernelType::Polynomial {
                degree,
                gamma,
                coef0,
            } => int_power(gamma * dot(x, y) + coef0, degree),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            KernelType::Linear => "linear",
            KernelType::Rbf { .. } => "rbf",
            KernelType::Polynomial { .. } => "polynomial",
        }
    }
}
