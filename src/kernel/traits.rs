//! Kernel trait definition

/// Kernel function trait
///
/// A kernel function K(x, y) must be symmetric and deterministic. The
/// optimizer evaluates it once per pair of training points when building
/// the kernel matrix, and once per support vector for each scored point.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &[f64], y: &[f64]) -> f64;

    /// Short kernel name for logs and model summaries
    fn name(&self) -> &'static str;
}

/// Dot product of two dense vectors of equal length
pub(crate) fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// Squared Euclidean distance between two dense vectors of equal length
pub(crate) fn squared_distance(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .map(|(a, b)| {
            let diff = a - b;
            diff * diff
        })
        .sum()
}

/// `base^degree` for any `u32` degree; exponents beyond `i32` fall back to `powf`
pub(crate) fn int_power(base: f64, degree: u32) -> f64 {
    match i32::try_from(degree) {
        Ok(exp) => base.powi(exp),
        Err(_) => base.powf(f64::from(degree)),
    }
}
