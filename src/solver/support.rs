//! Support-vector retention strategies
//!
//! After the SMO loop finishes, only part of the training set is kept for
//! scoring. Which part is a policy decision independent of the optimizer.

use serde::{Deserialize, Serialize};

/// Rule deciding which trained samples become support vectors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SupportSelection {
    /// Keep samples whose alpha is strictly above the mean alpha.
    ///
    /// This is a heuristic, not a support-vector criterion: it also drops
    /// margin vectors with small positive alpha. When it keeps nothing while
    /// some alpha is positive (every non-zero alpha equal), it falls back to
    /// keeping every positive alpha.
    MeanAlpha,
    /// Keep samples whose alpha is strictly above `epsilon`
    AboveEpsilon(f64),
}

impl Default for SupportSelection {
    fn default() -> Self {
        SupportSelection::MeanAlpha
    }
}

impl SupportSelection {
    /// Indices of the retained samples, in training order
    pub fn select(&self, alpha: &[f64]) -> Vec<usize> {
        match *self {
            SupportSelection::MeanAlpha => {
                if alpha.is_empty() {
                    return Vec::new();
                }
                let mean = alpha.iter().sum::<f64>() / alpha.len() as f64;
                let above_mean = indices_above(alpha, mean);
                if above_mean.is_empty() {
                    indices_above(alpha, 0.0)
                } else {
                    above_mean
                }
            }
            SupportSelection::AboveEpsilon(epsilon) => indices_above(alpha, epsilon),
        }
    }
}

fn indices_above(alpha: &[f64], threshold: f64) -> Vec<usize> {
    alpha
        .iter()
        .enumerate()
        .filter_map(|(i, &a)| if a > threshold { Some(i) } else { None })
        .collect()
}
