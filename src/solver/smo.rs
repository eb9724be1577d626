//! Simplified Sequential Minimal Optimization (SMO) solver
//!
//! Every sample that violates the KKT conditions is paired with a second
//! sample drawn uniformly at random from the rest of the training set, and
//! the two dual coefficients are optimized analytically. The loop stops after
//! `max_passes` consecutive passes in which no pair changed, or when the hard
//! pass cap is reached.

use crate::core::{OptimizationResult, Result, SVMError, SvmConfig};
use crate::kernel::KernelMatrix;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Why a candidate pair was or was not updated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Updated,
    /// L == H, the box leaves no room to move alpha_j
    Infeasible,
    /// eta >= 0, the objective has no strict maximum along the pair
    NonNegativeEta,
    /// The clipped step for alpha_j was smaller than the tolerance
    NegligibleChange,
}

/// SMO solver over a precomputed kernel matrix
pub struct SMOSolver {
    config: SvmConfig,
}

impl SMOSolver {
    /// Create a new SMO solver with the given configuration
    pub fn new(config: SvmConfig) -> Self {
        Self { config }
    }

    /// Optimize the dual problem for signed labels `y` (each -1 or +1).
    ///
    /// Partner indices are drawn from `rng`, so a seeded generator gives a
    /// reproducible trajectory.
    pub fn solve<R: Rng + ?Sized>(
        &self,
        matrix: &KernelMatrix,
        y: &[f64],
        rng: &mut R,
    ) -> Result<OptimizationResult> {
        self.config.validate()?;

        let n = y.len();
        if matrix.len() != n {
            return Err(SVMError::DimensionMismatch {
                expected: matrix.len(),
                actual: n,
            });
        }
        if n < 2 {
            return Err(SVMError::InvalidInput(format!(
                "SMO needs at least 2 samples, got {n}"
            )));
        }
        if let Some(&bad) = y.iter().find(|&&label| label != 1.0 && label != -1.0) {
            return Err(SVMError::InvalidInput(format!(
                "signed labels must be -1 or +1, got {bad}"
            )));
        }

        let c = self.config.c;
        let tol = self.config.tolerance;

        let mut alpha = vec![0.0; n];
        let mut b = 0.0;
        let mut quiet_passes = 0;
        let mut passes = 0;
        let mut updates = 0;
        let mut skipped_eta = 0;
        let mut hit_pass_cap = false;

        while quiet_passes < self.config.max_passes {
            if let Some(cap) = self.config.max_total_passes {
                if passes >= cap {
                    warn!("SMO stopped on the hard cap of {cap} passes before converging");
                    hit_pass_cap = true;
                    break;
                }
            }
            passes += 1;

            let mut changed = 0;
            for i in 0..n {
                let e_i = margin_error(matrix, y, &alpha, b, i);
                let r_i = y[i] * e_i;

                // KKT violation conditions:
                // - r_i < -tol and alpha_i < C (alpha_i can increase)
                // - r_i > tol and alpha_i > 0 (alpha_i can decrease)
                if !((r_i < -tol && alpha[i] < c) || (r_i > tol && alpha[i] > 0.0)) {
                    continue;
                }

                let j = pick_partner(i, n, rng);
                match self.take_step(i, j, e_i, matrix, y, &mut alpha, &mut b) {
                    StepOutcome::Updated => changed += 1,
                    StepOutcome::NonNegativeEta => {
                        skipped_eta += 1;
                        trace!("skipping pair ({i}, {j}): eta >= 0");
                    }
                    outcome => trace!("skipping pair ({i}, {j}): {outcome:?}"),
                }
            }

            updates += changed;
            debug!("SMO pass {passes}: {changed} pairs changed, intercept {b:.6}");

            if changed == 0 {
                quiet_passes += 1;
            } else {
                quiet_passes = 0;
            }
        }

        Ok(OptimizationResult {
            alpha,
            b,
            passes,
            updates,
            skipped_eta,
            hit_pass_cap,
        })
    }

    /// Jointly optimize alpha_i and alpha_j
    #[allow(clippy::too_many_arguments)]
    fn take_step(
        &self,
        i: usize,
        j: usize,
        e_i: f64,
        matrix: &KernelMatrix,
        y: &[f64],
        alpha: &mut [f64],
        b: &mut f64,
    ) -> StepOutcome {
        let c = self.config.c;
        let e_j = margin_error(matrix, y, alpha, *b, j);

        let alpha_i_old = alpha[i];
        let alpha_j_old = alpha[j];

        // Box constraints for alpha_j along the line sum(alpha * y) = const
        let (low, high) = if y[i] == y[j] {
            let sum = alpha_j_old + alpha_i_old;
            ((sum - c).max(0.0), c.min(sum))
        } else {
            let diff = alpha_j_old - alpha_i_old;
            (diff.max(0.0), c.min(c + diff))
        };
        if low == high {
            return StepOutcome::Infeasible;
        }

        let k_ij = matrix.get(i, j);
        let k_ii = matrix.get(i, i);
        let k_jj = matrix.get(j, j);

        let eta = 2.0 * k_ij - k_ii - k_jj;
        if eta >= 0.0 {
            return StepOutcome::NonNegativeEta;
        }

        let alpha_j_new = (alpha_j_old - y[j] * (e_i - e_j) / eta).clamp(low, high);
        if (alpha_j_new - alpha_j_old).abs() < self.config.tolerance {
            return StepOutcome::NegligibleChange;
        }

        let alpha_i_new = (alpha_i_old + y[i] * y[j] * (alpha_j_old - alpha_j_new)).clamp(0.0, c);
        alpha[j] = alpha_j_new;
        alpha[i] = alpha_i_new;

        let delta_i = y[i] * (alpha_i_new - alpha_i_old);
        let delta_j = y[j] * (alpha_j_new - alpha_j_old);
        let b1 = *b - e_i - delta_i * k_ii - delta_j * k_ij;
        let b2 = *b - e_j - delta_i * k_ij - delta_j * k_jj;

        *b = if alpha_i_new > 0.0 && alpha_i_new < c {
            b1
        } else if alpha_j_new > 0.0 && alpha_j_new < c {
            b2
        } else {
            (b1 + b2) / 2.0
        };

        StepOutcome::Updated
    }
}

/// E_i = b + Σ_k alpha_k y_k K(x_k, x_i) - y_i
pub fn margin_error(matrix: &KernelMatrix, y: &[f64], alpha: &[f64], b: f64, i: usize) -> f64 {
    let output: f64 = matrix
        .row(i)
        .iter()
        .zip(alpha.iter().zip(y))
        .map(|(&k, (&a, &label))| a * label * k)
        .sum();
    output + b - y[i]
}

/// Draw an index in `0..n` other than `i`, uniformly
///
/// # Panics
/// Panics if `n < 2`
pub fn pick_partner<R: Rng + ?Sized>(i: usize, n: usize, rng: &mut R) -> usize {
    let j = rng.gen_range(0..n - 1);
    if j >= i {
        j + 1
    } else {
        j
    }
}

/// Pair-selection generator for a configured seed, or from entropy if unset
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Dual objective Σ alpha_i - ½ Σ_i Σ_j alpha_i alpha_j y_i y_j K_ij
pub fn dual_objective(matrix: &KernelMatrix, y: &[f64], alpha: &[f64]) -> f64 {
    let linear: f64 = alpha.iter().sum();
    let mut quadratic = 0.0;
    for i in 0..alpha.len() {
        if alpha[i] == 0.0 {
            continue;
        }
        for j in 0..alpha.len() {
            quadratic += alpha[i] * alpha[j] * y[i] * y[j] * matrix.get(i, j);
        }
    }
    linear - 0.5 * quadratic
}
