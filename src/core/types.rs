//! Core type definitions for the kernel SVM

use crate::core::{Result, SVMError};
use crate::solver::SupportSelection;
use serde::{Deserialize, Serialize};

/// Training sample with dense features and an integer class label
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Dense feature vector
    pub features: Vec<f64>,
    /// Class identifier in `0..num_classes`
    pub label: usize,
}

impl Sample {
    /// Create a new sample
    pub fn new(features: Vec<f64>, label: usize) -> Self {
        Self { features, label }
    }

    /// Dimensionality of the feature vector
    pub fn dim(&self) -> usize {
        self.features.len()
    }
}

/// How raw decision values are turned into binary decisions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThresholdPolicy {
    /// Compare every score against a constant fixed at training time
    Fixed(f64),
    /// Compare every score against the mean score of the query batch.
    ///
    /// A one-element batch always sits exactly on its own mean and
    /// therefore always lands on the `>=` side.
    BatchMean,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy::Fixed(0.0)
    }
}

impl ThresholdPolicy {
    /// Threshold to apply to the given batch of scores
    pub fn threshold(&self, scores: &[f64]) -> f64 {
        match *self {
            ThresholdPolicy::Fixed(value) => value,
            ThresholdPolicy::BatchMean => {
                if scores.is_empty() {
                    0.0
                } else {
                    scores.iter().sum::<f64>() / scores.len() as f64
                }
            }
        }
    }
}

/// Result of one SMO optimization run
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Dual coefficients, one per training sample, each in `[0, C]`
    pub alpha: Vec<f64>,
    /// Intercept after the last accepted update
    pub b: f64,
    /// Total number of passes over the training set
    pub passes: usize,
    /// Number of accepted pair updates across all passes
    pub updates: usize,
    /// Number of candidate pairs rejected because `eta >= 0`
    pub skipped_eta: usize,
    /// True if the loop stopped on the hard pass cap rather than on `max_passes`
    pub hit_pass_cap: bool,
}

/// Hyperparameters shared by the binary and multi-class classifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Add the intercept to raw scores
    pub fit_intercept: bool,
    /// KKT tolerance, also the smallest accepted alpha step
    pub tolerance: f64,
    /// Consecutive passes without any accepted update before stopping
    pub max_passes: usize,
    /// Hard cap on the total number of passes (`None` for unbounded)
    pub max_total_passes: Option<usize>,
    /// Seed for the pair-selection generator (`None` draws from entropy)
    pub seed: Option<u64>,
    /// Which trained samples are kept as support vectors
    pub support_selection: SupportSelection,
    /// Decision threshold applied by `classify`
    pub threshold: ThresholdPolicy,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            fit_intercept: true,
            tolerance: 0.001,
            max_passes: 10,
            max_total_passes: Some(10_000),
            seed: None,
            support_selection: SupportSelection::MeanAlpha,
            threshold: ThresholdPolicy::Fixed(0.0),
        }
    }
}

impl SvmConfig {
    /// Reject hyperparameters the optimizer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.c.is_nan() || self.c <= 0.0 || self.c.is_infinite() {
            return Err(SVMError::InvalidParameter(format!(
                "C must be positive and finite, got: {}",
                self.c
            )));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Tolerance must be positive, got: {}",
                self.tolerance
            )));
        }
        if self.max_passes == 0 {
            return Err(SVMError::InvalidParameter(
                "max_passes must be at least 1".to_string(),
            ));
        }
        if self.max_total_passes == Some(0) {
            return Err(SVMError::InvalidParameter(
                "max_total_passes must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}
