//! High-level API for kernel SVM operations
//!
//! This module provides a user-friendly interface for common tasks,
//! including training, classification, and model evaluation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ksvm::api::SVM;
//! use ksvm::kernel::RBFKernel;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Train a model on data
//! let svm = SVM::with_kernel(RBFKernel::new(0.1))
//!     .with_c(1.0)
//!     .with_seed(42)
//!     .train_from_csv("train.csv")?;
//!
//! // Classify and evaluate
//! let labels = svm.classify_from_csv("test.csv")?;
//! println!("Accuracy: {:.2}%", svm.evaluate_from_csv("test.csv")? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::classifier::{MultiClassSVM, TrainingSummary};
use crate::core::{Classifier, Dataset, Result, SVMError, Sample, SvmConfig, ThresholdPolicy};
use crate::data::CSVDataset;
use crate::kernel::{Kernel, LinearKernel};
use crate::solver::SupportSelection;
use std::path::Path;

/// High-level SVM interface with builder pattern
pub struct SVM<K: Kernel + Clone = LinearKernel> {
    kernel: K,
    config: SvmConfig,
    num_classes: Option<usize>,
}

impl SVM<LinearKernel> {
    /// Create a new SVM with linear kernel and default parameters
    pub fn new() -> Self {
        Self::with_kernel(LinearKernel::new())
    }
}

impl Default for SVM<LinearKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel + Clone> SVM<K> {
    /// Create SVM with custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            config: SvmConfig::default(),
            num_classes: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: SvmConfig) -> Self {
        self.config = config;
        self
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set KKT tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set the number of consecutive unchanged passes before stopping
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.config.max_passes = max_passes;
        self
    }

    /// Set the hard cap on total passes (`None` removes it)
    pub fn with_max_total_passes(mut self, cap: Option<usize>) -> Self {
        self.config.max_total_passes = cap;
        self
    }

    /// Seed the pair-selection generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.config.fit_intercept = fit_intercept;
        self
    }

    pub fn with_threshold_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.config.threshold = policy;
        self
    }

    pub fn with_support_selection(mut self, selection: SupportSelection) -> Self {
        self.config.support_selection = selection;
        self
    }

    /// Fix the number of classes instead of inferring it from the labels
    pub fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = Some(num_classes);
        self
    }

    pub fn config(&self) -> &SvmConfig {
        &self.config
    }

    /// Train on a dataset
    pub fn train<D: Dataset>(self, dataset: &D) -> Result<TrainedModel<K>> {
        self.train_points(&dataset.features(), &dataset.get_labels())
    }

    /// Train on samples
    pub fn train_samples(self, samples: &[Sample]) -> Result<TrainedModel<K>> {
        let data: Vec<Vec<f64>> = samples.iter().map(|s| s.features.clone()).collect();
        let labels: Vec<usize> = samples.iter().map(|s| s.label).collect();
        self.train_points(&data, &labels)
    }

    /// Train from CSV file (automatically detects headers)
    pub fn train_from_csv<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<K>> {
        let dataset = CSVDataset::from_file(path)?;
        self.train(&dataset)
    }

    /// Train on dense rows and class labels
    pub fn train_points(self, data: &[Vec<f64>], labels: &[usize]) -> Result<TrainedModel<K>> {
        let num_classes = match self.num_classes {
            Some(n) => n,
            None => labels.iter().max().map_or(0, |&max| max + 1).max(2),
        };
        let mut model = MultiClassSVM::new(self.kernel, self.config, num_classes);
        let summaries = model.train(data, labels)?;
        Ok(TrainedModel { model, summaries })
    }
}

/// Trained SVM model with high-level classification interface
pub struct TrainedModel<K: Kernel + Clone> {
    model: MultiClassSVM<K>,
    summaries: Vec<TrainingSummary>,
}

impl<K: Kernel + Clone> TrainedModel<K> {
    /// Wrap an already trained model, e.g. one loaded from disk
    pub fn from_model(model: MultiClassSVM<K>) -> Result<Self> {
        if !model.is_trained() {
            return Err(SVMError::ModelNotTrained);
        }
        Ok(Self {
            model,
            summaries: Vec::new(),
        })
    }

    /// Classify a batch of points
    pub fn classify(&self, points: &[Vec<f64>]) -> Result<Vec<usize>> {
        self.model.classify(points)
    }

    /// Classify a single point as a batch of one
    pub fn classify_point(&self, point: &[f64]) -> Result<usize> {
        self.model.classify_point(point)
    }

    /// Classify every sample of a dataset, in order
    pub fn classify_dataset<D: Dataset>(&self, dataset: &D) -> Result<Vec<usize>> {
        self.classify(&dataset.features())
    }

    /// Classify the rows of a CSV file (the label column is ignored)
    pub fn classify_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<usize>> {
        let dataset = CSVDataset::from_file(path)?;
        self.classify_dataset(&dataset)
    }

    /// Evaluate accuracy on a dataset
    pub fn evaluate<D: Dataset>(&self, dataset: &D) -> Result<f64> {
        self.model
            .compute_accuracy(&dataset.features(), &dataset.get_labels())
    }

    /// Evaluate accuracy from CSV file
    pub fn evaluate_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = CSVDataset::from_file(path)?;
        self.evaluate(&dataset)
    }

    /// Confusion matrix and per-class metrics on a dataset
    pub fn evaluate_detailed<D: Dataset>(&self, dataset: &D) -> Result<EvaluationMetrics> {
        let labels = dataset.get_labels();
        let predictions = self.classify_dataset(dataset)?;
        EvaluationMetrics::from_predictions(&predictions, &labels, self.model.num_classes())
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            num_classes: self.model.num_classes(),
            n_classifiers: self.model.num_classifiers(),
            n_support_vectors: self.model.n_support_vectors(),
            kernel: self.model.kernel().name(),
            passes: self.summaries.iter().map(|s| s.passes).sum(),
            hit_pass_cap: self.summaries.iter().any(|s| s.hit_pass_cap),
        }
    }

    /// Per-pair training statistics, empty for a loaded model
    pub fn summaries(&self) -> &[TrainingSummary] {
        &self.summaries
    }

    /// Get the underlying multi-class model
    pub fn inner(&self) -> &MultiClassSVM<K> {
        &self.model
    }
}

/// Multi-class evaluation metrics built on a confusion matrix
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    /// `confusion[actual][predicted]`
    pub confusion: Vec<Vec<usize>>,
}

impl EvaluationMetrics {
    /// Tally predictions against actual labels
    pub fn from_predictions(
        predictions: &[usize],
        actual: &[usize],
        num_classes: usize,
    ) -> Result<Self> {
        if predictions.len() != actual.len() {
            return Err(SVMError::DimensionMismatch {
                expected: actual.len(),
                actual: predictions.len(),
            });
        }
        let size = predictions
            .iter()
            .chain(actual)
            .map(|&c| c + 1)
            .max()
            .unwrap_or(0)
            .max(num_classes);

        let mut confusion = vec![vec![0; size]; size];
        for (&pred, &truth) in predictions.iter().zip(actual) {
            confusion[truth][pred] += 1;
        }
        Ok(Self { confusion })
    }

    pub fn num_classes(&self) -> usize {
        self.confusion.len()
    }

    /// Total number of evaluated samples
    pub fn total(&self) -> usize {
        self.confusion.iter().flatten().sum()
    }

    /// Fraction of samples on the diagonal
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.num_classes()).map(|c| self.confusion[c][c]).sum();
        correct as f64 / total as f64
    }

    /// Precision of `class`: TP / (TP + FP); 0 for classes outside the matrix
    pub fn precision(&self, class: usize) -> f64 {
        if class >= self.num_classes() {
            return 0.0;
        }
        let predicted: usize = self.confusion.iter().map(|row| row[class]).sum();
        if predicted == 0 {
            0.0
        } else {
            self.confusion[class][class] as f64 / predicted as f64
        }
    }

    /// Recall of `class`: TP / (TP + FN); 0 for classes outside the matrix
    pub fn recall(&self, class: usize) -> f64 {
        if class >= self.num_classes() {
            return 0.0;
        }
        let actual: usize = self.confusion[class].iter().sum();
        if actual == 0 {
            0.0
        } else {
            self.confusion[class][class] as f64 / actual as f64
        }
    }

    /// F1 score of `class`: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Unweighted mean of the per-class F1 scores
    pub fn macro_f1(&self) -> f64 {
        let n = self.num_classes();
        if n == 0 {
            return 0.0;
        }
        (0..n).map(|c| self.f1_score(c)).sum::<f64>() / n as f64
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub num_classes: usize,
    pub n_classifiers: usize,
    pub n_support_vectors: usize,
    pub kernel: &'static str,
    /// SMO passes summed over all pair classifiers
    pub passes: usize,
    pub hit_pass_cap: bool,
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a linear SVM on CSV data with default parameters
    pub fn train_csv<P: AsRef<Path>>(path: P) -> Result<TrainedModel<LinearKernel>> {
        SVM::new().train_from_csv(path)
    }

    /// Train with custom C parameter
    pub fn train_csv_with_c<P: AsRef<Path>>(
        path: P,
        c: f64,
    ) -> Result<TrainedModel<LinearKernel>> {
        SVM::new().with_c(c).train_from_csv(path)
    }

    /// Quick evaluation: train on training file, test on test file
    pub fn evaluate_split<P1: AsRef<Path>, P2: AsRef<Path>>(
        train_path: P1,
        test_path: P2,
    ) -> Result<f64> {
        let model = train_csv(train_path)?;
        model.evaluate_from_csv(test_path)
    }

    /// Hold-out validation on a sequential split
    pub fn simple_validation<D: Dataset>(dataset: &D, train_ratio: f64, c: f64) -> Result<f64> {
        if train_ratio <= 0.0 || train_ratio >= 1.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got: {train_ratio}"
            )));
        }

        let n = dataset.len();
        let train_size = (n as f64 * train_ratio) as usize;

        // Simple sequential split (not randomized for reproducibility)
        let train_samples: Vec<Sample> = (0..train_size).map(|i| dataset.get_sample(i)).collect();
        let test_samples: Vec<Sample> = (train_size..n).map(|i| dataset.get_sample(i)).collect();
        if test_samples.is_empty() {
            return Err(SVMError::InvalidInput(
                "hold-out split left no test samples".to_string(),
            ));
        }

        let model = SVM::new()
            .with_c(c)
            .with_num_classes(dataset.get_labels().iter().max().map_or(2, |&m| (m + 1).max(2)))
            .train_samples(&train_samples)?;

        let points: Vec<Vec<f64>> = test_samples.iter().map(|s| s.features.clone()).collect();
        let labels: Vec<usize> = test_samples.iter().map(|s| s.label).collect();
        model.inner().compute_accuracy(&points, &labels)
    }
}
