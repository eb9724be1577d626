//! Binary kernel classifier
//!
//! Wraps one SMO run: labels are remapped to ±1, the kernel matrix is built,
//! the dual is optimized, and the retained support set is kept for scoring.

use crate::core::{Classifier, Result, SVMError, SvmConfig};
use crate::kernel::{Kernel, KernelMatrix};
use crate::solver::{dual_objective, seeded_rng, SMOSolver};
use crate::utils::validation::{check_points, check_training_set, distinct_labels};
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Retained training points with their signed labels and dual coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportSet {
    vectors: Vec<Vec<f64>>,
    labels: Vec<f64>,
    alpha: Vec<f64>,
}

impl SupportSet {
    /// Build a support set, checking that the three columns line up
    pub fn new(vectors: Vec<Vec<f64>>, labels: Vec<f64>, alpha: Vec<f64>) -> Result<Self> {
        if vectors.len() != labels.len() || vectors.len() != alpha.len() {
            return Err(SVMError::InvalidInput(format!(
                "support set columns differ in length: {} vectors, {} labels, {} alphas",
                vectors.len(),
                labels.len(),
                alpha.len()
            )));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l != 1.0 && l != -1.0) {
            return Err(SVMError::InvalidInput(format!(
                "support labels must be -1 or +1, got {bad}"
            )));
        }
        if let Some(&bad) = alpha.iter().find(|&&a| !a.is_finite() || a < 0.0) {
            return Err(SVMError::InvalidInput(format!(
                "support alphas must be finite and non-negative, got {bad}"
            )));
        }
        Ok(Self {
            vectors,
            labels,
            alpha,
        })
    }

    /// Number of support vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    /// Signed labels (-1 or +1)
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    /// Σ alpha_k y_k K(point, x_k)
    fn weighted_sum<K: Kernel + ?Sized>(&self, kernel: &K, point: &[f64]) -> f64 {
        self.vectors
            .iter()
            .zip(self.labels.iter().zip(&self.alpha))
            .map(|(sv, (&label, &alpha))| alpha * label * kernel.compute(point, sv))
            .sum()
    }
}

/// Statistics of a finished training call
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// Total SMO passes over the training set
    pub passes: usize,
    /// Accepted pair updates
    pub updates: usize,
    /// Support vectors retained after selection
    pub n_support_vectors: usize,
    /// Dual objective at the final alphas
    pub objective: f64,
    /// The hard pass cap stopped the loop
    pub hit_pass_cap: bool,
}

/// Trained state: replaced wholesale by every successful `train`
#[derive(Debug, Clone, PartialEq)]
struct TrainedState {
    classes: [usize; 2],
    intercept: f64,
    dim: usize,
    support: SupportSet,
}

/// Two-class kernel SVM trained with simplified SMO
///
/// Labels must take exactly two distinct values; the lower one maps to -1
/// and the higher one to +1. `classify` returns 0 for the lower class side
/// and 1 for the higher one.
#[derive(Debug, Clone)]
pub struct BinaryClassifier<K: Kernel> {
    kernel: K,
    config: SvmConfig,
    state: Option<TrainedState>,
}

impl<K: Kernel> BinaryClassifier<K> {
    /// Create an untrained classifier; call `train` before scoring
    pub fn new(kernel: K, config: SvmConfig) -> Self {
        Self {
            kernel,
            config,
            state: None,
        }
    }

    /// Create a classifier and train it immediately
    pub fn with_training(
        kernel: K,
        config: SvmConfig,
        data: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<Self> {
        let mut classifier = Self::new(kernel, config);
        classifier.train(data, labels)?;
        Ok(classifier)
    }

    /// Rebuild a trained classifier from persisted parts
    pub fn from_parts(
        kernel: K,
        config: SvmConfig,
        classes: [usize; 2],
        intercept: f64,
        support: SupportSet,
    ) -> Result<Self> {
        if classes[0] >= classes[1] {
            return Err(SVMError::InvalidInput(format!(
                "classes must be strictly increasing, got {classes:?}"
            )));
        }
        if support.is_empty() {
            return Err(SVMError::InvalidInput(
                "a trained classifier needs at least one support vector".to_string(),
            ));
        }
        let dim = support.vectors()[0].len();
        check_points(support.vectors(), dim)?;

        Ok(Self {
            kernel,
            config,
            state: Some(TrainedState {
                classes,
                intercept,
                dim,
                support,
            }),
        })
    }

    /// Train on `data` with the generator seeded from the configuration
    pub fn train(&mut self, data: &[Vec<f64>], labels: &[usize]) -> Result<TrainingSummary> {
        let mut rng = seeded_rng(self.config.seed);
        self.train_with_rng(data, labels, &mut rng)
    }

    /// Train on `data`, drawing SMO partner indices from `rng`.
    ///
    /// On error the classifier keeps whatever model it had before.
    pub fn train_with_rng<R: Rng + ?Sized>(
        &mut self,
        data: &[Vec<f64>],
        labels: &[usize],
        rng: &mut R,
    ) -> Result<TrainingSummary> {
        self.config.validate()?;
        let dim = check_training_set(data, labels)?;

        let classes = distinct_labels(labels);
        if classes.len() != 2 {
            return Err(SVMError::InvalidInput(format!(
                "binary training needs exactly 2 distinct labels, got {}",
                classes.len()
            )));
        }
        let classes = [classes[0], classes[1]];
        let y: Vec<f64> = labels
            .iter()
            .map(|&label| if label == classes[0] { -1.0 } else { 1.0 })
            .collect();

        info!(
            "Training {} kernel classifier on {} samples ({} features), classes {:?}",
            self.kernel.name(),
            data.len(),
            dim,
            classes
        );

        let matrix = KernelMatrix::compute(&self.kernel, data);
        let result = SMOSolver::new(self.config.clone()).solve(&matrix, &y, rng)?;
        let objective = dual_objective(&matrix, &y, &result.alpha);

        let retained = self.config.support_selection.select(&result.alpha);
        if retained.is_empty() {
            warn!(
                "No support vectors after {} passes: {} candidate pairs had eta >= 0",
                result.passes, result.skipped_eta
            );
            return Err(SVMError::DegenerateKernel(format!(
                "training finished with zero support vectors after {} passes \
                 ({} candidate pairs skipped with eta >= 0)",
                result.passes, result.skipped_eta
            )));
        }

        let support = SupportSet::new(
            retained.iter().map(|&i| data[i].clone()).collect(),
            retained.iter().map(|&i| y[i]).collect(),
            retained.iter().map(|&i| result.alpha[i]).collect(),
        )?;

        info!(
            "Training finished after {} passes: {} updates, {} support vectors, intercept {:.6}",
            result.passes,
            result.updates,
            support.len(),
            result.b
        );

        let summary = TrainingSummary {
            passes: result.passes,
            updates: result.updates,
            n_support_vectors: support.len(),
            objective,
            hit_pass_cap: result.hit_pass_cap,
        };

        self.state = Some(TrainedState {
            classes,
            intercept: result.b,
            dim,
            support,
        });

        Ok(summary)
    }

    fn trained(&self) -> Result<&TrainedState> {
        self.state.as_ref().ok_or(SVMError::ModelNotTrained)
    }

    /// Raw decision values Σ alpha_k y_k K(q, x_k) (+ intercept) for each point
    pub fn scores(&self, points: &[Vec<f64>]) -> Result<Vec<f64>> {
        let state = self.trained()?;
        check_points(points, state.dim)?;

        let offset = if self.config.fit_intercept {
            state.intercept
        } else {
            0.0
        };
        Ok(points
            .iter()
            .map(|point| state.support.weighted_sum(&self.kernel, point) + offset)
            .collect())
    }

    /// Raw decision value of a single point
    pub fn score_point(&self, point: &[f64]) -> Result<f64> {
        let state = self.trained()?;
        if point.len() != state.dim {
            return Err(SVMError::DimensionMismatch {
                expected: state.dim,
                actual: point.len(),
            });
        }
        let offset = if self.config.fit_intercept {
            state.intercept
        } else {
            0.0
        };
        Ok(state.support.weighted_sum(&self.kernel, point) + offset)
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// Original class ids behind the -1 and +1 sides
    pub fn classes(&self) -> Option<[usize; 2]> {
        self.state.as_ref().map(|s| s.classes)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.intercept)
    }

    pub fn support_set(&self) -> Option<&SupportSet> {
        self.state.as_ref().map(|s| &s.support)
    }

    /// Feature dimensionality the classifier was trained on
    pub fn dim(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.dim)
    }

    pub fn n_support_vectors(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.support.len())
    }

    pub fn config(&self) -> &SvmConfig {
        &self.config
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

impl<K: Kernel> Classifier for BinaryClassifier<K> {
    /// 1 where the score reaches the threshold, 0 elsewhere
    fn classify(&self, points: &[Vec<f64>]) -> Result<Vec<usize>> {
        let scores = self.scores(points)?;
        let threshold = self.config.threshold.threshold(&scores);
        Ok(scores
            .iter()
            .map(|&score| usize::from(score >= threshold))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ThresholdPolicy;
    use crate::kernel::{LinearKernel, RBFKernel};
    use approx::assert_relative_eq;

    const OFFSETS: [(f64, f64); 10] = [
        (0.0, 0.0),
        (0.5, 0.3),
        (-0.4, 0.6),
        (0.3, -0.5),
        (-0.6, -0.2),
        (0.7, 0.1),
        (-0.1, -0.7),
        (0.2, 0.8),
        (-0.8, 0.4),
        (0.6, -0.6),
    ];

    /// Points near (0, 0) labelled `low`, points near (10, 10) labelled `high`
    fn separable(low: usize, high: usize) -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut data = Vec::new();
        let mut labels = Vec::new();
        for &(dx, dy) in &OFFSETS {
            data.push(vec![dx, dy]);
            labels.push(low);
        }
        for &(dx, dy) in &OFFSETS {
            data.push(vec![10.0 + dx, 10.0 + dy]);
            labels.push(high);
        }
        (data, labels)
    }

    fn seeded(seed: u64) -> SvmConfig {
        SvmConfig {
            seed: Some(seed),
            ..SvmConfig::default()
        }
    }

    #[test]
    fn test_binary_classifier_separable() {
        let (data, labels) = separable(0, 1);
        for seed in 0..5 {
            let classifier =
                BinaryClassifier::with_training(LinearKernel::new(), seeded(seed), &data, &labels)
                    .expect("Training should succeed");

            let accuracy = classifier.compute_accuracy(&data, &labels).unwrap();
            assert!(accuracy >= 0.95, "seed {seed}: accuracy {accuracy}");
            assert!(classifier.n_support_vectors() > 0);
            assert!(classifier.n_support_vectors() < data.len());
        }
    }

    #[test]
    fn test_binary_classifier_alpha_bounds() {
        let (data, labels) = separable(0, 1);
        for &c in &[0.05, 1.0, 10.0] {
            let config = SvmConfig {
                c,
                seed: Some(1),
                ..SvmConfig::default()
            };
            let classifier = BinaryClassifier::with_training(LinearKernel::new(), config, &data, &labels)
                .expect("Training should succeed");
            let support = classifier.support_set().unwrap();
            assert!(support.alpha().iter().all(|&a| a >= 0.0 && a <= c));
            assert_eq!(support.vectors().len(), support.labels().len());
        }
    }

    #[test]
    fn test_binary_classifier_rbf_xor() {
        let mut data = Vec::new();
        let mut labels = Vec::new();
        let offsets = [(0.0, 0.0), (0.3, 0.2), (-0.2, 0.3), (0.2, -0.3), (-0.3, -0.1)];
        for &((cx, cy), label) in &[((0.0, 0.0), 0), ((4.0, 4.0), 0), ((0.0, 4.0), 1), ((4.0, 0.0), 1)] {
            for &(dx, dy) in &offsets {
                data.push(vec![cx + dx, cy + dy]);
                labels.push(label);
            }
        }

        let classifier = BinaryClassifier::with_training(RBFKernel::new(0.2), seeded(4), &data, &labels)
            .expect("Training should succeed");
        assert_eq!(classifier.compute_accuracy(&data, &labels).unwrap(), 1.0);
    }

    #[test]
    fn test_binary_classifier_label_remap() {
        let (data, labels) = separable(3, 7);
        let classifier = BinaryClassifier::with_training(LinearKernel::new(), seeded(2), &data, &labels)
            .expect("Training should succeed");

        assert_eq!(classifier.classes(), Some([3, 7]));
        let support = classifier.support_set().unwrap();
        assert!(support.labels().contains(&-1.0));
        assert!(support.labels().contains(&1.0));

        let predictions = classifier
            .classify(&[vec![0.1, -0.1], vec![9.9, 10.2]])
            .unwrap();
        assert_eq!(predictions, vec![0, 1]);
    }

    #[test]
    fn test_binary_classifier_classify_is_deterministic() {
        let (data, labels) = separable(0, 1);
        let classifier = BinaryClassifier::with_training(LinearKernel::new(), seeded(8), &data, &labels)
            .expect("Training should succeed");

        let first = classifier.classify(&data).unwrap();
        let second = classifier.classify(&data).unwrap();
        assert_eq!(first, second);
        assert_eq!(classifier.scores(&data).unwrap(), classifier.scores(&data).unwrap());
    }

    #[test]
    fn test_binary_classifier_same_seed_same_model() {
        let (data, labels) = separable(0, 1);
        let first = BinaryClassifier::with_training(LinearKernel::new(), seeded(21), &data, &labels)
            .expect("Training should succeed");
        let second = BinaryClassifier::with_training(LinearKernel::new(), seeded(21), &data, &labels)
            .expect("Training should succeed");

        assert_eq!(first.support_set(), second.support_set());
        assert_eq!(first.intercept(), second.intercept());
    }

    #[test]
    fn test_binary_classifier_invalid_input_keeps_state() {
        let mut classifier = BinaryClassifier::new(LinearKernel::new(), seeded(0));

        assert!(matches!(
            classifier.train(&[], &[]),
            Err(SVMError::InvalidInput(_))
        ));
        assert!(matches!(
            classifier.train(&[vec![1.0], vec![2.0]], &[1, 1]),
            Err(SVMError::InvalidInput(_))
        ));
        assert!(matches!(
            classifier.train(&[vec![1.0], vec![2.0], vec![3.0]], &[0, 1, 2]),
            Err(SVMError::InvalidInput(_))
        ));
        assert!(matches!(
            classifier.train(&[vec![1.0], vec![2.0]], &[0]),
            Err(SVMError::InvalidInput(_))
        ));
        assert!(!classifier.is_trained());
        assert_eq!(classifier.n_support_vectors(), 0);

        let (data, labels) = separable(0, 1);
        classifier.train(&data, &labels).expect("Training should succeed");
        let support = classifier.support_set().cloned();
        let intercept = classifier.intercept();

        let single_class = vec![0; data.len()];
        assert!(classifier.train(&data, &single_class).is_err());
        assert_eq!(classifier.support_set().cloned(), support);
        assert_eq!(classifier.intercept(), intercept);
    }

    #[test]
    fn test_binary_classifier_dimension_checks() {
        let mut classifier = BinaryClassifier::new(LinearKernel::new(), seeded(0));
        assert!(matches!(
            classifier.train(&[vec![1.0, 2.0], vec![3.0]], &[0, 1]),
            Err(SVMError::DimensionMismatch { .. })
        ));

        let (data, labels) = separable(0, 1);
        classifier.train(&data, &labels).expect("Training should succeed");
        assert!(matches!(
            classifier.scores(&[vec![1.0, 2.0, 3.0]]),
            Err(SVMError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert!(matches!(
            classifier.score_point(&[1.0]),
            Err(SVMError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_binary_classifier_not_trained() {
        let classifier = BinaryClassifier::new(LinearKernel::new(), SvmConfig::default());
        assert!(matches!(
            classifier.scores(&[vec![1.0]]),
            Err(SVMError::ModelNotTrained)
        ));
        assert!(matches!(
            classifier.classify(&[vec![1.0]]),
            Err(SVMError::ModelNotTrained)
        ));
        assert_eq!(classifier.classes(), None);
    }

    #[test]
    fn test_binary_classifier_degenerate_kernel() {
        let data = vec![vec![1.0, 1.0]; 4];
        let labels = vec![0, 1, 0, 1];
        let mut classifier = BinaryClassifier::new(LinearKernel::new(), seeded(0));

        assert!(matches!(
            classifier.train(&data, &labels),
            Err(SVMError::DegenerateKernel(_))
        ));
        assert!(!classifier.is_trained());
    }

    #[test]
    fn test_binary_classifier_score_matches_support_sum() {
        let (data, labels) = separable(0, 1);
        let classifier = BinaryClassifier::with_training(LinearKernel::new(), seeded(5), &data, &labels)
            .expect("Training should succeed");
        let support = classifier.support_set().unwrap();
        let query = [4.0, 6.0];

        let expected: f64 = support
            .vectors()
            .iter()
            .zip(support.labels().iter().zip(support.alpha()))
            .map(|(sv, (&y, &a))| a * y * (sv[0] * query[0] + sv[1] * query[1]))
            .sum::<f64>()
            + classifier.intercept().unwrap();

        assert_relative_eq!(classifier.score_point(&query).unwrap(), expected, epsilon = 1e-9);
        assert_relative_eq!(
            classifier.scores(&[query.to_vec()]).unwrap()[0],
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_binary_classifier_without_intercept() {
        let (data, labels) = separable(0, 1);
        let with = BinaryClassifier::with_training(LinearKernel::new(), seeded(6), &data, &labels)
            .expect("Training should succeed");
        let config = SvmConfig {
            fit_intercept: false,
            ..seeded(6)
        };
        let without = BinaryClassifier::with_training(LinearKernel::new(), config, &data, &labels)
            .expect("Training should succeed");

        let intercept = with.intercept().unwrap();
        let with_scores = with.scores(&data).unwrap();
        let without_scores = without.scores(&data).unwrap();
        for (a, b) in with_scores.iter().zip(&without_scores) {
            assert_relative_eq!(a - b, intercept, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_binary_classifier_batch_mean_threshold() {
        let (data, labels) = separable(0, 1);
        let config = SvmConfig {
            threshold: ThresholdPolicy::BatchMean,
            ..seeded(3)
        };
        let classifier = BinaryClassifier::with_training(LinearKernel::new(), config, &data, &labels)
            .expect("Training should succeed");

        // a balanced batch recovers the labels
        assert_eq!(classifier.classify(&data).unwrap(), labels);

        // a one-element batch sits on its own mean and always lands on the >= side
        assert_eq!(classifier.classify_point(&[0.0, 0.0]).unwrap(), 1);
        assert_eq!(classifier.classify_point(&[10.0, 10.0]).unwrap(), 1);

        // the same point flips with the batch it is classified in
        let low_batch = classifier
            .classify(&[vec![0.0, 0.0], vec![10.0, 10.0]])
            .unwrap();
        assert_eq!(low_batch, vec![0, 1]);
    }

    #[test]
    fn test_binary_classifier_fixed_threshold_single_point() {
        let (data, labels) = separable(0, 1);
        let classifier = BinaryClassifier::with_training(LinearKernel::new(), seeded(3), &data, &labels)
            .expect("Training should succeed");

        assert_eq!(classifier.classify_point(&[0.2, 0.1]).unwrap(), 0);
        assert_eq!(classifier.classify_point(&[10.1, 9.8]).unwrap(), 1);
    }

    #[test]
    fn test_binary_classifier_from_parts() {
        let support = SupportSet::new(
            vec![vec![1.0], vec![-1.0]],
            vec![1.0, -1.0],
            vec![0.5, 0.5],
        )
        .unwrap();
        let classifier =
            BinaryClassifier::from_parts(LinearKernel::new(), SvmConfig::default(), [0, 1], 0.0, support)
                .unwrap();

        assert_relative_eq!(classifier.score_point(&[2.0]).unwrap(), 2.0);
        assert_eq!(classifier.classify(&[vec![0.5], vec![-0.5]]).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_support_set_validation() {
        assert!(SupportSet::new(vec![vec![1.0]], vec![1.0, -1.0], vec![0.1]).is_err());
        assert!(SupportSet::new(vec![vec![1.0]], vec![0.5], vec![0.1]).is_err());
        assert!(SupportSet::new(vec![vec![1.0]], vec![1.0], vec![-0.1]).is_err());
        assert!(SupportSet::new(vec![vec![1.0]], vec![1.0], vec![f64::NAN]).is_err());
        assert!(BinaryClassifier::from_parts(
            LinearKernel::new(),
            SvmConfig::default(),
            [1, 1],
            0.0,
            SupportSet::new(vec![vec![1.0]], vec![1.0], vec![0.1]).unwrap(),
        )
        .is_err());
    }
}
