//! One-vs-one multi-class dispatcher
//!
//! A problem with `num_classes` classes is split into one binary classifier
//! per unordered class pair `(a, b)` with `a < b`. At inference time each
//! pair casts one vote per query point and the class with the most votes wins.

use super::binary::{BinaryClassifier, TrainingSummary};
use crate::core::{Classifier, Result, SVMError, SvmConfig};
use crate::kernel::Kernel;
use crate::solver::seeded_rng;
use crate::utils::validation::{check_points, check_training_set, class_counts};
use log::{debug, info};
use rand::Rng;

/// Unordered class pair, stored with `lower < upper`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassPair {
    pub lower: usize,
    pub upper: usize,
}

impl ClassPair {
    pub fn new(a: usize, b: usize) -> Result<Self> {
        if a == b {
            return Err(SVMError::InvalidInput(format!(
                "a class pair needs two different classes, got ({a}, {b})"
            )));
        }
        Ok(Self {
            lower: a.min(b),
            upper: a.max(b),
        })
    }

    /// All pairs over `0..num_classes` in lexicographic order
    pub fn all(num_classes: usize) -> Vec<ClassPair> {
        (0..num_classes)
            .flat_map(|lower| ((lower + 1)..num_classes).map(move |upper| ClassPair { lower, upper }))
            .collect()
    }
}

/// One trained pair classifier together with its key
#[derive(Debug, Clone)]
pub struct PairClassifier<K: Kernel> {
    pub pair: ClassPair,
    pub classifier: BinaryClassifier<K>,
}

/// One-vs-one SVM over `num_classes` classes
#[derive(Debug, Clone)]
pub struct MultiClassSVM<K: Kernel + Clone> {
    kernel: K,
    config: SvmConfig,
    num_classes: usize,
    pairs: Vec<PairClassifier<K>>,
}

impl<K: Kernel + Clone> MultiClassSVM<K> {
    /// Create an untrained model
    pub fn new(kernel: K, config: SvmConfig, num_classes: usize) -> Self {
        Self {
            kernel,
            config,
            num_classes,
            pairs: Vec::new(),
        }
    }

    /// Create a model and train it immediately
    pub fn with_training(
        kernel: K,
        config: SvmConfig,
        data: &[Vec<f64>],
        labels: &[usize],
        num_classes: usize,
    ) -> Result<Self> {
        let mut model = Self::new(kernel, config, num_classes);
        model.train(data, labels)?;
        Ok(model)
    }

    /// Rebuild a trained model from persisted pair classifiers.
    ///
    /// The pairs must be exactly those of `ClassPair::all(num_classes)`, in
    /// the same order.
    pub fn from_parts(
        kernel: K,
        config: SvmConfig,
        num_classes: usize,
        pairs: Vec<PairClassifier<K>>,
    ) -> Result<Self> {
        if num_classes < 2 {
            return Err(SVMError::InvalidParameter(format!(
                "num_classes must be at least 2, got {num_classes}"
            )));
        }
        let expected = ClassPair::all(num_classes);
        let actual: Vec<ClassPair> = pairs.iter().map(|p| p.pair).collect();
        if expected != actual {
            return Err(SVMError::InvalidInput(format!(
                "expected {} pair classifiers in lexicographic order, got {:?}",
                expected.len(),
                actual
            )));
        }
        let dims: Vec<Option<usize>> = pairs.iter().map(|p| p.classifier.dim()).collect();
        if dims.iter().any(|d| d.is_none() || *d != dims[0]) {
            return Err(SVMError::InvalidInput(
                "pair classifiers must all be trained on the same dimensionality".to_string(),
            ));
        }
        Ok(Self {
            kernel,
            config,
            num_classes,
            pairs,
        })
    }

    /// Train every pair classifier with the generator seeded from the configuration
    pub fn train(&mut self, data: &[Vec<f64>], labels: &[usize]) -> Result<Vec<TrainingSummary>> {
        let mut rng = seeded_rng(self.config.seed);
        self.train_with_rng(data, labels, &mut rng)
    }

    /// Train every pair classifier, sharing `rng` across pairs in
    /// lexicographic pair order.
    ///
    /// The previous pair collection is replaced only if every pair trains.
    pub fn train_with_rng<R: Rng + ?Sized>(
        &mut self,
        data: &[Vec<f64>],
        labels: &[usize],
        rng: &mut R,
    ) -> Result<Vec<TrainingSummary>> {
        if self.num_classes < 2 {
            return Err(SVMError::InvalidParameter(format!(
                "num_classes must be at least 2, got {}",
                self.num_classes
            )));
        }
        self.config.validate()?;
        check_training_set(data, labels)?;
        if let Some(&bad) = labels.iter().find(|&&label| label >= self.num_classes) {
            return Err(SVMError::InvalidInput(format!(
                "label {bad} is outside 0..{}",
                self.num_classes
            )));
        }

        let pairs = ClassPair::all(self.num_classes);
        debug!(
            "Samples per class: {:?}",
            class_counts(labels, self.num_classes)
        );
        info!(
            "Training {} one-vs-one classifiers for {} classes on {} samples",
            pairs.len(),
            self.num_classes,
            data.len()
        );

        let mut trained = Vec::with_capacity(pairs.len());
        let mut summaries = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let (subset, sublabels) = restrict_to_pair(data, labels, pair);
            debug!(
                "Training pair ({}, {}) on {} samples",
                pair.lower,
                pair.upper,
                subset.len()
            );

            let mut classifier = BinaryClassifier::new(self.kernel.clone(), self.config.clone());
            let summary = classifier
                .train_with_rng(&subset, &sublabels, rng)
                .map_err(|e| match e {
                    SVMError::InvalidInput(msg) => SVMError::InvalidInput(format!(
                        "class pair ({}, {}): {msg}",
                        pair.lower, pair.upper
                    )),
                    other => other,
                })?;
            summaries.push(summary);
            trained.push(PairClassifier { pair, classifier });
        }

        self.pairs = trained;
        Ok(summaries)
    }

    /// Raw decision values, one row per pair classifier and one column per point
    pub fn decision_scores(&self, points: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        if self.pairs.is_empty() {
            return Err(SVMError::ModelNotTrained);
        }
        self.pairs
            .iter()
            .map(|p| p.classifier.scores(points))
            .collect()
    }

    /// Vote counts per point, indexed by class
    pub fn votes(&self, points: &[Vec<f64>]) -> Result<Vec<Vec<usize>>> {
        if let Some(dim) = self.dim() {
            check_points(points, dim)?;
        }
        let scores = self.decision_scores(points)?;
        let pair_keys: Vec<ClassPair> = self.pairs.iter().map(|p| p.pair).collect();
        let thresholds: Vec<f64> = scores
            .iter()
            .map(|row| self.config.threshold.threshold(row))
            .collect();
        Ok(tally_votes(
            &pair_keys,
            &scores,
            &thresholds,
            points.len(),
            self.num_classes,
        ))
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Number of trained pair classifiers (`num_classes * (num_classes - 1) / 2` once trained)
    pub fn num_classifiers(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[PairClassifier<K>] {
        &self.pairs
    }

    /// Trained classifier for the given pair, in either order
    pub fn pair_classifier(&self, a: usize, b: usize) -> Option<&BinaryClassifier<K>> {
        let key = ClassPair::new(a, b).ok()?;
        self.pairs
            .iter()
            .find(|p| p.pair == key)
            .map(|p| &p.classifier)
    }

    pub fn is_trained(&self) -> bool {
        !self.pairs.is_empty()
    }

    pub fn dim(&self) -> Option<usize> {
        self.pairs.first().and_then(|p| p.classifier.dim())
    }

    /// Support vectors summed over all pair classifiers
    pub fn n_support_vectors(&self) -> usize {
        self.pairs
            .iter()
            .map(|p| p.classifier.n_support_vectors())
            .sum()
    }

    pub fn config(&self) -> &SvmConfig {
        &self.config
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

impl<K: Kernel + Clone> Classifier for MultiClassSVM<K> {
    fn classify(&self, points: &[Vec<f64>]) -> Result<Vec<usize>> {
        Ok(self.votes(points)?.iter().map(|v| argmax_lowest(v)).collect())
    }
}

/// Samples labelled with either class of `pair`, in training order
fn restrict_to_pair(
    data: &[Vec<f64>],
    labels: &[usize],
    pair: ClassPair,
) -> (Vec<Vec<f64>>, Vec<usize>) {
    data.iter()
        .zip(labels)
        .filter(|(_, label)| **label == pair.lower || **label == pair.upper)
        .map(|(point, &label)| (point.clone(), label))
        .unzip()
}

/// Each pair votes `upper` where its score reaches its threshold, `lower` otherwise
fn tally_votes(
    pairs: &[ClassPair],
    scores: &[Vec<f64>],
    thresholds: &[f64],
    n_points: usize,
    num_classes: usize,
) -> Vec<Vec<usize>> {
    let mut votes = vec![vec![0; num_classes]; n_points];
    for ((pair, row), &threshold) in pairs.iter().zip(scores).zip(thresholds) {
        for (point_votes, &score) in votes.iter_mut().zip(row) {
            let winner = if score >= threshold {
                pair.upper
            } else {
                pair.lower
            };
            point_votes[winner] += 1;
        }
    }
    votes
}

/// Index of the largest count; ties go to the lowest index
fn argmax_lowest(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}
