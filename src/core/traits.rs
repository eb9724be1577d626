//! Core traits for the kernel SVM

use crate::core::{Result, SVMError, Sample};

/// Dataset abstraction for dense, labelled samples
pub trait Dataset {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize;

    /// Get a single sample by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn get_sample(&self, i: usize) -> Sample;

    /// Get all labels as a vector
    fn get_labels(&self) -> Vec<usize>;

    /// Feature rows in sample order
    fn features(&self) -> Vec<Vec<f64>> {
        (0..self.len()).map(|i| self.get_sample(i).features).collect()
    }

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A trained classifier that scores and labels batches of dense points
pub trait Classifier {
    /// Predicted labels for a batch of query points
    fn classify(&self, points: &[Vec<f64>]) -> Result<Vec<usize>>;

    /// Predicted label for a single point, classified as a one-element batch
    fn classify_point(&self, point: &[f64]) -> Result<usize> {
        let labels = self.classify(&[point.to_vec()])?;
        labels
            .into_iter()
            .next()
            .ok_or_else(|| SVMError::InvalidInput("classification returned no label".to_string()))
    }

    /// Fraction of `test_labels` matched by the classifier's predictions
    fn compute_accuracy(&self, test_data: &[Vec<f64>], test_labels: &[usize]) -> Result<f64> {
        if test_labels.len() != test_data.len() {
            return Err(SVMError::DimensionMismatch {
                expected: test_data.len(),
                actual: test_labels.len(),
            });
        }
        if test_data.is_empty() {
            return Err(SVMError::InvalidInput(
                "cannot compute accuracy on an empty test set".to_string(),
            ));
        }

        let predictions = self.classify(test_data)?;
        let correct = predictions
            .iter()
            .zip(test_labels.iter())
            .filter(|(pred, actual)| pred == actual)
            .count();

        Ok(correct as f64 / test_labels.len() as f64)
    }
}
