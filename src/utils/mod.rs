//! Utility functions for the kernel SVM

/// Input validation shared by the classifiers
pub mod validation {
    use crate::core::{Result, SVMError};
    use std::collections::BTreeSet;

    /// Validate a training set and return its feature dimensionality.
    ///
    /// Rejects empty sets, sample/label count mismatches, rows without
    /// features and non-finite feature values with `InvalidInput`, and ragged
    /// rows with `DimensionMismatch`.
    pub fn check_training_set(data: &[Vec<f64>], labels: &[usize]) -> Result<usize> {
        if data.is_empty() {
            return Err(SVMError::InvalidInput("empty dataset".to_string()));
        }
        if data.len() != labels.len() {
            return Err(SVMError::InvalidInput(format!(
                "{} samples but {} labels",
                data.len(),
                labels.len()
            )));
        }

        let dim = data[0].len();
        if dim == 0 {
            return Err(SVMError::InvalidInput(
                "samples have no features".to_string(),
            ));
        }
        check_points(data, dim)?;
        Ok(dim)
    }

    /// Validate that every query point has `dim` finite features
    pub fn check_points(points: &[Vec<f64>], dim: usize) -> Result<()> {
        for (i, point) in points.iter().enumerate() {
            if point.len() != dim {
                return Err(SVMError::DimensionMismatch {
                    expected: dim,
                    actual: point.len(),
                });
            }
            if point.iter().any(|v| !v.is_finite()) {
                return Err(SVMError::InvalidInput(format!(
                    "sample {i} contains a non-finite feature value"
                )));
            }
        }
        Ok(())
    }

    /// Sorted distinct labels
    pub fn distinct_labels(labels: &[usize]) -> Vec<usize> {
        labels
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Count of each class in `0..num_classes`; labels outside the range are ignored
    pub fn class_counts(labels: &[usize], num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0; num_classes];
        for &label in labels {
            if label < num_classes {
                counts[label] += 1;
            }
        }
        counts
    }
}
