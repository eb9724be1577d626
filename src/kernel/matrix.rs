//! Dense precomputed kernel matrix
//!
//! The SMO loop reads every K(x_i, x_j) many times, so the full n×n table is
//! built once per training call. Memory is O(n²), which bounds the training
//! set sizes this crate is meant for.

use crate::kernel::Kernel;

/// Symmetric n×n table of kernel values over a set of training points
#[derive(Debug, Clone, PartialEq)]
pub struct KernelMatrix {
    n: usize,
    values: Vec<f64>,
}

impl KernelMatrix {
    /// Evaluate the kernel over every pair of points.
    ///
    /// Only the upper triangle is evaluated; each value is mirrored, so
    /// `get(i, j) == get(j, i)` holds exactly regardless of how the kernel
    /// rounds.
    pub fn compute<K: Kernel + ?Sized>(kernel: &K, points: &[Vec<f64>]) -> Self {
        let n = points.len();
        let mut values = vec![0.0; n * n];

        for i in 0..n {
            for j in i..n {
                let value = kernel.compute(&points[i], &points[j]);
                values[i * n + j] = value;
                values[j * n + i] = value;
            }
        }

        Self { n, values }
    }

    /// Number of rows (and columns)
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// K(x_i, x_j)
    ///
    /// # Panics
    /// Panics if either index is out of range
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "kernel matrix index out of range");
        self.values[i * self.n + j]
    }

    /// Row i, i.e. K(x_i, x_k) for every k
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }

    /// Check exact symmetry of the stored table
    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.get(i, j) == self.get(j, i)))
    }
}
