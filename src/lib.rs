//! Kernel Support Vector Machine trained with simplified SMO
//!
//! Binary classifiers are trained by a randomized two-variable SMO loop over
//! a dense precomputed kernel matrix; multi-class problems are decomposed
//! one-vs-one and decided by majority vote.

pub mod api;
pub mod classifier;
pub mod core;
pub mod data;
pub mod kernel;
pub mod persistence;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, ModelInfo, TrainedModel, SVM};
pub use crate::classifier::{BinaryClassifier, ClassPair, MultiClassSVM, SupportSet};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SVMError};
pub use crate::data::CSVDataset;
pub use crate::kernel::{Kernel, KernelType, LinearKernel, PolynomialKernel, RBFKernel};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
