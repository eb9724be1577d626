//! Kernel classifiers built on the SMO solver

pub mod binary;
pub mod multiclass;

pub use binary::*;
pub use multiclass::*;
