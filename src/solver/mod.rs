//! SVM solver implementations
//!
//! This module implements a simplified Sequential Minimal Optimization (SMO)
//! loop with randomized partner selection, and the strategies that decide
//! which trained samples are retained as support vectors.

pub mod smo;
pub mod support;

pub use self::smo::*;
pub use self::support::*;
