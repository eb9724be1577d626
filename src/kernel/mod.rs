//! Kernel functions and the precomputed kernel matrix

pub mod kind;
pub mod linear;
pub mod matrix;
pub mod polynomial;
pub mod rbf;
pub mod traits;

pub use self::kind::*;
pub use self::linear::*;
pub use self::matrix::*;
pub use self::polynomial::*;
pub use self::rbf::*;
pub use self::traits::Kernel;
