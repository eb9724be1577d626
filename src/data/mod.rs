//! Data loading and dataset implementations
//!
//! Dense CSV is the one on-disk format; anything else can implement
//! `Dataset` directly.

pub mod csv;

pub use self::csv::*;
