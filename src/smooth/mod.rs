//! Whittaker smoothing and penalty selection.

pub mod penalty;
pub mod whittaker;

pub use penalty::*;
pub use whittaker::*;
