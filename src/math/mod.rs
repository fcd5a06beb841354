//! Mathematical utilities: least squares, baseline basis, difference operators.

pub mod basis;
pub mod diff;
pub mod ols;

pub use basis::*;
pub use diff::*;
pub use ols::*;
