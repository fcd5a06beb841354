//! Regression-based pretreatment.
//!
//! Responsibilities:
//!
//! - asymmetric least squares (`als`), the regression engine
//! - EMSC baseline/background decomposition built on top of it (`emsc`)

pub mod als;
pub mod emsc;

pub use als::*;
pub use emsc::*;
