//! Input/output helpers.
//!
//! - CSV matrix ingest + export (`matrix`)
//! - TOML config files (`config`)
//! - EMSC run summaries as JSON (`summary`)

pub mod config;
pub mod matrix;
pub mod summary;

pub use config::*;
pub use matrix::*;
pub use summary::*;
