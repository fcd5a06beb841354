//! `chemometrics` library crate.
//!
//! Spectroscopic pretreatment built on dense least squares:
//!
//! - asymmetric least squares regression (`fit::als`)
//! - extended multiplicative scatter correction (`fit::emsc`)
//! - Whittaker smoothing with cross-validated penalties (`smooth`)
//! - synthetic spectra and backgrounds for testing (`data`)
//!
//! The binary (`chem`) is a thin wrapper around this library so the numeric
//! code stays testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
pub mod smooth;

pub use error::{AppError, ChemError};
pub use fit::{AlsFit, AlsOptions, Emsc, EmscFit, EmscOptions, asym_ls, emsc};
pub use smooth::{whittaker, whittaker_cve, whittaker_h_bar};
