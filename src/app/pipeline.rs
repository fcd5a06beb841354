//! Command pipelines shared by the CLI handlers.
//!
//! These functions take already-loaded matrices and resolved settings, so the
//! workflow can be tested without touching the filesystem:
//! settings -> options -> numeric routine -> outputs.

use nalgebra::DMatrix;

use crate::domain::{Background, EmscSettings, WhittakerSettings};
use crate::error::ChemError;
use crate::fit::{EmscFit, EmscOptions, emsc};
use crate::smooth::{PenaltySearch, log_space, optimize_penalty, whittaker};

/// Output of an EMSC run.
#[derive(Debug, Clone)]
pub struct EmscRun {
    pub options: EmscOptions,
    pub fit: EmscFit,
}

/// Run EMSC on `data` (samples in rows).
///
/// `background_rows` holds one background spectrum per row, in the same
/// orientation as `data`.
pub fn run_emsc(
    data: &DMatrix<f64>,
    background_rows: Option<&DMatrix<f64>>,
    settings: &EmscSettings,
) -> Result<EmscRun, ChemError> {
    let background = match background_rows {
        Some(rows) => Background::Spectra(rows.transpose()),
        None => Background::None,
    };
    let options = EmscOptions::from_settings(settings, background);
    let fit = emsc(data, &options)?;
    Ok(EmscRun { options, fit })
}

/// Smooth every sample (row) of `data` along the variable axis.
pub fn run_whittaker(data: &DMatrix<f64>, settings: &WhittakerSettings) -> Result<DMatrix<f64>, ChemError> {
    let smoothed = whittaker(&data.transpose(), settings.penalty, settings.constraint_order)?;
    Ok(smoothed.transpose())
}

/// Cross-validate a log-spaced penalty grid on the samples of `data`.
pub fn run_penalty_search(
    data: &DMatrix<f64>,
    constraint_order: usize,
    penalty_min: f64,
    penalty_max: f64,
    steps: usize,
) -> Result<PenaltySearch, ChemError> {
    let grid = log_space(penalty_min, penalty_max, steps)?;
    optimize_penalty(&data.transpose(), &grid, constraint_order)
}
