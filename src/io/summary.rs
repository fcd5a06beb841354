//! JSON run summaries.
//!
//! A summary records the settings and per-sample coefficients of an EMSC run
//! so the decomposition can be inspected without rerunning it.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::EmscSettings;
use crate::error::AppError;
use crate::fit::{EmscFit, EmscOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmscSummary {
    pub tool: String,
    pub settings: EmscSettings,
    pub n_samples: usize,
    pub n_variables: usize,
    pub n_background: usize,
    /// Regressor term labels, matching the inner order of `coefficients`.
    pub terms: Vec<String>,
    /// One coefficient vector per sample.
    pub coefficients: Vec<Vec<f64>>,
    pub converged: bool,
    pub max_iterations: usize,
}

impl EmscSummary {
    pub fn new(opts: &EmscOptions, fit: &EmscFit) -> Self {
        let coefficients = fit
            .coefficients
            .column_iter()
            .map(|c| c.iter().copied().collect())
            .collect();
        Self {
            tool: "chem".to_string(),
            settings: opts.settings(),
            n_samples: fit.pretreated.nrows(),
            n_variables: fit.pretreated.ncols(),
            n_background: opts.background.n_terms(),
            terms: opts.term_names(),
            coefficients,
            converged: fit.converged,
            max_iterations: fit.max_iterations,
        }
    }
}

/// Write a summary JSON file.
pub fn write_summary_json(path: &Path, summary: &EmscSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}
