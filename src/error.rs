//! Error types.
//!
//! - `ChemError` is returned by the numeric API (`fit`, `smooth`, `data`).
//! - `AppError` carries a process exit code for the `chem` binary.

use thiserror::Error;

/// Failures of the numeric routines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChemError {
    #[error("{context}: expected {expected} rows, found {found}.")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{0}")]
    InvalidParameter(String),

    #[error("Least-squares solve for response column {column} produced no finite solution.")]
    DegenerateFit { column: usize },

    #[error("Normalization divisor for sample {sample} is {divisor:e}; cannot rescale.")]
    Normalization { sample: usize, divisor: f64 },

    #[error("Smoothing system is not positive definite (penalty={penalty}, order={order}).")]
    Factorization { penalty: f64, order: usize },

    #[error("Mean leverage is {h_bar}; cross-validation error is undefined.")]
    DegenerateLeverage { h_bar: f64 },
}

impl ChemError {
    /// Exit code used when the error reaches the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            ChemError::ShapeMismatch { .. } | ChemError::InvalidParameter(_) => 2,
            ChemError::DegenerateFit { .. }
            | ChemError::Normalization { .. }
            | ChemError::Factorization { .. }
            | ChemError::DegenerateLeverage { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ChemError> for AppError {
    fn from(err: ChemError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
