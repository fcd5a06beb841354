//! Extended multiplicative scatter correction (EMSC).
//!
//! EMSC decomposes every spectrum into
//!
//! ```text
//! d_i ≈ Σ_j c_ij · u^j            polynomial baseline (j = 0..=p_order)
//!     + Σ_k h_ik · g_k             background spectra, orthogonalized to the baseline
//!     + b_i · r                    mean spectrum, orthogonalized to everything above
//! ```
//!
//! and removes the baseline and background parts, keeping `b_i · r` (the
//! chemical information). With normalization the result is divided by `b_i`,
//! which removes multiplicative scaling differences between samples.
//!
//! All regressions use ALS (`fit::als`). See Afseth & Kohler, Chemometr.
//! Intell. Lab. Syst. 117 (2012) for the method.
//!
//! Shapes: `D` is `n × m` (samples × variables), the regressor is `m × k`,
//! coefficients are `k × n` (one row per regressor term, one column per
//! sample). The last regressor column is always the mean-spectrum term.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Background, BackgroundFit, EmscSettings};
use crate::error::ChemError;
use crate::fit::als::{AlsOptions, asym_ls, asym_ls_vector};
use crate::math::polynomial_baseline;

/// Normalization divisors with magnitude below this are rejected.
pub const NORMALIZE_EPS: f64 = 1e-12;

/// Options for an EMSC run.
#[derive(Debug, Clone, PartialEq)]
pub struct EmscOptions {
    pub p_order: usize,
    pub background: Background,
    pub normalize: bool,
    pub asym_factor: f64,
    pub max_iter: usize,
    pub background_fit: BackgroundFit,
}

impl Default for EmscOptions {
    fn default() -> Self {
        Self::from_settings(&EmscSettings::default(), Background::None)
    }
}

impl EmscOptions {
    pub fn from_settings(settings: &EmscSettings, background: Background) -> Self {
        Self {
            p_order: settings.p_order,
            background,
            normalize: settings.normalize,
            asym_factor: settings.asym_factor,
            max_iter: settings.max_iter,
            background_fit: settings.background_fit,
        }
    }

    /// The serializable part of the options.
    pub fn settings(&self) -> EmscSettings {
        EmscSettings {
            p_order: self.p_order,
            normalize: self.normalize,
            asym_factor: self.asym_factor,
            max_iter: self.max_iter,
            background_fit: self.background_fit,
        }
    }

    fn als(&self) -> AlsOptions {
        AlsOptions {
            asym_factor: self.asym_factor,
            max_iter: self.max_iter,
        }
    }

    fn background_als(&self) -> AlsOptions {
        match self.background_fit {
            BackgroundFit::Asymmetric => self.als(),
            BackgroundFit::Symmetric => AlsOptions {
                asym_factor: 0.5,
                max_iter: self.max_iter,
            },
        }
    }

    /// Number of regressor terms: baseline, background, mean spectrum.
    pub fn n_terms(&self) -> usize {
        self.p_order + 1 + self.background.n_terms() + 1
    }

    /// Labels of the regressor terms, in coefficient row order.
    pub fn term_names(&self) -> Vec<String> {
        let baseline = (0..=self.p_order).map(|j| format!("baseline_{j}"));
        let background = (1..=self.background.n_terms()).map(|j| format!("background_{j}"));
        baseline
            .chain(background)
            .chain(std::iter::once("chemical".to_string()))
            .collect()
    }
}

/// Output of a full EMSC run.
#[derive(Debug, Clone, PartialEq)]
pub struct EmscFit {
    /// Corrected data, `n × m`.
    pub pretreated: DMatrix<f64>,
    /// Regression coefficients, `k × n`.
    pub coefficients: DMatrix<f64>,
    /// Design matrix used for the final fit, `m × k`.
    pub regressor: DMatrix<f64>,
    /// `true` if every ALS stage converged before its iteration cap.
    pub converged: bool,
    /// Largest ALS iteration count over all stages and columns.
    pub max_iterations: usize,
}

/// Run EMSC on `d` (samples in rows, variables in columns).
pub fn emsc(d: &DMatrix<f64>, opts: &EmscOptions) -> Result<EmscFit, ChemError> {
    let built = build_regressor(d, opts)?;
    let decomposed = decompose(d, &built.regressor, opts)?;

    Ok(EmscFit {
        pretreated: decomposed.pretreated,
        coefficients: decomposed.coefficients,
        regressor: built.regressor,
        converged: built.converged && decomposed.converged,
        max_iterations: built.max_iterations.max(decomposed.max_iterations),
    })
}

/// EMSC as a reusable estimator.
///
/// `fit` derives the regressor (baseline, background, mean spectrum) from a
/// calibration set; `transform` corrects new spectra against that same
/// regressor. `fit_transform` does both on one dataset.
#[derive(Debug, Clone)]
pub struct Emsc {
    options: EmscOptions,
    regressor: Option<DMatrix<f64>>,
    coefficients: Option<DMatrix<f64>>,
    fit_converged: bool,
    transform_converged: Option<bool>,
}

impl Emsc {
    pub fn new(options: EmscOptions) -> Self {
        Self {
            options,
            regressor: None,
            coefficients: None,
            fit_converged: false,
            transform_converged: None,
        }
    }

    pub fn options(&self) -> &EmscOptions {
        &self.options
    }

    /// Build the regressor from `d` without correcting it.
    pub fn fit(&mut self, d: &DMatrix<f64>) -> Result<&mut Self, ChemError> {
        let built = build_regressor(d, &self.options)?;
        self.regressor = Some(built.regressor);
        self.coefficients = None;
        self.fit_converged = built.converged;
        self.transform_converged = None;
        Ok(self)
    }

    /// Correct `d` against the fitted regressor.
    pub fn transform(&mut self, d: &DMatrix<f64>) -> Result<DMatrix<f64>, ChemError> {
        let regressor = self.regressor.as_ref().ok_or_else(|| {
            ChemError::InvalidParameter("EMSC must be fitted before transform.".to_string())
        })?;
        let decomposed = decompose(d, regressor, &self.options)?;
        self.coefficients = Some(decomposed.coefficients);
        self.transform_converged = Some(decomposed.converged);
        Ok(decomposed.pretreated)
    }

    pub fn fit_transform(&mut self, d: &DMatrix<f64>) -> Result<DMatrix<f64>, ChemError> {
        self.fit(d)?;
        self.transform(d)
    }

    /// Coefficients of the last transform, one row per sample (`n × k`).
    pub fn coefficients(&self) -> Option<DMatrix<f64>> {
        self.coefficients.as_ref().map(|c| c.transpose())
    }

    pub fn regressor(&self) -> Option<&DMatrix<f64>> {
        self.regressor.as_ref()
    }

    /// `true` once fitted and both the calibration and the most recent
    /// transform converged.
    pub fn converged(&self) -> bool {
        self.regressor.is_some() && self.fit_converged && self.transform_converged.unwrap_or(true)
    }
}

struct Regressor {
    regressor: DMatrix<f64>,
    converged: bool,
    max_iterations: usize,
}

struct Decomposition {
    pretreated: DMatrix<f64>,
    coefficients: DMatrix<f64>,
    converged: bool,
    max_iterations: usize,
}

fn build_regressor(d: &DMatrix<f64>, opts: &EmscOptions) -> Result<Regressor, ChemError> {
    let (n, m) = d.shape();
    if n == 0 || m == 0 {
        return Err(ChemError::InvalidParameter(format!(
            "EMSC needs at least one sample and one variable, got {n} × {m}."
        )));
    }

    let als = opts.als();
    let baseline = polynomial_baseline(m, opts.p_order);
    let mut regressor = baseline.clone();
    let mut converged = true;
    let mut max_iterations = 0;

    if let Some(background) = opts.background.spectra() {
        if background.nrows() != m {
            return Err(ChemError::ShapeMismatch {
                context: "EMSC background spectra",
                expected: m,
                found: background.nrows(),
            });
        }
        if background.ncols() == 0 {
            return Err(ChemError::InvalidParameter(
                "EMSC background has no spectra.".to_string(),
            ));
        }

        let fit = asym_ls(&baseline, background, &opts.background_als())?;
        let orthogonal = background - &baseline * &fit.beta;
        regressor = append_columns(regressor, &orthogonal);
        converged &= fit.converged();
        max_iterations = max_iterations.max(fit.max_iterations());
    }

    let mean = DVector::from_fn(m, |j, _| d.column(j).mean());
    let mean_fit = asym_ls_vector(&regressor, &mean, &als)?;
    let mean_orthogonal = &mean - &regressor * &mean_fit.beta;
    regressor = append_columns(regressor, &DMatrix::from_column_slice(m, 1, mean_orthogonal.as_slice()));
    converged &= mean_fit.converged;
    max_iterations = max_iterations.max(mean_fit.iterations);

    log::debug!(
        "EMSC regressor: {} baseline, {} background, 1 mean term over {m} variables",
        opts.p_order + 1,
        opts.background.n_terms()
    );

    Ok(Regressor {
        regressor,
        converged,
        max_iterations,
    })
}

fn decompose(
    d: &DMatrix<f64>,
    regressor: &DMatrix<f64>,
    opts: &EmscOptions,
) -> Result<Decomposition, ChemError> {
    if regressor.nrows() != d.ncols() {
        return Err(ChemError::ShapeMismatch {
            context: "EMSC data variables",
            expected: regressor.nrows(),
            found: d.ncols(),
        });
    }

    let fit = asym_ls(regressor, &d.transpose(), &opts.als())?;
    let k = regressor.ncols();
    let coefficients = fit.beta;

    // Everything except the last (mean spectrum) term is interference.
    let interference = regressor.columns(0, k - 1) * coefficients.rows(0, k - 1);
    let mut pretreated = d - interference.transpose();

    if opts.normalize {
        for (i, mut row) in pretreated.row_iter_mut().enumerate() {
            let divisor = coefficients[(k - 1, i)];
            if divisor.is_nan() || divisor.abs() < NORMALIZE_EPS {
                return Err(ChemError::Normalization { sample: i, divisor });
            }
            row /= divisor;
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ChemError::Normalization { sample: i, divisor });
            }
        }
    }

    Ok(Decomposition {
        pretreated,
        coefficients,
        converged: fit.converged.iter().all(|&c| c),
        max_iterations: fit.iterations.iter().copied().max().unwrap_or(0),
    })
}

fn append_columns(base: DMatrix<f64>, extra: &DMatrix<f64>) -> DMatrix<f64> {
    let k = base.ncols();
    let mut out = base.resize_horizontally(k + extra.ncols(), 0.0);
    out.columns_mut(k, extra.ncols()).copy_from(extra);
    out
}
