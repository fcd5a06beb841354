//! Synthetic spectra and backgrounds.
//!
//! Used as test fixtures and by `chem synth` to produce demo datasets.
//!
//! - spectra are sums of Gaussian bands with random position, width and height
//! - backgrounds are smooth draws from a zero-mean Gaussian process with a
//!   squared-exponential covariance

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use rand::Rng;
use rand_distr::{Distribution, Gamma, Normal, Poisson, StandardNormal};

use crate::error::ChemError;

/// Mean band count of the Poisson intensity draw.
const INTENSITY_LAMBDA: f64 = 5.0;

/// Relative spread of band intensities.
const INTENSITY_SPREAD: f64 = 0.2;

/// Smallest band width; guards the Gaussian profile against `σ = 0`.
const MIN_BANDWIDTH: f64 = 1e-12;

/// Unnormalized Gaussian profile `exp(-((x - mu) / sigma)^2 / 2)`.
pub fn gaussian(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp()
}

/// Generate a spectrum of `n_wl` points made of `n_band` Gaussian bands.
///
/// Band centres are uniform over the index axis, widths follow
/// `Gamma(shape = bandwidth, scale = bandwidth)` and intensities
/// `Poisson(5) · Normal(1, 0.2)`.
pub fn generate_spectra<R: Rng>(
    rng: &mut R,
    n_wl: usize,
    n_band: usize,
    bandwidth: f64,
) -> Result<DVector<f64>, ChemError> {
    if n_wl == 0 {
        return Err(ChemError::InvalidParameter(
            "Spectrum needs at least one wavelength.".to_string(),
        ));
    }
    let width = Gamma::new(bandwidth, bandwidth)
        .map_err(|e| ChemError::InvalidParameter(format!("Invalid bandwidth {bandwidth}: {e}")))?;
    let count = Poisson::new(INTENSITY_LAMBDA)
        .map_err(|e| ChemError::InvalidParameter(format!("Intensity distribution error: {e}")))?;
    let spread = Normal::new(1.0, INTENSITY_SPREAD)
        .map_err(|e| ChemError::InvalidParameter(format!("Intensity distribution error: {e}")))?;

    let mut spectrum = DVector::<f64>::zeros(n_wl);
    for _ in 0..n_band {
        let center = rng.gen_range(0..n_wl) as f64;
        let sigma: f64 = width.sample(rng);
        let sigma = sigma.max(MIN_BANDWIDTH);
        let counts: f64 = count.sample(rng);
        let intensity = counts * spread.sample(rng);

        for (i, v) in spectrum.iter_mut().enumerate() {
            *v += intensity * gaussian(i as f64, center, sigma);
        }
    }
    Ok(spectrum)
}

/// Draw `size` backgrounds of `n_wl` points from a Gaussian process.
///
/// Covariance between points `i` and `j` is
/// `exp(-((i - j) / (n_wl · rel_lengthscale))^2)`. Returns an `n_wl × size`
/// matrix, one background per column.
pub fn generate_background<R: Rng>(
    rng: &mut R,
    n_wl: usize,
    rel_lengthscale: f64,
    size: usize,
) -> Result<DMatrix<f64>, ChemError> {
    if n_wl == 0 || size == 0 {
        return Err(ChemError::InvalidParameter(format!(
            "Background needs positive dimensions, got n_wl={n_wl}, size={size}."
        )));
    }
    if !(rel_lengthscale.is_finite() && rel_lengthscale > 0.0) {
        return Err(ChemError::InvalidParameter(format!(
            "Relative length scale must be finite and > 0, got {rel_lengthscale}."
        )));
    }

    let length = n_wl as f64 * rel_lengthscale;
    let cov = DMatrix::from_fn(n_wl, n_wl, |i, j| {
        let dist = (j as f64 - i as f64) / length;
        (-dist * dist).exp()
    });

    // The squared-exponential kernel is numerically rank deficient; clamp the
    // tiny negative eigenvalues instead of relying on a Cholesky factor.
    let eigen = SymmetricEigen::new(cov);
    let scales = eigen.eigenvalues.map(|v| v.max(0.0).sqrt());
    let factor = eigen.eigenvectors * DMatrix::from_diagonal(&scales);

    let z = DMatrix::from_fn(n_wl, size, |_, _| rng.sample::<f64, _>(StandardNormal));
    Ok(factor * z)
}

/// Options for a complete synthetic dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetSpec {
    pub n_samples: usize,
    pub n_wl: usize,
    pub n_band: usize,
    pub bandwidth: f64,
    pub rel_lengthscale: f64,
    /// Standard deviation of the per-sample multiplicative scaling around 1.
    pub scale_spread: f64,
}

impl Default for DatasetSpec {
    fn default() -> Self {
        Self {
            n_samples: 20,
            n_wl: 200,
            n_band: 10,
            bandwidth: 3.0,
            rel_lengthscale: 0.5,
            scale_spread: 0.2,
        }
    }
}

/// A dataset plus the components it was built from.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    /// `n_samples × n_wl`, one spectrum per row.
    pub data: DMatrix<f64>,
    /// The shared pure spectrum.
    pub spectrum: DVector<f64>,
    /// Per-sample multiplicative scaling.
    pub scales: Vec<f64>,
    /// `n_wl × n_samples` additive backgrounds, one per sample.
    pub backgrounds: DMatrix<f64>,
}

/// Build a dataset of scaled copies of one spectrum on individual backgrounds.
///
/// Row `i` is `scales[i] · spectrum + backgrounds[:, i]`.
pub fn generate_dataset<R: Rng>(rng: &mut R, spec: &DatasetSpec) -> Result<SyntheticDataset, ChemError> {
    if spec.n_samples == 0 {
        return Err(ChemError::InvalidParameter("Sample count must be > 0.".to_string()));
    }
    let spread = Normal::new(1.0, spec.scale_spread)
        .map_err(|e| ChemError::InvalidParameter(format!("Invalid scale spread: {e}")))?;

    let spectrum = generate_spectra(rng, spec.n_wl, spec.n_band, spec.bandwidth)?;
    let backgrounds = generate_background(rng, spec.n_wl, spec.rel_lengthscale, spec.n_samples)?;
    let scales: Vec<f64> = (0..spec.n_samples).map(|_| spread.sample(rng)).collect();

    let data = DMatrix::from_fn(spec.n_samples, spec.n_wl, |i, j| {
        scales[i] * spectrum[j] + backgrounds[(j, i)]
    });

    Ok(SyntheticDataset {
        data,
        spectrum,
        scales,
        backgrounds,
    })
}
